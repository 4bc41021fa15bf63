//! grid-route-planner core
//!
//! Single-warehouse delivery routing on an obstacle grid: all-pairs BFS
//! distances between points of interest, then simulated annealing over the
//! customer visiting order.

pub mod traits;
pub mod grid;
pub mod error;
pub mod pathfinder;
pub mod config;
pub mod annealing;
pub mod planner;
pub mod runner;
pub mod route;
