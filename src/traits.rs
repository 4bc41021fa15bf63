//! Core seams of the planner.
//!
//! `Pathfinder` builds the distance/path tables the optimizer consumes;
//! `RouteView` is the read-only surface a renderer draws from.

use crate::grid::{GridCell, GridDims, ObstacleSet};
use crate::pathfinder::PathTable;

/// Builds all-pairs distances and paths for a set of points.
///
/// `points` are in PointIndex order (warehouse first). The returned tables
/// are indexed by the same order. Implementations must be total: an
/// unreachable pair is a value, not a failure.
pub trait Pathfinder {
    fn compute(&self, dims: GridDims, obstacles: &ObstacleSet, points: &[GridCell]) -> PathTable;
}

/// Read-only snapshot of the optimizer for drawing.
///
/// Every accessor reflects the state at the instant it is called.
pub trait RouteView {
    /// Best tour seen so far, as customer indices. Empty when none exists.
    fn current_best_tour(&self) -> &[usize];

    /// Cells from point `from` to point `to` (PointIndex order), both ends
    /// included. Empty when unreachable or when no tables are built.
    fn path_between(&self, from: usize, to: usize) -> &[GridCell];

    fn iteration_count(&self) -> u64;

    fn current_temperature(&self) -> f64;

    /// `None` before an optimization has started.
    fn best_cost(&self) -> Option<f64>;
}
