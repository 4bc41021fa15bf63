//! Error types for the planner.

use thiserror::Error;

use crate::grid::{GridCell, GridDims};
use crate::planner::PlannerStatus;

/// Invalid configuration values, rejected before any state is created.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("initial_temperature must be finite and positive, got {0}")]
    NonPositiveTemperature(f64),
    #[error("cooling_rate must be in (0, 1), got {0}")]
    CoolingRateOutOfRange(f64),
    #[error("convergence_threshold must be finite and positive, got {0}")]
    NonPositiveThreshold(f64),
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },
}

/// Optimization was requested before the point set is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("place a warehouse before starting")]
    MissingWarehouse,
    #[error("place at least one customer before starting")]
    NoCustomers,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cell {cell} lies outside the {dims} grid")]
    OutOfBounds { cell: GridCell, dims: GridDims },
    #[error("optimizer is not running (status: {status:?})")]
    NotRunning { status: PlannerStatus },
}
