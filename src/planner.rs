//! The owning context: grid state, cached path tables and the optimizer.
//!
//! Every edit invalidates the tables and halts a running optimization.
//! Ticks and edits both take `&mut self`, so they can never interleave.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::annealing::{tour_cost, Annealer, TickOutcome};
use crate::config::AnnealingConfig;
use crate::error::{PlannerError, PreconditionError};
use crate::grid::{GridCell, GridDims, ObstacleSet, PointSet};
use crate::pathfinder::{BfsPathfinder, PathTable};
use crate::traits::{Pathfinder, RouteView};

/// Optimizer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerStatus {
    Idle,
    Running,
    Converged,
    /// An edit arrived mid-run; the run's state was discarded.
    Invalidated,
}

pub struct RoutePlanner<P: Pathfinder = BfsPathfinder> {
    dims: GridDims,
    pathfinder: P,
    obstacles: ObstacleSet,
    points: PointSet,
    table: Option<PathTable>,
    annealer: Option<Annealer>,
    status: PlannerStatus,
    tick_interval: Duration,
}

impl RoutePlanner<BfsPathfinder> {
    pub fn new(dims: GridDims) -> Self {
        Self::with_pathfinder(dims, BfsPathfinder::new())
    }
}

impl Default for RoutePlanner<BfsPathfinder> {
    fn default() -> Self {
        Self::new(GridDims::default())
    }
}

impl<P: Pathfinder> RoutePlanner<P> {
    pub fn with_pathfinder(dims: GridDims, pathfinder: P) -> Self {
        Self {
            dims,
            pathfinder,
            obstacles: ObstacleSet::new(),
            points: PointSet::new(),
            table: None,
            annealer: None,
            status: PlannerStatus::Idle,
            tick_interval: Duration::ZERO,
        }
    }

    pub fn pathfinder(&self) -> &P {
        &self.pathfinder
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn status(&self) -> PlannerStatus {
        self.status
    }

    /// Interval the current run was configured with.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Tables built from the current obstacles and points, if fresh.
    pub fn table(&self) -> Option<&PathTable> {
        self.table.as_ref()
    }

    pub fn annealer(&self) -> Option<&Annealer> {
        self.annealer.as_ref()
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------
    //
    // Every edit halts a running optimization, including one that is
    // rejected for lying off the grid.

    /// Places or moves the warehouse. Returns whether the tables were invalidated.
    pub fn set_warehouse(&mut self, cell: GridCell) -> Result<bool, PlannerError> {
        self.halt();
        self.check_bounds(cell)?;
        self.points.set_warehouse(cell);
        self.invalidate("warehouse moved");
        Ok(true)
    }

    /// Appends a customer. Returns whether the tables were invalidated.
    pub fn add_customer(&mut self, cell: GridCell) -> Result<bool, PlannerError> {
        self.halt();
        self.check_bounds(cell)?;
        self.points.add_customer(cell);
        self.invalidate("customer added");
        Ok(true)
    }

    /// Blocks a free cell or frees a blocked one. Returns whether the tables
    /// were invalidated.
    pub fn toggle_obstacle(&mut self, cell: GridCell) -> Result<bool, PlannerError> {
        self.halt();
        self.check_bounds(cell)?;
        self.obstacles.toggle(cell);
        self.invalidate("obstacle toggled");
        Ok(true)
    }

    /// Drag-style painting: blocks the cell if it is free, never unblocks.
    ///
    /// Cells off the grid are ignored. Any call halts a running
    /// optimization; the tables are only invalidated when a cell was added.
    pub fn paint_obstacle(&mut self, cell: GridCell) -> bool {
        self.halt();
        if !self.dims.contains(cell) || !self.obstacles.insert(cell) {
            return false;
        }
        self.invalidate("obstacle painted");
        true
    }

    // ------------------------------------------------------------------
    // Optimizer lifecycle
    // ------------------------------------------------------------------

    /// Rebuilds the tables and starts a fresh run from the identity tour.
    ///
    /// Fails without touching any state when the configuration is invalid or
    /// the warehouse/customers are missing.
    pub fn start(&mut self, config: &AnnealingConfig) -> Result<(), PlannerError> {
        config.validate()?;
        self.check_ready()?;

        let customers = self.points.customer_count();
        self.table = None;
        let table = self.ensure_table();
        let annealer = Annealer::new(customers, &table.distances, config)?;

        if annealer.current_cost().is_infinite() {
            warn!("initial tour is unreachable; some customer has no path");
        }
        info!(
            customers,
            initial_temperature = config.initial_temperature,
            cooling_rate = config.cooling_rate,
            initial_cost = annealer.current_cost(),
            "starting route optimization"
        );

        self.annealer = Some(annealer);
        self.tick_interval = Duration::from_millis(config.tick_interval_ms);
        self.status = PlannerStatus::Running;
        Ok(())
    }

    /// Runs one annealing step. Only valid while `Running`.
    pub fn tick(&mut self) -> Result<TickOutcome, PlannerError> {
        let status = self.status;
        let (PlannerStatus::Running, Some(annealer), Some(table)) =
            (status, self.annealer.as_mut(), self.table.as_ref())
        else {
            return Err(PlannerError::NotRunning { status });
        };

        let outcome = annealer.tick(&table.distances);
        if let TickOutcome::Converged {
            iterations,
            best_cost,
        } = outcome
        {
            info!(iterations, best_cost, "route optimization converged");
            self.status = PlannerStatus::Converged;
        }
        Ok(outcome)
    }

    /// Stops scheduling ticks. The best tour stays readable.
    pub fn stop(&mut self) {
        if self.status == PlannerStatus::Running {
            debug!("route optimization stopped");
            self.status = PlannerStatus::Idle;
        }
    }

    /// Discards any run and returns to `Idle`. Points and obstacles stay.
    pub fn reset(&mut self) {
        self.annealer = None;
        self.status = PlannerStatus::Idle;
    }

    /// Drops every point, obstacle, table and run.
    pub fn clear(&mut self) {
        self.points.clear();
        self.obstacles.clear();
        self.table = None;
        self.reset();
    }

    /// Identity-tour cost for the current layout, without starting a run.
    ///
    /// Returns `None` until a warehouse and at least one customer exist.
    pub fn preview_cost(&mut self) -> Option<f64> {
        self.check_ready().ok()?;
        let customers = self.points.customer_count();
        let table = self.ensure_table();
        let identity: Vec<usize> = (0..customers).collect();
        Some(tour_cost(&identity, &table.distances))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn check_bounds(&self, cell: GridCell) -> Result<(), PlannerError> {
        if self.dims.contains(cell) {
            Ok(())
        } else {
            Err(PlannerError::OutOfBounds {
                cell,
                dims: self.dims,
            })
        }
    }

    fn check_ready(&self) -> Result<(), PreconditionError> {
        if self.points.warehouse().is_none() {
            return Err(PreconditionError::MissingWarehouse);
        }
        if self.points.customer_count() == 0 {
            return Err(PreconditionError::NoCustomers);
        }
        Ok(())
    }

    fn ensure_table(&mut self) -> &PathTable {
        self.table.get_or_insert_with(|| {
            let points = self.points.indexed_points().unwrap_or_default();
            self.pathfinder.compute(self.dims, &self.obstacles, &points)
        })
    }

    /// Halts a running optimization and discards its state.
    fn halt(&mut self) {
        match self.status {
            PlannerStatus::Running => {
                debug!("edit during optimization; run invalidated");
                self.status = PlannerStatus::Invalidated;
            }
            PlannerStatus::Converged => self.status = PlannerStatus::Idle,
            PlannerStatus::Idle | PlannerStatus::Invalidated => {}
        }
        self.annealer = None;
    }

    fn invalidate(&mut self, reason: &'static str) {
        self.halt();
        if self.table.take().is_some() {
            debug!(reason, "path tables invalidated");
        }
    }
}

impl<P: Pathfinder> RouteView for RoutePlanner<P> {
    fn current_best_tour(&self) -> &[usize] {
        match &self.annealer {
            Some(annealer) => annealer.best_tour(),
            None => &[],
        }
    }

    fn path_between(&self, from: usize, to: usize) -> &[GridCell] {
        match &self.table {
            Some(table) if from < table.paths.size() && to < table.paths.size() => {
                table.paths.get(from, to)
            }
            _ => &[],
        }
    }

    fn iteration_count(&self) -> u64 {
        self.annealer.as_ref().map_or(0, Annealer::iterations)
    }

    fn current_temperature(&self) -> f64 {
        self.annealer.as_ref().map_or(0.0, Annealer::temperature)
    }

    fn best_cost(&self) -> Option<f64> {
        self.annealer.as_ref().map(Annealer::best_cost)
    }
}
