//! Cooperative periodic driver for a planner run.
//!
//! Ticks are serialized on the calling thread with a sleep between them.
//! Cancellation is a shared flag checked before every tick, so a stop
//! request never aborts a tick midway.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{debug, info_span};

use crate::annealing::TickOutcome;
use crate::error::PlannerError;
use crate::planner::RoutePlanner;
use crate::traits::Pathfinder;

/// Shared stop flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Converged,
    Cancelled,
}

/// Final statistics of a driven run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub iterations: u64,
    pub best_cost: f64,
    pub best_tour: Vec<usize>,
    /// Number of accepted moves (including improvements).
    pub accepted_moves: u64,
    pub improving_moves: u64,
}

/// Drives a started planner until convergence or cancellation.
pub struct TickLoop;

impl TickLoop {
    /// Runs ticks until the planner converges or `cancel` is set.
    pub fn run<P: Pathfinder>(
        planner: &mut RoutePlanner<P>,
        cancel: &CancelToken,
    ) -> Result<RunSummary, PlannerError> {
        Self::run_with_observer(planner, cancel, |_| {})
    }

    /// Like [`TickLoop::run`], calling `observer` after every stepped tick
    /// (the hook a renderer redraws from).
    pub fn run_with_observer<P, F>(
        planner: &mut RoutePlanner<P>,
        cancel: &CancelToken,
        mut observer: F,
    ) -> Result<RunSummary, PlannerError>
    where
        P: Pathfinder,
        F: FnMut(&RoutePlanner<P>),
    {
        let _span = info_span!("anneal_run").entered();
        let interval = planner.tick_interval();

        let outcome = loop {
            if cancel.is_cancelled() {
                debug!("cancellation requested");
                planner.stop();
                break RunOutcome::Cancelled;
            }

            match planner.tick()? {
                TickOutcome::Converged { .. } => break RunOutcome::Converged,
                TickOutcome::Stepped { .. } => observer(&*planner),
            }

            if !interval.is_zero() {
                thread::sleep(interval);
            }
        };

        let status = planner.status();
        let annealer = planner
            .annealer()
            .ok_or(PlannerError::NotRunning { status })?;

        Ok(RunSummary {
            outcome,
            iterations: annealer.iterations(),
            best_cost: annealer.best_cost(),
            best_tour: annealer.best_tour().to_vec(),
            accepted_moves: annealer.accepted_moves(),
            improving_moves: annealer.improving_moves(),
        })
    }
}
