//! Simulated annealing over customer visiting order.
//!
//! One [`Annealer::tick`] is one proposal: swap two random tour positions,
//! score the candidate against the distance matrix, apply the Metropolis
//! rule, then cool geometrically.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::config::AnnealingConfig;
use crate::error::{PlannerError, PreconditionError};
use crate::pathfinder::DistanceMatrix;

/// Length of the closed loop warehouse -> tour.. -> warehouse.
///
/// `tour` holds customer indices; customer `c` sits at PointIndex `c + 1`.
/// Any unreachable leg makes the whole tour cost `f64::INFINITY`.
pub fn tour_cost(tour: &[usize], distances: &DistanceMatrix) -> f64 {
    let mut cost = 0.0;
    let mut prev = 0;
    for &customer in tour {
        cost += distances.cost(prev, customer + 1);
        prev = customer + 1;
    }
    cost + distances.cost(prev, 0)
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// A proposal was evaluated and the temperature cooled.
    Stepped { accepted: bool, improved_best: bool },
    /// The temperature was already below the threshold; nothing changed.
    Converged { iterations: u64, best_cost: f64 },
}

/// Mutable optimizer state for one run.
#[derive(Debug, Clone)]
pub struct Annealer {
    rng: StdRng,
    temperature: f64,
    cooling_rate: f64,
    convergence_threshold: f64,
    iterations: u64,
    current: Vec<usize>,
    current_cost: f64,
    best: Vec<usize>,
    best_cost: f64,
    accepted_moves: u64,
    improving_moves: u64,
}

impl Annealer {
    /// Starts from the identity tour `[0, 1, .., customers - 1]`.
    pub fn new(
        customers: usize,
        distances: &DistanceMatrix,
        config: &AnnealingConfig,
    ) -> Result<Self, PlannerError> {
        config.validate()?;
        if customers == 0 {
            return Err(PreconditionError::NoCustomers.into());
        }
        debug_assert_eq!(distances.size(), customers + 1);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let tour: Vec<usize> = (0..customers).collect();
        let cost = tour_cost(&tour, distances);

        Ok(Self {
            rng,
            temperature: config.initial_temperature,
            cooling_rate: config.cooling_rate,
            convergence_threshold: config.convergence_threshold,
            iterations: 0,
            best: tour.clone(),
            current: tour,
            current_cost: cost,
            best_cost: cost,
            accepted_moves: 0,
            improving_moves: 0,
        })
    }

    pub fn tick(&mut self, distances: &DistanceMatrix) -> TickOutcome {
        if self.is_converged() {
            return TickOutcome::Converged {
                iterations: self.iterations,
                best_cost: self.best_cost,
            };
        }

        let n = self.current.len();
        let i = self.rng.random_range(0..n);
        let j = self.rng.random_range(0..n);
        let mut candidate = self.current.clone();
        candidate.swap(i, j);

        let candidate_cost = tour_cost(&candidate, distances);
        // inf -> finite is -inf (always taken); inf -> inf is NaN and never
        // passes either branch below.
        let delta = candidate_cost - self.current_cost;

        // Metropolis acceptance criterion
        let accepted = if delta < 0.0 {
            self.improving_moves += 1;
            true
        } else {
            let probability = (-delta / self.temperature).exp();
            self.rng.random_range(0.0..1.0) < probability
        };

        let mut improved_best = false;
        if accepted {
            self.current = candidate;
            self.current_cost = candidate_cost;
            self.accepted_moves += 1;

            if self.current_cost < self.best_cost {
                self.best.clone_from(&self.current);
                self.best_cost = self.current_cost;
                improved_best = true;
                trace!(
                    iteration = self.iterations,
                    best_cost = self.best_cost,
                    "new best tour"
                );
            }
        }

        self.temperature *= self.cooling_rate;
        self.iterations += 1;

        TickOutcome::Stepped {
            accepted,
            improved_best,
        }
    }

    pub fn is_converged(&self) -> bool {
        self.temperature < self.convergence_threshold
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn current_tour(&self) -> &[usize] {
        &self.current
    }

    pub fn current_cost(&self) -> f64 {
        self.current_cost
    }

    pub fn best_tour(&self) -> &[usize] {
        &self.best
    }

    pub fn best_cost(&self) -> f64 {
        self.best_cost
    }

    pub fn accepted_moves(&self) -> u64 {
        self.accepted_moves
    }

    pub fn improving_moves(&self) -> u64 {
        self.improving_moves
    }
}
