//! Planner lifecycle tests
//!
//! Start preconditions, tick semantics, convergence, invalidation and the
//! rendering snapshot surface, all against the BFS pathfinder.

use grid_route_planner::annealing::TickOutcome;
use grid_route_planner::config::AnnealingConfig;
use grid_route_planner::error::{ConfigError, PlannerError, PreconditionError};
use grid_route_planner::grid::{GridCell, GridDims};
use grid_route_planner::planner::{PlannerStatus, RoutePlanner};
use grid_route_planner::route::RoutePolyline;
use grid_route_planner::runner::{CancelToken, RunOutcome, TickLoop};
use grid_route_planner::traits::RouteView;

// ============================================================================
// Test Fixtures
// ============================================================================

fn cell(x: u32, y: u32) -> GridCell {
    GridCell::new(x, y)
}

fn config(seed: u64) -> AnnealingConfig {
    AnnealingConfig::default()
        .with_initial_temperature(100.0)
        .with_cooling_rate(0.995)
        .with_tick_interval_ms(0)
        .with_seed(seed)
}

/// 5x5 grid, warehouse at (0,0), customers at (4,0) and (0,4).
fn corner_planner() -> RoutePlanner {
    let mut planner = RoutePlanner::new(GridDims::new(5, 5).unwrap());
    planner.set_warehouse(cell(0, 0)).unwrap();
    planner.add_customer(cell(4, 0)).unwrap();
    planner.add_customer(cell(0, 4)).unwrap();
    planner
}

/// Warehouse in a corner of a 6x6 box with customers on the other corners,
/// added in an order whose identity tour zig-zags across the box.
fn box_planner() -> RoutePlanner {
    let mut planner = RoutePlanner::new(GridDims::new(6, 6).unwrap());
    planner.set_warehouse(cell(0, 0)).unwrap();
    planner.add_customer(cell(5, 0)).unwrap();
    planner.add_customer(cell(0, 5)).unwrap();
    planner.add_customer(cell(5, 5)).unwrap();
    planner
}

fn tick_until_converged(planner: &mut RoutePlanner) -> (u64, f64) {
    loop {
        if let TickOutcome::Converged {
            iterations,
            best_cost,
        } = planner.tick().unwrap()
        {
            return (iterations, best_cost);
        }
    }
}

// ============================================================================
// Start
// ============================================================================

#[test]
fn identity_tour_cost_on_open_grid() {
    let mut planner = corner_planner();
    assert_eq!(planner.preview_cost(), Some(16.0));

    planner.start(&config(1)).unwrap();
    assert_eq!(planner.status(), PlannerStatus::Running);
    assert_eq!(planner.current_best_tour(), &[0, 1]);
    assert_eq!(planner.best_cost(), Some(16.0));
    assert_eq!(planner.iteration_count(), 0);
    assert_eq!(planner.current_temperature(), 100.0);
}

#[test]
fn start_without_points_is_rejected() {
    let mut planner = RoutePlanner::new(GridDims::new(5, 5).unwrap());
    assert_eq!(
        planner.start(&config(1)),
        Err(PlannerError::Precondition(PreconditionError::MissingWarehouse))
    );
    assert_eq!(planner.preview_cost(), None);
    assert!(planner.annealer().is_none());
}

#[test]
fn start_rejects_invalid_schedule() {
    let mut planner = corner_planner();
    assert_eq!(
        planner.start(&config(1).with_initial_temperature(0.0)),
        Err(PlannerError::Config(ConfigError::NonPositiveTemperature(0.0)))
    );
    assert_eq!(
        planner.start(&config(1).with_cooling_rate(1.0)),
        Err(PlannerError::Config(ConfigError::CoolingRateOutOfRange(1.0)))
    );
    assert_eq!(planner.status(), PlannerStatus::Idle);
}

#[test]
fn start_uses_configured_tick_interval() {
    let mut planner = corner_planner();
    planner.start(&config(1).with_tick_interval_ms(25)).unwrap();
    assert_eq!(planner.tick_interval().as_millis(), 25);
}

// ============================================================================
// Ticks and convergence
// ============================================================================

#[test]
fn converges_after_exact_tick_count() {
    let mut planner = corner_planner();
    planner.start(&config(3)).unwrap();

    let (iterations, best_cost) = tick_until_converged(&mut planner);

    let expected = ((1e-3f64 / 100.0).ln() / 0.995f64.ln()).ceil() as u64;
    assert_eq!(expected, 2297);
    assert_eq!(iterations, expected);
    assert_eq!(planner.iteration_count(), expected);
    assert!(planner.current_temperature() < 1e-3);
    assert_eq!(best_cost, 16.0);
    assert_eq!(planner.status(), PlannerStatus::Converged);
}

#[test]
fn no_ticks_after_convergence() {
    let mut planner = corner_planner();
    planner.start(&config(3)).unwrap();
    tick_until_converged(&mut planner);

    assert_eq!(
        planner.tick(),
        Err(PlannerError::NotRunning {
            status: PlannerStatus::Converged
        })
    );

    planner.reset();
    assert_eq!(planner.status(), PlannerStatus::Idle);
    assert!(planner.current_best_tour().is_empty());
}

#[test]
fn best_cost_never_increases() {
    let mut planner = box_planner();
    planner.start(&config(11)).unwrap();

    let mut best = planner.best_cost().unwrap();
    while let TickOutcome::Stepped { improved_best, .. } = planner.tick().unwrap() {
        let now = planner.best_cost().unwrap();
        assert!(now <= best);
        assert_eq!(improved_best, now < best);
        best = now;
    }
}

#[test]
fn finds_perimeter_tour() {
    let mut planner = box_planner();
    assert_eq!(planner.preview_cost(), Some(30.0));

    planner.start(&config(5)).unwrap();
    let (_, best_cost) = tick_until_converged(&mut planner);

    assert_eq!(best_cost, 20.0);
    let tour = planner.current_best_tour();
    // Either direction around the box: (5,0) -> (5,5) -> (0,5) or reversed.
    assert!(tour == [0, 2, 1] || tour == [1, 2, 0], "unexpected tour {:?}", tour);
}

#[test]
fn unreachable_customer_keeps_infinite_cost() {
    let mut planner = corner_planner();
    // Seal (4,0) off from the rest of the grid.
    planner.toggle_obstacle(cell(3, 0)).unwrap();
    planner.toggle_obstacle(cell(4, 1)).unwrap();
    assert_eq!(planner.preview_cost(), Some(f64::INFINITY));

    planner.start(&config(2).with_cooling_rate(0.9)).unwrap();
    let (_, best_cost) = tick_until_converged(&mut planner);
    assert_eq!(best_cost, f64::INFINITY);
    assert!(planner.path_between(0, 1).is_empty());
}

// ============================================================================
// Invalidation
// ============================================================================

#[test]
fn obstacle_toggle_mid_run_invalidates() {
    let mut planner = corner_planner();
    planner.start(&config(4)).unwrap();
    for _ in 0..10 {
        planner.tick().unwrap();
    }

    assert_eq!(planner.toggle_obstacle(cell(2, 2)), Ok(true));
    assert_eq!(planner.status(), PlannerStatus::Invalidated);
    assert!(planner.table().is_none());
    assert!(planner.current_best_tour().is_empty());
    assert!(planner.path_between(0, 1).is_empty());
    assert_eq!(
        planner.tick(),
        Err(PlannerError::NotRunning {
            status: PlannerStatus::Invalidated
        })
    );

    planner.start(&config(4)).unwrap();
    assert_eq!(planner.status(), PlannerStatus::Running);
    assert!(planner.table().is_some());
    assert!(matches!(planner.tick(), Ok(TickOutcome::Stepped { .. })));
}

#[test]
fn point_edits_mid_run_invalidate() {
    let mut planner = corner_planner();
    planner.start(&config(4)).unwrap();
    assert_eq!(planner.add_customer(cell(4, 4)), Ok(true));
    assert_eq!(planner.status(), PlannerStatus::Invalidated);

    planner.reset();
    assert_eq!(planner.status(), PlannerStatus::Idle);

    planner.start(&config(4)).unwrap();
    assert_eq!(planner.current_best_tour(), &[0, 1, 2]);
    assert_eq!(planner.set_warehouse(cell(1, 1)), Ok(true));
    assert_eq!(planner.status(), PlannerStatus::Invalidated);
}

#[test]
fn painting_mid_run_halts_even_without_change() {
    let mut planner = corner_planner();
    planner.toggle_obstacle(cell(2, 2)).unwrap();
    planner.start(&config(4)).unwrap();

    assert!(!planner.paint_obstacle(cell(2, 2)));
    assert_eq!(planner.status(), PlannerStatus::Invalidated);
    assert!(planner.obstacles().contains(cell(2, 2)));
}

#[test]
fn edit_after_convergence_returns_to_idle() {
    let mut planner = corner_planner();
    planner.start(&config(4).with_cooling_rate(0.5)).unwrap();
    tick_until_converged(&mut planner);

    planner.toggle_obstacle(cell(2, 2)).unwrap();
    assert_eq!(planner.status(), PlannerStatus::Idle);
    assert_eq!(planner.best_cost(), None);
}

// ============================================================================
// Rendering surface
// ============================================================================

#[test]
fn polyline_follows_best_tour() {
    let mut planner = box_planner();
    planner.toggle_obstacle(cell(2, 0)).unwrap();
    planner.toggle_obstacle(cell(2, 1)).unwrap();
    planner.start(&config(8)).unwrap();
    let summary = TickLoop::run(&mut planner, &CancelToken::new()).unwrap();
    assert_eq!(summary.outcome, RunOutcome::Converged);

    let polyline = RoutePolyline::from_view(&planner);
    let cells = polyline.cells();
    assert_eq!(cells.first(), Some(&cell(0, 0)));
    assert_eq!(cells.last(), Some(&cell(0, 0)));
    for step in cells.windows(2) {
        assert_eq!(step[0].manhattan(&step[1]), 1);
    }
    assert!(cells.iter().all(|c| !planner.obstacles().contains(*c)));
    assert_eq!(cells.len() as f64 - 1.0, summary.best_cost);

    let (from, _) = polyline.departure_leg().unwrap();
    let (_, to) = polyline.return_leg().unwrap();
    assert_eq!(from, cell(0, 0));
    assert_eq!(to, cell(0, 0));
}

#[test]
fn snapshots_through_trait_object() {
    let mut planner = corner_planner();
    planner.start(&config(1)).unwrap();
    planner.tick().unwrap();

    let view: &dyn RouteView = &planner;
    assert_eq!(view.iteration_count(), 1);
    assert!((view.current_temperature() - 99.5).abs() < 1e-9);
    assert_eq!(view.path_between(0, 1).len(), 5);
    assert!(view.path_between(0, 7).is_empty());
}
