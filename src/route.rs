//! Drawable geometry for a closed tour.
//!
//! The renderer receives plain cell sequences; styling, arrows and canvas
//! coordinates are its own concern.

use serde::{Deserialize, Serialize};

use crate::grid::GridCell;
use crate::traits::RouteView;

/// Number of direction markers spread along a route.
const ARROWS_PER_ROUTE: usize = 6;

/// The cells of a full tour, warehouse to warehouse.
///
/// Consecutive legs share their junction cell once. A leg with no path
/// contributes no cells, so the polyline may jump across a gap.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoutePolyline {
    cells: Vec<GridCell>,
    departure: Option<(GridCell, GridCell)>,
    arrival: Option<(GridCell, GridCell)>,
}

impl RoutePolyline {
    /// Creates a polyline from already-stitched cells with no leg markers.
    pub fn new(cells: Vec<GridCell>) -> Self {
        Self {
            cells,
            departure: None,
            arrival: None,
        }
    }

    /// Stitches the best tour of `view` through its path table.
    ///
    /// Returns an empty polyline when there is no tour yet.
    pub fn from_view<V: RouteView + ?Sized>(view: &V) -> Self {
        let tour = view.current_best_tour();
        let (Some(&first), Some(&last)) = (tour.first(), tour.last()) else {
            return Self::default();
        };

        let stops = std::iter::once(0)
            .chain(tour.iter().map(|&customer| customer + 1))
            .chain(std::iter::once(0));
        let legs: Vec<usize> = stops.collect();

        let mut cells: Vec<GridCell> = Vec::new();
        for pair in legs.windows(2) {
            let leg = view.path_between(pair[0], pair[1]);
            let skip = match (cells.last(), leg.first()) {
                (Some(end), Some(start)) if end == start => 1,
                _ => 0,
            };
            cells.extend_from_slice(&leg[skip..]);
        }

        let exit = view.path_between(0, first + 1);
        let back = view.path_between(last + 1, 0);

        Self {
            cells,
            departure: first_step(exit),
            arrival: last_step(back),
        }
    }

    /// Grid cells in travel order, warehouse first and last.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<GridCell> {
        self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First step out of the warehouse, if that leg is reachable and moves.
    pub fn departure_leg(&self) -> Option<(GridCell, GridCell)> {
        self.departure
    }

    /// Last step back into the warehouse, if that leg is reachable and moves.
    pub fn return_leg(&self) -> Option<(GridCell, GridCell)> {
        self.arrival
    }

    /// Evenly spaced `(from, to)` steps for direction markers.
    pub fn arrow_steps(&self) -> Vec<(GridCell, GridCell)> {
        let interval = (self.cells.len() / ARROWS_PER_ROUTE).max(1);
        (interval..self.cells.len())
            .step_by(interval)
            .map(|k| (self.cells[k - 1], self.cells[k]))
            .collect()
    }
}

fn first_step(path: &[GridCell]) -> Option<(GridCell, GridCell)> {
    match path {
        [a, b, ..] => Some((*a, *b)),
        _ => None,
    }
}

fn last_step(path: &[GridCell]) -> Option<(GridCell, GridCell)> {
    match path {
        [.., a, b] => Some((*a, *b)),
        _ => None,
    }
}
