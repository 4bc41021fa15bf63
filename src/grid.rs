//! Grid geometry: cells, dimensions, obstacles and points of interest.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default grid edge length.
pub const DEFAULT_GRID_SIZE: u32 = 100;

/// A cell on the grid, `0 <= x < width`, `0 <= y < height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
}

impl GridCell {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance, the obstacle-free hop count between two cells.
    pub fn manhattan(&self, other: &GridCell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(u32, u32)> for GridCell {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// Grid size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub width: u32,
    pub height: u32,
}

impl Default for GridDims {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_SIZE,
            height: DEFAULT_GRID_SIZE,
        }
    }
}

impl fmt::Display for GridDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl GridDims {
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major offset of a cell. Caller guarantees the cell is in bounds.
    pub fn offset(&self, cell: GridCell) -> usize {
        cell.y as usize * self.width as usize + cell.x as usize
    }

    /// In-bounds 4-directional neighbours, in +x, -x, +y, -y order.
    pub fn neighbors(&self, cell: GridCell) -> impl Iterator<Item = GridCell> + '_ {
        let candidates = [
            cell.x.checked_add(1).map(|x| GridCell::new(x, cell.y)),
            cell.x.checked_sub(1).map(|x| GridCell::new(x, cell.y)),
            cell.y.checked_add(1).map(|y| GridCell::new(cell.x, y)),
            cell.y.checked_sub(1).map(|y| GridCell::new(cell.x, y)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(move |next| self.contains(*next))
    }
}

/// Blocked cells. Membership is O(1); toggling flips membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObstacleSet {
    cells: HashSet<GridCell>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership. Returns `true` if the cell is blocked afterwards.
    pub fn toggle(&mut self, cell: GridCell) -> bool {
        if self.cells.remove(&cell) {
            false
        } else {
            self.cells.insert(cell);
            true
        }
    }

    /// Adds a cell. Returns `true` if it was not already blocked.
    pub fn insert(&mut self, cell: GridCell) -> bool {
        self.cells.insert(cell)
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

impl FromIterator<GridCell> for ObstacleSet {
    fn from_iter<I: IntoIterator<Item = GridCell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// The warehouse and the ordered customers.
///
/// A customer's position in the sequence is its stable identity in a tour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointSet {
    warehouse: Option<GridCell>,
    customers: Vec<GridCell>,
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places or moves the single warehouse.
    pub fn set_warehouse(&mut self, cell: GridCell) {
        self.warehouse = Some(cell);
    }

    /// Appends a customer and returns its customer index.
    pub fn add_customer(&mut self, cell: GridCell) -> usize {
        self.customers.push(cell);
        self.customers.len() - 1
    }

    pub fn warehouse(&self) -> Option<GridCell> {
        self.warehouse
    }

    pub fn customers(&self) -> &[GridCell] {
        &self.customers
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    /// Points in PointIndex order: `[warehouse, customer_0, ..]`.
    ///
    /// Returns `None` until a warehouse is placed.
    pub fn indexed_points(&self) -> Option<Vec<GridCell>> {
        let warehouse = self.warehouse?;
        let mut points = Vec::with_capacity(self.customers.len() + 1);
        points.push(warehouse);
        points.extend_from_slice(&self.customers);
        Some(points)
    }

    pub fn clear(&mut self) {
        self.warehouse = None;
        self.customers.clear();
    }
}
