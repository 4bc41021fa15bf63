//! Obstacle-aware all-pairs shortest paths on the grid.
//!
//! One breadth-first sweep per point of interest over 4-connected free
//! cells. Sweeps are independent and run in parallel; the tables are only
//! handed out once every sweep has finished.

use std::collections::VecDeque;

use rayon::prelude::*;
use tracing::debug;

use crate::grid::{GridCell, GridDims, ObstacleSet};
use crate::traits::Pathfinder;

/// Sentinel hop count for a pair with no connecting path.
pub const UNREACHABLE: u32 = u32::MAX;

/// Square matrix of hop counts, indexed in PointIndex order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    data: Vec<u32>,
    size: usize,
}

impl DistanceMatrix {
    /// A matrix with every pair unreachable.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![UNREACHABLE; size * size],
            size,
        }
    }

    /// Builds a matrix from row-major hop counts. `None` on a size mismatch.
    pub fn from_data(size: usize, data: Vec<u32>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Hop count from `from` to `to`, `None` when unreachable.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> Option<u32> {
        match self.data[from * self.size + to] {
            UNREACHABLE => None,
            hops => Some(hops),
        }
    }

    /// Hop count as a cost; unreachable pairs cost `f64::INFINITY`.
    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.get(from, to).map_or(f64::INFINITY, f64::from)
    }

    pub fn set(&mut self, from: usize, to: usize, hops: u32) {
        self.data[from * self.size + to] = hops;
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| ((i + 1)..self.size).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Number of ordered pairs with no connecting path.
    pub fn unreachable_pairs(&self) -> usize {
        self.data.iter().filter(|&&hops| hops == UNREACHABLE).count()
    }
}

/// Concrete shortest paths parallel to a [`DistanceMatrix`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatrix {
    paths: Vec<Vec<GridCell>>,
    size: usize,
}

impl PathMatrix {
    pub fn new(size: usize) -> Self {
        Self {
            paths: vec![Vec::new(); size * size],
            size,
        }
    }

    /// Cells from `from` to `to`, both included; empty when unreachable.
    pub fn get(&self, from: usize, to: usize) -> &[GridCell] {
        &self.paths[from * self.size + to]
    }

    pub fn set(&mut self, from: usize, to: usize, path: Vec<GridCell>) {
        self.paths[from * self.size + to] = path;
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Distances and paths built together from one obstacle/point snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTable {
    pub distances: DistanceMatrix,
    pub paths: PathMatrix,
}

/// Unweighted breadth-first search over free cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsPathfinder;

impl BfsPathfinder {
    pub fn new() -> Self {
        Self
    }
}

impl Pathfinder for BfsPathfinder {
    fn compute(&self, dims: GridDims, obstacles: &ObstacleSet, points: &[GridCell]) -> PathTable {
        let n = points.len();

        let rows: Vec<(Vec<u32>, Vec<Vec<GridCell>>)> = points
            .par_iter()
            .map(|&source| {
                let tree = SearchTree::grow(dims, obstacles, source);
                points
                    .iter()
                    .map(|&target| (tree.hops(target), tree.path_to(target)))
                    .unzip()
            })
            .collect();

        let mut distances = DistanceMatrix::new(n);
        let mut paths = PathMatrix::new(n);
        for (i, (hops_row, path_row)) in rows.into_iter().enumerate() {
            for (j, (hops, path)) in hops_row.into_iter().zip(path_row).enumerate() {
                distances.set(i, j, hops);
                paths.set(i, j, path);
            }
        }

        debug!(
            points = n,
            obstacles = obstacles.len(),
            unreachable_pairs = distances.unreachable_pairs(),
            "rebuilt distance and path matrices"
        );

        PathTable { distances, paths }
    }
}

/// BFS result from a single source: hop counts and predecessor links.
struct SearchTree {
    dims: GridDims,
    source: GridCell,
    hops: Vec<u32>,
    parent: Vec<Option<GridCell>>,
}

impl SearchTree {
    fn grow(dims: GridDims, obstacles: &ObstacleSet, source: GridCell) -> Self {
        let mut hops = vec![UNREACHABLE; dims.cell_count()];
        let mut parent = vec![None; dims.cell_count()];

        // A blocked point reaches only itself, so the graph stays undirected.
        if dims.contains(source) {
            hops[dims.offset(source)] = 0;
            if !obstacles.contains(source) {
                sweep(dims, obstacles, source, &mut hops, &mut parent);
            }
        }

        Self {
            dims,
            source,
            hops,
            parent,
        }
    }

    fn hops(&self, target: GridCell) -> u32 {
        if !self.dims.contains(target) {
            return UNREACHABLE;
        }
        self.hops[self.dims.offset(target)]
    }

    fn path_to(&self, target: GridCell) -> Vec<GridCell> {
        if self.hops(target) == UNREACHABLE {
            return Vec::new();
        }

        let mut path = vec![target];
        let mut cell = target;
        while cell != self.source {
            match self.parent[self.dims.offset(cell)] {
                Some(prev) => {
                    path.push(prev);
                    cell = prev;
                }
                None => return Vec::new(),
            }
        }
        path.reverse();
        path
    }
}

/// FIFO expansion from `source`, which must already carry hop count 0.
fn sweep(
    dims: GridDims,
    obstacles: &ObstacleSet,
    source: GridCell,
    hops: &mut [u32],
    parent: &mut [Option<GridCell>],
) {
    let mut frontier = VecDeque::from([source]);
    while let Some(cell) = frontier.pop_front() {
        let next_hops = hops[dims.offset(cell)] + 1;
        for next in dims.neighbors(cell) {
            let offset = dims.offset(next);
            if hops[offset] != UNREACHABLE || obstacles.contains(next) {
                continue;
            }
            hops[offset] = next_hops;
            parent[offset] = Some(cell);
            frontier.push_back(next);
        }
    }
}
