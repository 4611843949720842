//! Nearest-cell lookup for snapping continuous coordinates onto the grid.
//!
//! # Overview
//!
//! The [`SpatialIndex`] stores the centers of all *traversable* cells in an
//! R*-tree, so a snap query can never land on an obstacle: the nearest
//! candidate is by construction the nearest valid cell, no matter how many
//! obstacle cells lie closer to the query point.
//!
//! # Snapping rules
//!
//! - Points inside the grid extent always snap (as long as at least one cell
//!   is traversable).
//! - Points outside the extent snap only when the nearest traversable center
//!   lies within the snap radius ([`SNAP_RADIUS_CELLS`] cell sizes by default).
//! - Equal-distance candidates resolve to the smallest [`CellIndex`], so
//!   snapping is deterministic for points midway between cell centers.
//!
//! Velocity-sample resolution during dataset loading uses the same tie-aware
//! nearest query via [`nearest_with_ties`].

use rstar::primitives::GeomWithData;
use rstar::RTree;
use tracing::debug;

use crate::error::{Error, Result};
use crate::field::{Cell, CellIndex, GridSpec, Position};

/// Default snap radius for out-of-extent coordinates, in cell sizes.
pub const SNAP_RADIUS_CELLS: f64 = 2.0;

/// Relative tolerance used to treat squared distances as equal.
const TIE_TOLERANCE: f64 = 1e-9;

/// R-tree entry: a point carrying an orderable payload.
pub(crate) type IndexedPoint<T> = GeomWithData<[f64; 2], T>;

/// Precomputed index over traversable cell centers.
pub struct SpatialIndex {
    tree: RTree<IndexedPoint<CellIndex>>,
    grid: GridSpec,
    snap_radius: f64,
}

impl SpatialIndex {
    /// Build an index from the cells of a grid. Obstacle cells are skipped.
    pub fn build(grid: &GridSpec, cells: &[Cell]) -> Self {
        let points: Vec<IndexedPoint<CellIndex>> = cells
            .iter()
            .filter(|cell| cell.traversable)
            .map(|cell| GeomWithData::new(cell.center.as_array(), cell.index))
            .collect();

        debug!(indexed = points.len(), "built spatial index");

        Self {
            tree: RTree::bulk_load(points),
            grid: *grid,
            snap_radius: SNAP_RADIUS_CELLS * grid.cell_size,
        }
    }

    /// Override the maximum snap distance for out-of-extent coordinates.
    ///
    /// Negative or non-finite values are clamped to zero.
    pub fn with_snap_radius(mut self, radius: f64) -> Self {
        self.snap_radius = sanitize_radius(radius);
        self
    }

    pub fn snap_radius(&self) -> f64 {
        self.snap_radius
    }

    /// Number of indexed (traversable) cells.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Snap a coordinate to the nearest traversable cell.
    pub fn snap(&self, position: Position) -> Result<CellIndex> {
        self.snap_within(position, self.snap_radius)
    }

    /// Snap using an explicit radius for out-of-extent coordinates.
    ///
    /// Negative or non-finite radii are treated as zero.
    pub fn snap_within(&self, position: Position, radius: f64) -> Result<CellIndex> {
        let radius = sanitize_radius(radius);
        let out_of_domain = Error::OutOfDomain {
            x: position.x,
            y: position.y,
        };
        if !position.is_finite() {
            return Err(out_of_domain);
        }

        let Some((index, distance_sq)) = nearest_with_ties(&self.tree, position.as_array()) else {
            return Err(out_of_domain);
        };

        if !self.grid.contains(position) && distance_sq.sqrt() > radius {
            debug!(
                x = position.x,
                y = position.y,
                distance = distance_sq.sqrt(),
                radius,
                "coordinate outside grid and beyond snap radius"
            );
            return Err(out_of_domain);
        }

        Ok(index)
    }

    /// Find up to `k` nearest traversable cells.
    ///
    /// Returns `(CellIndex, distance)` pairs sorted by distance, then index.
    pub fn nearest(&self, position: Position, k: usize) -> Vec<(CellIndex, f64)> {
        if k == 0 || self.is_empty() || !position.is_finite() {
            return Vec::new();
        }

        let mut results: Vec<(CellIndex, f64)> = self
            .tree
            .nearest_neighbor_iter_with_distance_2(&position.as_array())
            .take(k)
            .map(|(entry, distance_sq)| (entry.data, distance_sq.sqrt()))
            .collect();

        sort_by_distance(&mut results);
        results
    }

    /// Find all traversable cells whose centers lie within `radius`.
    pub fn within_radius(&self, position: Position, radius: f64) -> Vec<(CellIndex, f64)> {
        if radius < 0.0 || self.is_empty() || !position.is_finite() {
            return Vec::new();
        }

        let query = position.as_array();
        let mut results: Vec<(CellIndex, f64)> = self
            .tree
            .locate_within_distance(query, radius * radius)
            .map(|entry| {
                let center = entry.geom();
                let distance = Position::new(center[0], center[1]).distance_to(&position);
                (entry.data, distance)
            })
            .collect();

        sort_by_distance(&mut results);
        results
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("indexed_cells", &self.tree.size())
            .field("snap_radius", &self.snap_radius)
            .finish()
    }
}

fn sanitize_radius(radius: f64) -> f64 {
    if radius.is_finite() {
        radius.max(0.0)
    } else {
        0.0
    }
}

/// Nearest entry to `point`, resolving equal distances to the smallest payload.
///
/// Returns the payload and the squared distance.
pub(crate) fn nearest_with_ties<T: Ord + Copy>(
    tree: &RTree<IndexedPoint<T>>,
    point: [f64; 2],
) -> Option<(T, f64)> {
    let mut candidates = tree.nearest_neighbor_iter_with_distance_2(&point);
    let (first, best_sq) = candidates.next()?;
    let tolerance = TIE_TOLERANCE * best_sq.max(f64::MIN_POSITIVE);

    let mut best = first.data;
    for (entry, distance_sq) in candidates {
        if distance_sq - best_sq > tolerance {
            break;
        }
        best = best.min(entry.data);
    }

    Some((best, best_sq))
}

fn sort_by_distance(results: &mut [(CellIndex, f64)]) {
    results.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
}
