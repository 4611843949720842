//! Discretised wind field: grid geometry, cells, and the immutable environment.
//!
//! The [`Environment`] is built once per run (from disk via
//! [`crate::dataset::load_environment`] or in memory via [`EnvironmentBuilder`])
//! and is read-only afterwards, so it can be shared across threads freely.
//!
//! Grid convention: `origin` is the center of cell `(0, 0)`, rows grow along
//! `+y` and columns along `+x`, and every cell is a square of side `cell_size`.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::spatial::SpatialIndex;

/// Continuous 2-D coordinate in the field's coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate the Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub(crate) fn as_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Horizontal wind velocity sampled at a cell, in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindVector {
    pub u: f64,
    pub v: f64,
}

impl WindVector {
    pub const ZERO: WindVector = WindVector { u: 0.0, v: 0.0 };

    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    /// Magnitude of the wind vector.
    pub fn speed(&self) -> f64 {
        self.u.hypot(self.v)
    }

    pub fn is_finite(&self) -> bool {
        self.u.is_finite() && self.v.is_finite()
    }

    pub fn scaled(&self, factor: f64) -> WindVector {
        WindVector {
            u: self.u * factor,
            v: self.v * factor,
        }
    }

    /// Component-wise mean of two samples.
    pub fn mean(a: WindVector, b: WindVector) -> WindVector {
        WindVector {
            u: 0.5 * (a.u + b.u),
            v: 0.5 * (a.v + b.v),
        }
    }
}

/// Discrete cell address. Ordered by row, then column.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CellIndex {
    pub row: usize,
    pub col: usize,
}

impl CellIndex {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Whether `other` differs from this cell along both axes.
    pub fn is_diagonal_to(&self, other: &CellIndex) -> bool {
        self.row != other.row && self.col != other.col
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.row, self.col)
    }
}

/// A single grid cell with its resolved wind and validity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub index: CellIndex,
    pub center: Position,
    pub wind: WindVector,
    pub traversable: bool,
}

/// Axis-aligned obstacle footprint (e.g. a building), boundaries inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleRect {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl ObstacleRect {
    pub fn new(min: Position, max: Position) -> Self {
        Self {
            min: min.as_array(),
            max: max.as_array(),
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|v| v.is_finite())
            && self.min[0] <= self.max[0]
            && self.min[1] <= self.max[1]
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.min[0]
            && position.x <= self.max[0]
            && position.y >= self.min[1]
            && position.y <= self.max[1]
    }
}

/// Neighbour offsets as `(d_row, d_col)`, in expansion order:
/// N, NE, E, SE, S, SW, W, NW.
pub(crate) const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Largest number of cells a grid may hold.
pub const MAX_GRID_CELLS: usize = 1 << 26;

/// Regular grid layout: origin, resolution, and extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridSpec {
    pub origin: Position,
    pub cell_size: f64,
    pub rows: usize,
    pub cols: usize,
}

impl GridSpec {
    /// Validate and create a grid layout.
    pub fn new(origin: Position, cell_size: f64, rows: usize, cols: usize) -> Result<Self> {
        if !origin.is_finite() {
            return Err(Error::invalid_config(format!(
                "grid origin must be finite, got {origin}"
            )));
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(Error::invalid_config(format!(
                "cell_size must be finite and positive, got {cell_size}"
            )));
        }
        if rows == 0 || cols == 0 {
            return Err(Error::invalid_config(format!(
                "grid must have at least one row and column, got {rows}x{cols}"
            )));
        }
        match rows.checked_mul(cols) {
            Some(cells) if cells <= MAX_GRID_CELLS => {}
            _ => {
                return Err(Error::invalid_config(format!(
                    "grid of {rows}x{cols} cells exceeds the limit of {MAX_GRID_CELLS} cells"
                )))
            }
        }
        Ok(Self {
            origin,
            cell_size,
            rows,
            cols,
        })
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major linear offset of a cell.
    pub fn linear(&self, index: CellIndex) -> usize {
        index.row * self.cols + index.col
    }

    /// Inverse of [`GridSpec::linear`].
    pub fn index_of(&self, linear: usize) -> CellIndex {
        CellIndex {
            row: linear / self.cols,
            col: linear % self.cols,
        }
    }

    pub fn in_bounds(&self, index: CellIndex) -> bool {
        index.row < self.rows && index.col < self.cols
    }

    /// Center coordinate of a cell.
    pub fn center(&self, index: CellIndex) -> Position {
        Position {
            x: self.origin.x + index.col as f64 * self.cell_size,
            y: self.origin.y + index.row as f64 * self.cell_size,
        }
    }

    /// Lower-left and upper-right corners of the area covered by all cells.
    pub fn extent(&self) -> (Position, Position) {
        let half = 0.5 * self.cell_size;
        (
            Position::new(self.origin.x - half, self.origin.y - half),
            Position::new(
                self.origin.x + (self.cols as f64 - 0.5) * self.cell_size,
                self.origin.y + (self.rows as f64 - 0.5) * self.cell_size,
            ),
        )
    }

    /// Whether a coordinate falls inside the grid extent (boundaries inclusive).
    pub fn contains(&self, position: Position) -> bool {
        let (min, max) = self.extent();
        position.is_finite()
            && position.x >= min.x
            && position.x <= max.x
            && position.y >= min.y
            && position.y <= max.y
    }

    /// The cell whose square contains `position`, ignoring validity.
    pub fn cell_at(&self, position: Position) -> Option<CellIndex> {
        if !self.contains(position) {
            return None;
        }
        let col = ((position.x - self.origin.x) / self.cell_size).round();
        let row = ((position.y - self.origin.y) / self.cell_size).round();
        let index = CellIndex {
            row: (row.max(0.0) as usize).min(self.rows - 1),
            col: (col.max(0.0) as usize).min(self.cols - 1),
        };
        Some(index)
    }

    /// Apply a neighbour offset, returning `None` when it leaves the grid.
    pub(crate) fn offset(&self, index: CellIndex, d_row: isize, d_col: isize) -> Option<CellIndex> {
        let row = index.row.checked_add_signed(d_row)?;
        let col = index.col.checked_add_signed(d_col)?;
        let next = CellIndex { row, col };
        self.in_bounds(next).then_some(next)
    }
}

/// Summary statistics over the wind of traversable cells.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WindStats {
    pub mean_speed: f64,
    pub max_speed: f64,
}

/// Immutable discretised environment: grid, cells, and the snapping index.
#[derive(Debug)]
pub struct Environment {
    grid: GridSpec,
    cells: Vec<Cell>,
    index: SpatialIndex,
}

impl Environment {
    /// Assemble an environment from a fully resolved row-major cell vector.
    pub(crate) fn from_cells(grid: GridSpec, cells: Vec<Cell>) -> Result<Self> {
        if cells.len() != grid.len() {
            return Err(Error::invalid_config(format!(
                "expected {} cells for a {}x{} grid, got {}",
                grid.len(),
                grid.rows,
                grid.cols,
                cells.len()
            )));
        }

        let index = SpatialIndex::build(&grid, &cells);
        let environment = Self { grid, cells, index };

        info!(
            rows = grid.rows,
            cols = grid.cols,
            cell_size = grid.cell_size,
            traversable = environment.traversable_count(),
            "built environment"
        );

        Ok(environment)
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: CellIndex) -> Option<&Cell> {
        if !self.grid.in_bounds(index) {
            return None;
        }
        self.cells.get(self.grid.linear(index))
    }

    /// Wind at a cell; zero for addresses outside the grid.
    pub fn wind_at(&self, index: CellIndex) -> WindVector {
        self.cell(index)
            .map(|cell| cell.wind)
            .unwrap_or(WindVector::ZERO)
    }

    pub fn is_traversable(&self, index: CellIndex) -> bool {
        self.cell(index).is_some_and(|cell| cell.traversable)
    }

    pub fn center(&self, index: CellIndex) -> Position {
        self.grid.center(index)
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Replace the snap radius used for out-of-extent coordinates.
    pub fn with_snap_radius(mut self, radius: f64) -> Self {
        self.index = self.index.with_snap_radius(radius);
        self
    }

    /// Resolve a coordinate to its nearest traversable cell.
    pub fn snap(&self, position: Position) -> Result<CellIndex> {
        self.index.snap(position)
    }

    pub fn traversable_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.traversable).count()
    }

    /// Traversable neighbours of `index` in fixed expansion order.
    ///
    /// When `allow_corner_cutting` is false, a diagonal neighbour is only
    /// reachable if both orthogonal cells shared with it are traversable.
    pub fn neighbours(
        &self,
        index: CellIndex,
        allow_corner_cutting: bool,
    ) -> impl Iterator<Item = CellIndex> + '_ {
        NEIGHBOUR_OFFSETS
            .iter()
            .filter_map(move |&(d_row, d_col)| {
                let next = self.grid.offset(index, d_row, d_col)?;
                if !self.is_traversable(next) {
                    return None;
                }
                if d_row != 0 && d_col != 0 && !allow_corner_cutting {
                    let vertical = self.grid.offset(index, d_row, 0)?;
                    let horizontal = self.grid.offset(index, 0, d_col)?;
                    if !self.is_traversable(vertical) || !self.is_traversable(horizontal) {
                        return None;
                    }
                }
                Some(next)
            })
    }

    pub fn wind_stats(&self) -> WindStats {
        let speeds: Vec<f64> = self
            .cells
            .iter()
            .filter(|cell| cell.traversable)
            .map(|cell| cell.wind.speed())
            .collect();
        if speeds.is_empty() {
            return WindStats::default();
        }
        WindStats {
            mean_speed: speeds.iter().sum::<f64>() / speeds.len() as f64,
            max_speed: speeds.iter().copied().fold(0.0, f64::max),
        }
    }
}

type WindFn = Box<dyn Fn(Position) -> WindVector>;

/// In-memory environment construction for tests and programmatic callers.
///
/// ```
/// use windpath_lib::{CellIndex, EnvironmentBuilder, WindVector};
///
/// let env = EnvironmentBuilder::new(10, 10, 1.0)
///     .uniform_wind(WindVector::new(1.0, 0.0))
///     .obstacle(CellIndex::new(5, 5))
///     .build()
///     .unwrap();
/// assert_eq!(env.traversable_count(), 99);
/// ```
pub struct EnvironmentBuilder {
    origin: Position,
    cell_size: f64,
    rows: usize,
    cols: usize,
    wind: WindFn,
    obstacles: HashSet<CellIndex>,
    rects: Vec<ObstacleRect>,
}

impl EnvironmentBuilder {
    pub fn new(rows: usize, cols: usize, cell_size: f64) -> Self {
        Self {
            origin: Position::new(0.0, 0.0),
            cell_size,
            rows,
            cols,
            wind: Box::new(|_| WindVector::ZERO),
            obstacles: HashSet::new(),
            rects: Vec::new(),
        }
    }

    pub fn origin(mut self, origin: Position) -> Self {
        self.origin = origin;
        self
    }

    pub fn uniform_wind(mut self, wind: WindVector) -> Self {
        self.wind = Box::new(move |_| wind);
        self
    }

    /// Sample wind from a function of the cell center.
    pub fn wind_fn(mut self, wind: impl Fn(Position) -> WindVector + 'static) -> Self {
        self.wind = Box::new(wind);
        self
    }

    pub fn obstacle(mut self, index: CellIndex) -> Self {
        self.obstacles.insert(index);
        self
    }

    pub fn obstacles(mut self, indices: impl IntoIterator<Item = CellIndex>) -> Self {
        self.obstacles.extend(indices);
        self
    }

    pub fn obstacle_rect(mut self, rect: ObstacleRect) -> Self {
        self.rects.push(rect);
        self
    }

    pub fn build(self) -> Result<Environment> {
        let grid = GridSpec::new(self.origin, self.cell_size, self.rows, self.cols)?;
        if let Some(rect) = self.rects.iter().find(|rect| !rect.is_well_formed()) {
            return Err(Error::invalid_config(format!(
                "obstacle rectangle {:?}..{:?} is not well formed",
                rect.min, rect.max
            )));
        }

        let cells = (0..grid.len())
            .map(|linear| {
                let index = grid.index_of(linear);
                let center = grid.center(index);
                let wind = (self.wind)(center);
                let blocked = self.obstacles.contains(&index)
                    || self.rects.iter().any(|rect| rect.contains(center));
                Cell {
                    index,
                    center,
                    wind,
                    traversable: !blocked && wind.is_finite(),
                }
            })
            .collect();

        Environment::from_cells(grid, cells)
    }
}
