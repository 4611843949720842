use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;
use tracing::debug;

use crate::cost::{select_cost_model, CostModel, CostOptions};
use crate::error::Result;
use crate::field::{CellIndex, Environment, Position};

/// Ordered sequence of cells together with their center coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Path {
    cells: Vec<CellIndex>,
    points: Vec<Position>,
}

impl Path {
    /// Build a path from cell addresses, resolving centers from the environment.
    pub fn from_cells(env: &Environment, cells: Vec<CellIndex>) -> Self {
        let points = cells.iter().map(|&cell| env.center(cell)).collect();
        Self { cells, points }
    }

    pub fn cells(&self) -> &[CellIndex] {
        &self.cells
    }

    /// Cell centers, one per cell.
    pub fn points(&self) -> &[Position] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn first(&self) -> Option<CellIndex> {
        self.cells.first().copied()
    }

    pub fn last(&self) -> Option<CellIndex> {
        self.cells.last().copied()
    }

    /// Number of moves between consecutive cells.
    pub fn step_count(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Append `segment`, dropping its first cell when it repeats our last one.
    pub fn append_segment(&mut self, segment: Path) {
        let skip = match (self.last(), segment.first()) {
            (Some(last), Some(first)) if last == first => 1,
            _ => 0,
        };
        self.cells.extend(segment.cells.into_iter().skip(skip));
        self.points.extend(segment.points.into_iter().skip(skip));
    }
}

/// Result of a single start-to-goal search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum SearchOutcome {
    Found(Path),
    /// The goal is not reachable through traversable cells.
    NotFound,
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            SearchOutcome::NotFound => None,
        }
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            SearchOutcome::NotFound => None,
        }
    }
}

/// Options controlling a single search.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SearchOptions {
    pub cost: CostOptions,
    /// Permit diagonal moves that clip the corner of an obstacle cell.
    pub allow_corner_cutting: bool,
    /// Override the environment's snap radius for the endpoints.
    pub snap_radius: Option<f64>,
}

impl SearchOptions {
    pub fn new(cost: CostOptions) -> Self {
        Self {
            cost,
            ..Self::default()
        }
    }
}

/// Counters collected while searching.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SearchStats {
    /// Cells popped from the queue and settled.
    pub nodes_expanded: usize,
    /// Accumulated cost of the returned path under the search's cost model.
    pub path_cost: Option<f64>,
}

/// Find the cheapest path between two coordinates.
pub fn search(
    start: Position,
    goal: Position,
    env: &Environment,
    options: &SearchOptions,
) -> Result<SearchOutcome> {
    search_with_stats(start, goal, env, options).map(|(outcome, _)| outcome)
}

/// Like [`search`], also returning expansion statistics.
pub fn search_with_stats(
    start: Position,
    goal: Position,
    env: &Environment,
    options: &SearchOptions,
) -> Result<(SearchOutcome, SearchStats)> {
    options.cost.vehicle.validate()?;

    let start_cell = snap(env, start, options.snap_radius)?;
    let goal_cell = snap(env, goal, options.snap_radius)?;

    if start_cell == goal_cell {
        let path = Path::from_cells(env, vec![start_cell]);
        let stats = SearchStats {
            nodes_expanded: 0,
            path_cost: Some(0.0),
        };
        return Ok((SearchOutcome::Found(path), stats));
    }

    let model = select_cost_model(&options.cost);
    let (cells, stats) = dijkstra(
        env,
        start_cell,
        goal_cell,
        model.as_ref(),
        options.allow_corner_cutting,
    );

    debug!(
        mode = %model.mode(),
        start = %start_cell,
        goal = %goal_cell,
        expanded = stats.nodes_expanded,
        found = cells.is_some(),
        "search finished"
    );

    let outcome = match cells {
        Some(cells) => SearchOutcome::Found(Path::from_cells(env, cells)),
        None => SearchOutcome::NotFound,
    };
    Ok((outcome, stats))
}

fn snap(env: &Environment, position: Position, radius: Option<f64>) -> Result<CellIndex> {
    match radius {
        Some(radius) => env.spatial_index().snap_within(position, radius),
        None => env.snap(position),
    }
}

/// Dijkstra over the implicit 8-connected grid using dense per-call tables.
fn dijkstra(
    env: &Environment,
    start: CellIndex,
    goal: CellIndex,
    model: &dyn CostModel,
    allow_corner_cutting: bool,
) -> (Option<Vec<CellIndex>>, SearchStats) {
    let grid = env.grid();
    let start_id = grid.linear(start);
    let goal_id = grid.linear(goal);

    let mut distances = vec![f64::INFINITY; grid.len()];
    let mut parents: Vec<Option<usize>> = vec![None; grid.len()];
    let mut settled = vec![false; grid.len()];
    let mut queue = BinaryHeap::new();
    let mut stats = SearchStats::default();

    distances[start_id] = 0.0;
    queue.push(QueueEntry::new(start_id, 0.0));

    while let Some(entry) = queue.pop() {
        if settled[entry.node] {
            continue;
        }
        settled[entry.node] = true;
        stats.nodes_expanded += 1;

        if entry.node == goal_id {
            stats.path_cost = Some(distances[goal_id]);
            let path = reconstruct_path(&parents, start_id, goal_id)
                .into_iter()
                .map(|id| grid.index_of(id))
                .collect();
            return (Some(path), stats);
        }

        let current = grid.index_of(entry.node);
        let current_distance = distances[entry.node];
        for next in env.neighbours(current, allow_corner_cutting) {
            let next_id = grid.linear(next);
            if settled[next_id] {
                continue;
            }
            let next_cost = current_distance + model.edge_cost(env, current, next);
            if next_cost < distances[next_id] {
                distances[next_id] = next_cost;
                parents[next_id] = Some(entry.node);
                queue.push(QueueEntry::new(next_id, next_cost));
            }
        }
    }

    (None, stats)
}

fn reconstruct_path(parents: &[Option<usize>], start: usize, goal: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents[node];
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Queue entry keyed by `(cost, linear index)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: usize,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: usize, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost, then index.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
