//! Multi-waypoint route planning.
//!
//! A route visits an ordered list of waypoints. Each consecutive pair is
//! searched independently and the resulting segments are stitched into a
//! single [`Path`], sharing the junction cell between segments. Skipped
//! segments split the route into separate [`RoutePlan::pieces`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cost::CostMode;
use crate::error::{Error, Result};
use crate::field::{CellIndex, Environment, Position};
use crate::path::{search_with_stats, Path, SearchOptions, SearchOutcome};

/// What to do when a segment has no path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnreachablePolicy {
    /// Fail the whole route with [`Error::RouteNotFound`].
    #[default]
    Abort,
    /// Record the segment as unreachable and continue with the next one.
    Skip,
}

impl fmt::Display for UnreachablePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            UnreachablePolicy::Abort => "abort",
            UnreachablePolicy::Skip => "skip",
        };
        f.write_str(value)
    }
}

/// High-level route planning request.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub waypoints: Vec<Position>,
    pub options: SearchOptions,
    pub unreachable: UnreachablePolicy,
}

impl RouteRequest {
    pub fn new(waypoints: Vec<Position>, options: SearchOptions) -> Self {
        Self {
            waypoints,
            options,
            unreachable: UnreachablePolicy::default(),
        }
    }

    /// Convenience constructor for a single start-to-goal leg.
    pub fn between(start: Position, goal: Position, options: SearchOptions) -> Self {
        Self::new(vec![start, goal], options)
    }

    pub fn with_policy(mut self, policy: UnreachablePolicy) -> Self {
        self.unreachable = policy;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    Found,
    Unreachable,
}

/// Outcome of one waypoint-to-waypoint leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentReport {
    pub index: usize,
    pub from: Position,
    pub to: Position,
    pub start_cell: CellIndex,
    pub goal_cell: CellIndex,
    pub status: SegmentStatus,
    /// Number of cells in the segment's own path (0 when unreachable).
    pub cells: usize,
    pub nodes_expanded: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// Planned route returned by the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub mode: CostMode,
    pub no_wind: bool,
    pub segments: Vec<SegmentReport>,
    /// Every found segment in order. Consecutive cells are not adjacent
    /// across a skipped segment.
    pub path: Path,
    /// Runs of adjacent segments; a new piece starts after each skipped segment.
    #[serde(skip)]
    pub pieces: Vec<Path>,
}

impl RoutePlan {
    /// Whether every segment was found.
    pub fn is_complete(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| segment.status == SegmentStatus::Found)
    }

    pub fn unreachable_segments(&self) -> impl Iterator<Item = &SegmentReport> {
        self.segments
            .iter()
            .filter(|segment| segment.status == SegmentStatus::Unreachable)
    }

    /// Sum of per-segment search costs for found segments.
    pub fn total_cost(&self) -> f64 {
        self.segments.iter().filter_map(|segment| segment.cost).sum()
    }
}

/// Plan a route through every waypoint of `request`.
///
/// Snapping failures are always fatal. Unreachable segments either abort the
/// route or are skipped according to [`RouteRequest::unreachable`].
pub fn plan_route(env: &Environment, request: &RouteRequest) -> Result<RoutePlan> {
    if request.waypoints.len() < 2 {
        return Err(Error::invalid_config(format!(
            "a route needs at least two waypoints, got {}",
            request.waypoints.len()
        )));
    }

    let options = &request.options;
    let mut path = Path::default();
    let mut pieces: Vec<Path> = Vec::new();
    let mut after_gap = true;
    let mut segments = Vec::with_capacity(request.waypoints.len() - 1);

    for (index, pair) in request.waypoints.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        let (outcome, stats) = search_with_stats(from, to, env, options)?;

        match outcome {
            SearchOutcome::Found(segment) => {
                debug!(segment = index, cells = segment.len(), "segment found");
                segments.push(SegmentReport {
                    index,
                    from,
                    to,
                    start_cell: segment.first().unwrap_or_default(),
                    goal_cell: segment.last().unwrap_or_default(),
                    status: SegmentStatus::Found,
                    cells: segment.len(),
                    nodes_expanded: stats.nodes_expanded,
                    cost: stats.path_cost,
                });
                path.append_segment(segment.clone());
                if after_gap {
                    pieces.push(segment);
                } else if let Some(piece) = pieces.last_mut() {
                    piece.append_segment(segment);
                }
                after_gap = false;
            }
            SearchOutcome::NotFound => {
                if request.unreachable == UnreachablePolicy::Abort {
                    return Err(Error::RouteNotFound {
                        segment: index,
                        from: (from.x, from.y),
                        to: (to.x, to.y),
                    });
                }

                warn!(segment = index, %from, %to, "no path for segment; skipping");
                after_gap = true;
                segments.push(SegmentReport {
                    index,
                    from,
                    to,
                    start_cell: snap_for_report(env, from, options),
                    goal_cell: snap_for_report(env, to, options),
                    status: SegmentStatus::Unreachable,
                    cells: 0,
                    nodes_expanded: stats.nodes_expanded,
                    cost: None,
                });
            }
        }
    }

    Ok(RoutePlan {
        mode: options.cost.mode,
        no_wind: options.cost.no_wind,
        segments,
        path,
        pieces,
    })
}

// Both endpoints already snapped successfully inside the search.
fn snap_for_report(env: &Environment, position: Position, options: &SearchOptions) -> CellIndex {
    let snapped = match options.snap_radius {
        Some(radius) => env.spatial_index().snap_within(position, radius),
        None => env.snap(position),
    };
    snapped.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::EnvironmentBuilder;

    #[test]
    fn rejects_single_waypoint() {
        let env = EnvironmentBuilder::new(2, 2, 1.0).build().unwrap();
        let request = RouteRequest::new(vec![Position::new(0.0, 0.0)], SearchOptions::default());
        assert!(matches!(
            plan_route(&env, &request),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn policy_display() {
        assert_eq!(UnreachablePolicy::Skip.to_string(), "skip");
        assert_eq!(UnreachablePolicy::default(), UnreachablePolicy::Abort);
    }
}
