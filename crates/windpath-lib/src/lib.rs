//! Windpath library entry points.
//!
//! This crate loads a discretised 2-D wind field, snaps continuous waypoints
//! onto its grid, and plans 8-connected paths that minimise either geometric
//! distance or the drag work of a vehicle flying at constant ground speed.
//! Higher-level consumers (the CLI, scenario scripts) should only depend on
//! the functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod cost;
pub mod dataset;
pub mod error;
pub mod field;
pub mod metrics;
pub mod output;
pub mod path;
pub mod routing;
pub mod scenario;
pub mod spatial;

pub use cost::{
    edge_energy, select_cost_model, CostMode, CostModel, CostOptions, DistanceCost, EnergyCost,
    VehicleConfig,
};
pub use dataset::{load_environment, GeometrySource, MaskValue, VelocitySample, VelocitySource};
pub use error::{Error, Result};
pub use field::{
    Cell, CellIndex, Environment, EnvironmentBuilder, GridSpec, ObstacleRect, Position,
    WindStats, WindVector,
};
pub use metrics::{
    energy_ratio, path_energy, path_length, plan_energy, plan_length, EnergyComparison,
};
pub use output::{EnvironmentSummary, RouteSummary, ScenarioSummary};
pub use path::{search, search_with_stats, Path, SearchOptions, SearchOutcome, SearchStats};
pub use routing::{
    plan_route, RoutePlan, RouteRequest, SegmentReport, SegmentStatus, UnreachablePolicy,
};
pub use scenario::{run_scenario, Scenario, ScenarioReport, ScenarioSet};
pub use spatial::{SpatialIndex, SNAP_RADIUS_CELLS};
