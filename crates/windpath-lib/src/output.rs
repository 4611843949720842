//! Serialisable summaries of environments, routes, and scenario comparisons.

use serde::Serialize;

use crate::cost::{CostMode, VehicleConfig};
use crate::error::Result;
use crate::field::{CellIndex, Environment, GridSpec, Position, WindStats};
use crate::metrics::{plan_energy, plan_length, EnergyComparison};
use crate::routing::{RoutePlan, SegmentReport};
use crate::scenario::{RouteEvaluation, ScenarioReport};

/// Overview of a loaded environment.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnvironmentSummary {
    pub grid: GridSpec,
    pub extent: [Position; 2],
    pub cells: usize,
    pub traversable: usize,
    pub obstacles: usize,
    pub wind: WindStats,
}

impl EnvironmentSummary {
    pub fn from_environment(env: &Environment) -> Self {
        let grid = *env.grid();
        let (min, max) = grid.extent();
        let traversable = env.traversable_count();
        Self {
            grid,
            extent: [min, max],
            cells: grid.len(),
            traversable,
            obstacles: grid.len() - traversable,
            wind: env.wind_stats(),
        }
    }
}

/// Step taken along a planned path.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PathStep {
    pub index: usize,
    pub cell: CellIndex,
    pub position: Position,
}

/// Structured representation of a planned route that higher-level consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub mode: CostMode,
    pub no_wind: bool,
    pub complete: bool,
    pub segments: Vec<SegmentReport>,
    pub cells: usize,
    pub length: f64,
    /// Drag work in the actual wind field.
    pub energy: f64,
    /// Drag work for the same path in still air.
    pub energy_no_wind: f64,
    pub steps: Vec<PathStep>,
}

impl RouteSummary {
    /// Evaluate a plan's path and collect it into a summary.
    ///
    /// Plans whose every segment was skipped summarise as zero length and energy.
    pub fn from_plan(env: &Environment, plan: &RoutePlan, vehicle: &VehicleConfig) -> Result<Self> {
        let length = plan_length(plan)?;
        let energy = plan_energy(plan, env, vehicle, false)?;
        let energy_no_wind = plan_energy(plan, env, vehicle, true)?;

        let steps = plan
            .path
            .cells()
            .iter()
            .zip(plan.path.points())
            .enumerate()
            .map(|(index, (cell, position))| PathStep {
                index,
                cell: *cell,
                position: *position,
            })
            .collect();

        Ok(Self {
            mode: plan.mode,
            no_wind: plan.no_wind,
            complete: plan.is_complete(),
            segments: plan.segments.clone(),
            cells: plan.path.len(),
            length,
            energy,
            energy_no_wind,
            steps,
        })
    }
}

/// Metrics for one optimisation objective in a scenario comparison.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ObjectiveSummary {
    pub mode: CostMode,
    pub complete: bool,
    pub cells: usize,
    pub length: f64,
    pub energy: f64,
    pub path: Vec<Position>,
}

impl ObjectiveSummary {
    fn from_evaluation(evaluation: &RouteEvaluation) -> Self {
        Self {
            mode: evaluation.plan.mode,
            complete: evaluation.plan.is_complete(),
            cells: evaluation.path().len(),
            length: evaluation.length,
            energy: evaluation.energy,
            path: evaluation.path().points().to_vec(),
        }
    }
}

/// Serializable outcome of a scenario comparison.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScenarioSummary {
    pub name: String,
    pub waypoints: Vec<Position>,
    pub distance: ObjectiveSummary,
    pub energy: ObjectiveSummary,
    pub comparison: EnergyComparison,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_percent: Option<f64>,
}

impl ScenarioSummary {
    pub fn from_report(report: &ScenarioReport) -> Self {
        Self {
            name: report.name.clone(),
            waypoints: report.waypoints.clone(),
            distance: ObjectiveSummary::from_evaluation(&report.distance),
            energy: ObjectiveSummary::from_evaluation(&report.energy),
            comparison: report.comparison,
            savings_percent: report.comparison.savings_percent(),
        }
    }
}
