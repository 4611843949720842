//! Named waypoint scenarios and the distance-versus-energy comparison run.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cost::{CostOptions, VehicleConfig};
use crate::error::{Error, Result};
use crate::field::{Environment, Position};
use crate::metrics::{plan_energy, plan_length, EnergyComparison};
use crate::path::{Path, SearchOptions};
use crate::routing::{plan_route, RoutePlan, RouteRequest, UnreachablePolicy};

/// Minimum Jaro-Winkler similarity for a name to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.8;
const MAX_SUGGESTIONS: usize = 3;

/// An ordered list of waypoints to visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub waypoints: Vec<Position>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, waypoints: Vec<Position>) -> Self {
        Self {
            name: name.into(),
            waypoints,
        }
    }
}

/// A collection of uniquely named scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    /// Build a set, rejecting duplicate names and scenarios with fewer than two waypoints.
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self> {
        let set = Self { scenarios };
        set.validate()?;
        Ok(set)
    }

    /// The reference scenario: start south, stop over north, finish south-west.
    pub fn builtin() -> Self {
        Self {
            scenarios: vec![Scenario::new(
                "Scenario_1",
                vec![
                    Position::new(0.0, -2.5),
                    Position::new(0.0, 2.5),
                    Position::new(-2.5, -2.5),
                ],
            )],
        }
    }

    /// Load a scenario set from a JSON file.
    ///
    /// Waypoints may be written as `{"x": .., "y": ..}` objects or `[x, y]` pairs.
    pub fn from_path(path: &FsPath) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DatasetNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path)?;
        Self::from_reader(file).map_err(|err| match err {
            Error::Json(err) => Error::data_load(path, format!("malformed scenario file: {err}")),
            Error::InvalidConfig { message } => Error::data_load(path, message),
            other => other,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let set: ScenarioSet = serde_json::from_reader(BufReader::new(reader))?;
        set.validate()?;
        Ok(set)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            if scenario.name.trim().is_empty() {
                return Err(Error::invalid_config("scenario names must not be empty"));
            }
            if !seen.insert(scenario.name.as_str()) {
                return Err(Error::invalid_config(format!(
                    "duplicate scenario name '{}'",
                    scenario.name
                )));
            }
            if scenario.waypoints.len() < 2 {
                return Err(Error::invalid_config(format!(
                    "scenario '{}' needs at least two waypoints",
                    scenario.name
                )));
            }
            if let Some(waypoint) = scenario.waypoints.iter().find(|p| !p.is_finite()) {
                return Err(Error::invalid_config(format!(
                    "scenario '{}' has a non-finite waypoint {}",
                    scenario.name, waypoint
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.iter().map(|scenario| scenario.name.as_str())
    }

    /// Look up a scenario by exact name.
    pub fn get(&self, name: &str) -> Result<&Scenario> {
        self.scenarios
            .iter()
            .find(|scenario| scenario.name == name)
            .ok_or_else(|| Error::UnknownScenario {
                name: name.to_string(),
                suggestions: self.fuzzy_matches(name, MAX_SUGGESTIONS),
            })
    }

    /// Names similar to `name`, best match first.
    pub fn fuzzy_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let query = name.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .names()
            .map(|candidate| {
                (
                    strsim::jaro_winkler(&query, &candidate.to_lowercase()),
                    candidate,
                )
            })
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, candidate)| candidate.to_string())
            .collect()
    }
}

impl Default for ScenarioSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A planned route together with its evaluated metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEvaluation {
    pub plan: RoutePlan,
    pub length: f64,
    /// Drag work in the actual wind field.
    pub energy: f64,
}

impl RouteEvaluation {
    fn evaluate(env: &Environment, plan: RoutePlan, vehicle: &VehicleConfig) -> Result<Self> {
        let length = plan_length(&plan)?;
        let energy = plan_energy(&plan, env, vehicle, false)?;
        Ok(Self {
            plan,
            length,
            energy,
        })
    }

    pub fn path(&self) -> &Path {
        &self.plan.path
    }
}

/// Distance-optimal versus energy-optimal routes for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub waypoints: Vec<Position>,
    pub distance: RouteEvaluation,
    pub energy: RouteEvaluation,
    pub comparison: EnergyComparison,
}

/// Plan the scenario twice (distance and energy objectives) and compare the
/// windy energy of both routes.
pub fn run_scenario(
    env: &Environment,
    scenario: &Scenario,
    vehicle: &VehicleConfig,
    policy: UnreachablePolicy,
) -> Result<ScenarioReport> {
    vehicle.validate()?;

    let plan_with = |cost: CostOptions| {
        let request =
            RouteRequest::new(scenario.waypoints.clone(), SearchOptions::new(cost)).with_policy(policy);
        plan_route(env, &request)
    };

    let distance_plan = plan_with(CostOptions::distance())?;
    let energy_plan = plan_with(CostOptions::energy(*vehicle))?;

    let distance = RouteEvaluation::evaluate(env, distance_plan, vehicle)?;
    let energy = RouteEvaluation::evaluate(env, energy_plan, vehicle)?;
    let comparison = EnergyComparison::new(distance.energy, energy.energy);

    info!(
        scenario = %scenario.name,
        distance_energy = distance.energy,
        energy_energy = energy.energy,
        savings = ?comparison.savings_percent(),
        "scenario evaluated"
    );

    Ok(ScenarioReport {
        name: scenario.name.clone(),
        waypoints: scenario.waypoints.clone(),
        distance,
        energy,
        comparison,
    })
}
