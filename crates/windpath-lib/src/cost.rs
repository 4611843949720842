//! Edge cost strategies for path search.
//!
//! The [`CostModel`] trait lets the search stay agnostic of what it is
//! minimising. Two strategies exist:
//!
//! - [`DistanceCost`]: Euclidean distance between cell centers; wind ignored.
//! - [`EnergyCost`]: work done against quadratic aerodynamic drag while
//!   holding a constant ground speed, using the mean wind of the two
//!   endpoints (or no wind at all for the baseline).
//!
//! [`edge_energy`] is exported so that path metrics evaluate energy with the
//! exact same formula the search optimises.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::field::{CellIndex, Environment, Position, WindVector};

/// Objective minimised by the path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CostMode {
    /// Shortest geometric path (default).
    #[default]
    Distance,
    /// Least drag work through the wind field.
    Energy,
}

impl fmt::Display for CostMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            CostMode::Distance => "distance",
            CostMode::Energy => "energy",
        };
        f.write_str(value)
    }
}

/// Aerodynamic and kinematic parameters of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Constant ground speed in m/s.
    pub cruise_speed: f64,
    /// Air density in kg/m³.
    pub air_density: f64,
    pub drag_coefficient: f64,
    /// Reference area in m².
    pub frontal_area: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            cruise_speed: 10.0,
            air_density: 1.225,
            drag_coefficient: 1.0,
            frontal_area: 0.1,
        }
    }
}

impl VehicleConfig {
    /// Reject non-finite or non-positive parameters.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("cruise_speed", self.cruise_speed),
            ("air_density", self.air_density),
            ("drag_coefficient", self.drag_coefficient),
            ("frontal_area", self.frontal_area),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::invalid_config(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Drag factor `k = ½ ρ C_d A`, so drag force is `k |r|²`.
    pub fn drag_factor(&self) -> f64 {
        0.5 * self.air_density * self.drag_coefficient * self.frontal_area
    }
}

/// Cost selection carried by search options.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CostOptions {
    pub mode: CostMode,
    /// Evaluate energy as if the air were still. Ignored in distance mode.
    pub no_wind: bool,
    pub vehicle: VehicleConfig,
}

impl CostOptions {
    pub fn distance() -> Self {
        Self::default()
    }

    pub fn energy(vehicle: VehicleConfig) -> Self {
        Self {
            mode: CostMode::Energy,
            no_wind: false,
            vehicle,
        }
    }

    pub fn with_no_wind(mut self, no_wind: bool) -> Self {
        self.no_wind = no_wind;
        self
    }
}

/// Strategy for pricing a single move between adjacent cells.
///
/// Implementations must be pure: the same inputs always yield the same
/// non-negative cost.
pub trait CostModel: Send + Sync {
    /// The objective this model implements.
    fn mode(&self) -> CostMode;

    /// Cost of moving from `from` to `to` (adjacent, both traversable).
    fn edge_cost(&self, env: &Environment, from: CellIndex, to: CellIndex) -> f64;
}

/// Euclidean distance between cell centers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceCost;

impl CostModel for DistanceCost {
    fn mode(&self) -> CostMode {
        CostMode::Distance
    }

    fn edge_cost(&self, env: &Environment, from: CellIndex, to: CellIndex) -> f64 {
        edge_distance(env.center(from), env.center(to))
    }
}

/// Drag work along the edge.
#[derive(Debug, Clone, Copy)]
pub struct EnergyCost {
    vehicle: VehicleConfig,
    no_wind: bool,
}

impl EnergyCost {
    pub fn new(vehicle: VehicleConfig) -> Self {
        Self {
            vehicle,
            no_wind: false,
        }
    }

    /// Baseline variant that ignores the wind field.
    pub fn still_air(vehicle: VehicleConfig) -> Self {
        Self {
            vehicle,
            no_wind: true,
        }
    }

    pub fn vehicle(&self) -> &VehicleConfig {
        &self.vehicle
    }

    pub fn ignores_wind(&self) -> bool {
        self.no_wind
    }
}

impl CostModel for EnergyCost {
    fn mode(&self) -> CostMode {
        CostMode::Energy
    }

    fn edge_cost(&self, env: &Environment, from: CellIndex, to: CellIndex) -> f64 {
        let (wind_from, wind_to) = if self.no_wind {
            (WindVector::ZERO, WindVector::ZERO)
        } else {
            (env.wind_at(from), env.wind_at(to))
        };
        edge_energy(
            env.center(from),
            env.center(to),
            wind_from,
            wind_to,
            &self.vehicle,
        )
    }
}

/// Select the cost strategy for the given options.
pub fn select_cost_model(options: &CostOptions) -> Box<dyn CostModel> {
    match options.mode {
        CostMode::Distance => Box::new(DistanceCost),
        CostMode::Energy if options.no_wind => Box::new(EnergyCost::still_air(options.vehicle)),
        CostMode::Energy => Box::new(EnergyCost::new(options.vehicle)),
    }
}

/// Euclidean length of the displacement between two points.
pub fn edge_distance(from: Position, to: Position) -> f64 {
    from.distance_to(&to)
}

/// Work needed to fly from `from` to `to` at cruise speed against drag.
///
/// With unit direction `d`, ground speed `V` and mean wind `w` the air-relative
/// velocity is `r = V d - w`. Thrust balancing drag is `k |r| r`, so the work
/// over length `L` is `k |r| (r · d) L`. The result is clamped at zero.
pub fn edge_energy(
    from: Position,
    to: Position,
    wind_from: WindVector,
    wind_to: WindVector,
    vehicle: &VehicleConfig,
) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length = dx.hypot(dy);
    if length == 0.0 {
        return 0.0;
    }

    let (dir_x, dir_y) = (dx / length, dy / length);
    let wind = WindVector::mean(wind_from, wind_to);
    let rel_x = vehicle.cruise_speed * dir_x - wind.u;
    let rel_y = vehicle.cruise_speed * dir_y - wind.v;
    let airspeed = rel_x.hypot(rel_y);
    let along = rel_x * dir_x + rel_y * dir_y;

    (vehicle.drag_factor() * airspeed * along * length).max(0.0)
}
