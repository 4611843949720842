//! Post-hoc evaluation of planned paths.

use serde::Serialize;

use crate::cost::{edge_distance, edge_energy, VehicleConfig};
use crate::error::{Error, Result};
use crate::field::{Environment, WindVector};
use crate::path::Path;
use crate::routing::RoutePlan;

/// Total Euclidean length of a path through its cell centers.
///
/// A single-point path has length zero; an empty path is an error.
pub fn path_length(path: &Path) -> Result<f64> {
    if path.is_empty() {
        return Err(Error::EmptyPath);
    }
    Ok(path
        .points()
        .windows(2)
        .map(|pair| edge_distance(pair[0], pair[1]))
        .sum())
}

/// Total drag work along a path, using the same formula as the search.
pub fn path_energy(
    path: &Path,
    env: &Environment,
    vehicle: &VehicleConfig,
    no_wind: bool,
) -> Result<f64> {
    if path.is_empty() {
        return Err(Error::EmptyPath);
    }
    vehicle.validate()?;

    let wind = |index| {
        if no_wind {
            WindVector::ZERO
        } else {
            env.wind_at(index)
        }
    };

    Ok(path
        .cells()
        .windows(2)
        .zip(path.points().windows(2))
        .map(|(cells, points)| {
            edge_energy(points[0], points[1], wind(cells[0]), wind(cells[1]), vehicle)
        })
        .sum())
}

/// Length of a planned route, summed over its pieces.
///
/// Skipped segments contribute nothing and a plan with no found segment
/// measures zero.
pub fn plan_length(plan: &RoutePlan) -> Result<f64> {
    plan.pieces.iter().map(path_length).sum()
}

/// Drag work of a planned route, summed over its pieces.
pub fn plan_energy(
    plan: &RoutePlan,
    env: &Environment,
    vehicle: &VehicleConfig,
    no_wind: bool,
) -> Result<f64> {
    vehicle.validate()?;
    plan.pieces
        .iter()
        .map(|piece| path_energy(piece, env, vehicle, no_wind))
        .sum()
}

/// Ratio of windy to still-air energy for the same path.
///
/// `None` when the still-air energy is zero (single-point paths).
pub fn energy_ratio(path: &Path, env: &Environment, vehicle: &VehicleConfig) -> Result<Option<f64>> {
    let windy = path_energy(path, env, vehicle, false)?;
    let still = path_energy(path, env, vehicle, true)?;
    Ok((still > 0.0).then(|| windy / still))
}

/// Energy of a baseline route versus an optimised one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyComparison {
    pub baseline: f64,
    pub optimized: f64,
}

impl EnergyComparison {
    pub fn new(baseline: f64, optimized: f64) -> Self {
        Self {
            baseline,
            optimized,
        }
    }

    /// Percentage of baseline energy saved; `None` when the baseline is zero.
    pub fn savings_percent(&self) -> Option<f64> {
        (self.baseline > 0.0).then(|| (self.baseline - self.optimized) / self.baseline * 100.0)
    }

    pub fn absolute_savings(&self) -> f64 {
        self.baseline - self.optimized
    }
}
