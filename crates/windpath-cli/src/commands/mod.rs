// Handlers for the CLI subcommands.
//
// main.rs parses arguments and dispatches here; each module owns one subcommand.

pub mod compare;
pub mod inspect;
pub mod route;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use windpath_lib::{load_environment, Environment, VehicleConfig};

use crate::sources::SourcePaths;

/// Vehicle parameters shared by `route` and `compare`.
#[derive(Args, Debug, Clone, Copy)]
pub struct VehicleArgs {
    /// Constant ground speed in m/s.
    #[arg(long = "speed", default_value_t = 10.0)]
    pub cruise_speed: f64,
    /// Air density in kg/m^3.
    #[arg(long, default_value_t = 1.225)]
    pub air_density: f64,
    /// Dimensionless drag coefficient.
    #[arg(long, default_value_t = 1.0)]
    pub drag_coefficient: f64,
    /// Frontal area in m^2.
    #[arg(long, default_value_t = 0.1)]
    pub frontal_area: f64,
}

impl VehicleArgs {
    /// Build and validate the vehicle configuration.
    pub fn to_config(self) -> Result<VehicleConfig> {
        let vehicle = VehicleConfig {
            cruise_speed: self.cruise_speed,
            air_density: self.air_density,
            drag_coefficient: self.drag_coefficient,
            frontal_area: self.frontal_area,
        };
        vehicle.validate()?;
        Ok(vehicle)
    }
}

impl Default for VehicleArgs {
    fn default() -> Self {
        let vehicle = VehicleConfig::default();
        Self {
            cruise_speed: vehicle.cruise_speed,
            air_density: vehicle.air_density,
            drag_coefficient: vehicle.drag_coefficient,
            frontal_area: vehicle.frontal_area,
        }
    }
}

/// Load the environment described by `paths`.
pub fn load(paths: &SourcePaths) -> Result<Environment> {
    debug!(
        geometry = %paths.geometry.display(),
        velocity = %paths.velocity.display(),
        "loading environment"
    );
    load_environment(&paths.geometry, &paths.velocity).with_context(|| {
        format!(
            "failed to load environment from {} and {}",
            paths.geometry.display(),
            paths.velocity.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vehicle_args_match_library_defaults() {
        let vehicle = VehicleArgs::default().to_config().unwrap();
        assert_eq!(vehicle, VehicleConfig::default());
    }

    #[test]
    fn invalid_vehicle_args_are_rejected() {
        let args = VehicleArgs {
            cruise_speed: 0.0,
            ..VehicleArgs::default()
        };
        assert!(args.to_config().is_err());
    }
}
