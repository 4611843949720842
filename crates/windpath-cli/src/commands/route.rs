//! `route` subcommand: plan a path through one or more waypoints.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;

use windpath_lib::{
    plan_route, CostMode, CostOptions, Position, RouteRequest, RouteSummary, SearchOptions,
    UnreachablePolicy,
};

use super::{load, VehicleArgs};
use crate::output::OutputFormat;
use crate::sources::{parse_point, SourcePaths};

/// Objective selectable from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    #[default]
    Distance,
    Energy,
}

impl From<ModeArg> for CostMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Distance => CostMode::Distance,
            ModeArg::Energy => CostMode::Energy,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    /// Start coordinate as X,Y.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub from: Position,
    /// Goal coordinate as X,Y.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub to: Position,
    /// Intermediate waypoint as X,Y. Repeat for several, visited in order.
    #[arg(long = "via", value_parser = parse_point, allow_hyphen_values = true)]
    pub via: Vec<Position>,
    /// Objective to minimise.
    #[arg(long, value_enum, default_value_t = ModeArg::Distance)]
    pub mode: ModeArg,
    /// Evaluate energy as if the air were still.
    #[arg(long)]
    pub no_wind: bool,
    /// Permit diagonal moves between two blocked orthogonal neighbours.
    #[arg(long)]
    pub allow_corner_cutting: bool,
    /// Search radius in metres when snapping waypoints onto traversable cells.
    #[arg(long)]
    pub snap_radius: Option<f64>,
    /// Continue past unreachable legs instead of failing.
    #[arg(long)]
    pub skip_unreachable: bool,
    #[command(flatten)]
    pub vehicle: VehicleArgs,
}

impl RouteArgs {
    /// Build the library request from the parsed flags.
    pub fn to_request(&self) -> Result<RouteRequest> {
        let vehicle = self.vehicle.to_config()?;
        if let Some(radius) = self.snap_radius {
            if !radius.is_finite() || radius < 0.0 {
                bail!("--snap-radius must be finite and non-negative, got {radius}");
            }
        }
        let cost = CostOptions {
            mode: self.mode.into(),
            no_wind: self.no_wind,
            vehicle,
        };
        let mut options = SearchOptions::new(cost);
        options.allow_corner_cutting = self.allow_corner_cutting;
        options.snap_radius = self.snap_radius;

        let mut waypoints = Vec::with_capacity(self.via.len() + 2);
        waypoints.push(self.from);
        waypoints.extend(self.via.iter().copied());
        waypoints.push(self.to);

        let policy = if self.skip_unreachable {
            UnreachablePolicy::Skip
        } else {
            UnreachablePolicy::Abort
        };
        Ok(RouteRequest::new(waypoints, options).with_policy(policy))
    }
}

pub fn handle_route(args: &RouteArgs, paths: &SourcePaths, format: OutputFormat) -> Result<()> {
    let env = load(paths)?;
    let request = args.to_request()?;
    let plan = plan_route(&env, &request).context("route planning failed")?;
    info!(
        mode = %plan.mode,
        cells = plan.path.len(),
        complete = plan.is_complete(),
        "route planned"
    );

    let summary = RouteSummary::from_plan(&env, &plan, &request.options.cost.vehicle)?;
    print!("{}", format.render_route(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RouteArgs {
        RouteArgs {
            from: Position::new(0.0, -2.5),
            to: Position::new(0.0, 2.5),
            via: vec![Position::new(1.0, 0.0)],
            mode: ModeArg::Energy,
            no_wind: true,
            allow_corner_cutting: true,
            snap_radius: None,
            skip_unreachable: false,
            vehicle: VehicleArgs::default(),
        }
    }

    #[test]
    fn request_orders_waypoints() {
        let request = args().to_request().unwrap();
        assert_eq!(
            request.waypoints,
            vec![
                Position::new(0.0, -2.5),
                Position::new(1.0, 0.0),
                Position::new(0.0, 2.5)
            ]
        );
        assert_eq!(request.unreachable, UnreachablePolicy::Abort);
    }

    #[test]
    fn request_carries_cost_flags() {
        let request = args().to_request().unwrap();
        assert_eq!(request.options.cost.mode, CostMode::Energy);
        assert!(request.options.cost.no_wind);
        assert!(request.options.allow_corner_cutting);
    }

    #[test]
    fn invalid_snap_radius_is_rejected() {
        for radius in [f64::NAN, -1.0] {
            let args = RouteArgs {
                snap_radius: Some(radius),
                ..args()
            };
            let err = args.to_request().unwrap_err();
            assert!(err.to_string().contains("--snap-radius"));
        }
        let args = RouteArgs {
            snap_radius: Some(0.75),
            ..args()
        };
        assert_eq!(args.to_request().unwrap().options.snap_radius, Some(0.75));
    }
}
