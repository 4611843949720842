//! `compare` subcommand: distance-optimal versus energy-optimal routes per scenario.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use windpath_lib::{run_scenario, ScenarioSet, ScenarioSummary, UnreachablePolicy};

use super::{load, VehicleArgs};
use crate::output::OutputFormat;
use crate::sources::SourcePaths;

#[derive(Args, Debug, Clone, Default)]
pub struct CompareArgs {
    /// JSON file of named scenarios. Defaults to the built-in set.
    #[arg(long)]
    pub scenarios: Option<PathBuf>,
    /// Only run the scenario with this name.
    #[arg(long)]
    pub name: Option<String>,
    /// Continue past unreachable legs instead of failing.
    #[arg(long)]
    pub skip_unreachable: bool,
    #[command(flatten)]
    pub vehicle: VehicleArgs,
}

impl CompareArgs {
    fn scenario_set(&self) -> Result<ScenarioSet> {
        match &self.scenarios {
            Some(path) => ScenarioSet::from_path(path)
                .with_context(|| format!("failed to load scenarios from {}", path.display())),
            None => Ok(ScenarioSet::builtin()),
        }
    }
}

pub fn handle_compare(args: &CompareArgs, paths: &SourcePaths, format: OutputFormat) -> Result<()> {
    let set = args.scenario_set()?;
    let selected = match &args.name {
        Some(name) => vec![set.get(name)?],
        None => set.scenarios.iter().collect(),
    };

    let vehicle = args.vehicle.to_config()?;
    let policy = if args.skip_unreachable {
        UnreachablePolicy::Skip
    } else {
        UnreachablePolicy::Abort
    };
    let env = load(paths)?;

    let summaries = selected
        .into_iter()
        .map(|scenario| {
            run_scenario(&env, scenario, &vehicle, policy)
                .map(|report| ScenarioSummary::from_report(&report))
                .with_context(|| format!("scenario {} failed", scenario.name))
        })
        .collect::<Result<Vec<_>>>()?;

    print!("{}", format.render_scenarios(&summaries)?);
    Ok(())
}
