//! `inspect` subcommand: load the environment and report its shape.

use anyhow::Result;

use windpath_lib::EnvironmentSummary;

use super::load;
use crate::output::OutputFormat;
use crate::sources::SourcePaths;

pub fn handle_inspect(paths: &SourcePaths, format: OutputFormat) -> Result<()> {
    let env = load(paths)?;
    let summary = EnvironmentSummary::from_environment(&env);
    print!("{}", format.render_environment(&summary)?);
    Ok(())
}
