//! Output formatting for CLI results.
//!
//! Text output is colored through a [`ColorPalette`]; JSON output serialises
//! the library summaries unchanged so scripts see the same field names.

use std::fmt::Write as _;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use windpath_lib::{EnvironmentSummary, RouteSummary, ScenarioSummary, SegmentStatus};

use crate::terminal::ColorPalette;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text, colored when the terminal allows it.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    pub fn render_environment(self, summary: &EnvironmentSummary) -> Result<String> {
        match self {
            OutputFormat::Json => to_json(summary),
            OutputFormat::Text => Ok(format_environment(summary, &ColorPalette::detect())),
        }
    }

    pub fn render_route(self, summary: &RouteSummary) -> Result<String> {
        match self {
            OutputFormat::Json => to_json(summary),
            OutputFormat::Text => Ok(format_route(summary, &ColorPalette::detect())),
        }
    }

    pub fn render_scenarios(self, summaries: &[ScenarioSummary]) -> Result<String> {
        match self {
            OutputFormat::Json => to_json(&summaries),
            OutputFormat::Text => {
                let palette = ColorPalette::detect();
                Ok(summaries
                    .iter()
                    .map(|summary| format_scenario(summary, &palette))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut rendered = serde_json::to_string_pretty(value)?;
    rendered.push('\n');
    Ok(rendered)
}

pub fn format_environment(summary: &EnvironmentSummary, p: &ColorPalette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}Environment{}", p.white_bold, p.reset);
    let _ = writeln!(
        out,
        "  Grid: {} x {} cells ({} m resolution)",
        summary.grid.rows, summary.grid.cols, summary.grid.cell_size
    );
    let _ = writeln!(
        out,
        "  Extent: {}{}{} -> {}{}{}",
        p.cyan, summary.extent[0], p.reset, p.cyan, summary.extent[1], p.reset
    );
    let _ = writeln!(
        out,
        "  Traversable: {} of {} {}({} obstacle cells){}",
        summary.traversable, summary.cells, p.gray, summary.obstacles, p.reset
    );
    let _ = writeln!(
        out,
        "  Wind speed: mean {:.2} m/s, max {:.2} m/s",
        summary.wind.mean_speed, summary.wind.max_speed
    );
    out
}

pub fn format_route(summary: &RouteSummary, p: &ColorPalette) -> String {
    let mut out = String::new();
    let wind = if summary.no_wind { ", no wind" } else { "" };
    let _ = writeln!(
        out,
        "{}Route ({}{}){}: {} cells, length {:.2} m",
        p.white_bold, summary.mode, wind, p.reset, summary.cells, summary.length
    );
    let _ = writeln!(
        out,
        "  Energy: {:.2} J {}(still air: {:.2} J){}",
        summary.energy, p.gray, summary.energy_no_wind, p.reset
    );
    if !summary.complete {
        let _ = writeln!(out, "  {}Partial route: some segments were skipped{}", p.red, p.reset);
    }

    for segment in &summary.segments {
        match segment.status {
            SegmentStatus::Found => {
                let _ = writeln!(
                    out,
                    "  {}segment {}{}: {}{}{} -> {}{}{} {}({} cells, {} expanded){}",
                    p.green,
                    segment.index,
                    p.reset,
                    p.cyan,
                    segment.from,
                    p.reset,
                    p.cyan,
                    segment.to,
                    p.reset,
                    p.gray,
                    segment.cells,
                    segment.nodes_expanded,
                    p.reset
                );
            }
            SegmentStatus::Unreachable => {
                let _ = writeln!(
                    out,
                    "  {}segment {} unreachable{}: {} -> {} (skipped)",
                    p.red, segment.index, p.reset, segment.from, segment.to
                );
            }
        }
    }

    for step in &summary.steps {
        let _ = writeln!(
            out,
            "  {:>4}: {}{}{} at ({:.2}, {:.2})",
            step.index, p.gray, step.cell, p.reset, step.position.x, step.position.y
        );
    }
    out
}

pub fn format_scenario(summary: &ScenarioSummary, p: &ColorPalette) -> String {
    let mut out = String::new();
    let waypoints = summary
        .waypoints
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ");
    let _ = writeln!(out, "{}{}{}: {}", p.white_bold, summary.name, p.reset, waypoints);

    for objective in [&summary.distance, &summary.energy] {
        let partial = if objective.complete { "" } else { " (partial)" };
        let _ = writeln!(
            out,
            "  {:<8} energy {:>10.2} J, length {:>7.2} m, {} cells{}",
            objective.mode, objective.energy, objective.length, objective.cells, partial
        );
    }

    match summary.savings_percent {
        Some(savings) => {
            let _ = writeln!(
                out,
                "  Savings: {}{:.2}%{} {}({:.2} J){}",
                p.for_savings(savings),
                savings,
                p.reset,
                p.gray,
                summary.comparison.absolute_savings(),
                p.reset
            );
        }
        None => {
            let _ = writeln!(out, "  Savings: n/a");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use windpath_lib::{
        plan_route, run_scenario, EnvironmentBuilder, Position, RouteRequest, Scenario,
        SearchOptions, UnreachablePolicy, VehicleConfig, WindVector,
    };

    fn breezy() -> windpath_lib::Environment {
        EnvironmentBuilder::new(3, 4, 1.0)
            .uniform_wind(WindVector::new(1.0, 0.0))
            .build()
            .unwrap()
    }

    #[test]
    fn environment_text_lists_counts() {
        let summary = EnvironmentSummary::from_environment(&breezy());
        let text = format_environment(&summary, &ColorPalette::plain());
        assert!(text.contains("Grid: 3 x 4 cells"));
        assert!(text.contains("Traversable: 12 of 12"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn route_text_lists_steps() {
        let env = breezy();
        let request = RouteRequest::between(
            Position::new(0.0, 0.0),
            Position::new(3.0, 0.0),
            SearchOptions::default(),
        );
        let plan = plan_route(&env, &request).unwrap();
        let summary = RouteSummary::from_plan(&env, &plan, &VehicleConfig::default()).unwrap();
        let text = format_route(&summary, &ColorPalette::plain());
        assert!(text.starts_with("Route (distance): 4 cells"));
        assert!(text.contains("segment 0"));
        assert!(text.contains("[0, 3]"));
    }

    #[test]
    fn scenario_json_is_an_array() {
        let env = breezy();
        let scenario = Scenario::new(
            "east",
            vec![Position::new(0.0, 0.0), Position::new(3.0, 2.0)],
        );
        let report = run_scenario(
            &env,
            &scenario,
            &VehicleConfig::default(),
            UnreachablePolicy::Abort,
        )
        .unwrap();
        let summaries = vec![ScenarioSummary::from_report(&report)];
        let json = OutputFormat::Json.render_scenarios(&summaries).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["name"], "east");

        let text = format_scenario(&summaries[0], &ColorPalette::plain());
        assert!(text.contains("Savings:"));
    }
}
