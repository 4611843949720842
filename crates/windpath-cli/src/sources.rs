//! Input resolution: data file paths and waypoint coordinates.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use windpath_lib::Position;

/// Environment variable consulted when `--geometry` is not given.
pub const GEOMETRY_ENV: &str = "WINDPATH_GEOMETRY";
/// Environment variable consulted when `--velocity` is not given.
pub const VELOCITY_ENV: &str = "WINDPATH_VELOCITY";

/// Geometry and velocity files backing one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub geometry: PathBuf,
    pub velocity: PathBuf,
}

impl SourcePaths {
    /// Resolve both paths, preferring explicit flags over environment variables.
    pub fn resolve(geometry: Option<&Path>, velocity: Option<&Path>) -> Result<Self> {
        Ok(Self {
            geometry: resolve_one(geometry, GEOMETRY_ENV, "--geometry")?,
            velocity: resolve_one(velocity, VELOCITY_ENV, "--velocity")?,
        })
    }
}

fn resolve_one(explicit: Option<&Path>, var: &str, flag: &str) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(value) = env::var_os(var) {
        if !value.is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    bail!("no {flag} file given; pass {flag} <PATH> or set {var}")
}

/// Parse an `X,Y` coordinate pair.
pub fn parse_point(value: &str) -> std::result::Result<Position, String> {
    let mut parts = value.split(',').map(str::trim);
    let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected X,Y but got '{value}'"));
    };
    let x: f64 = x
        .parse()
        .map_err(|_| format!("invalid x coordinate '{x}' in '{value}'"))?;
    let y: f64 = y
        .parse()
        .map_err(|_| format!("invalid y coordinate '{y}' in '{value}'"))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("coordinates must be finite, got '{value}'"));
    }
    Ok(Position::new(x, y))
}
