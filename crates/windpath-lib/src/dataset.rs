//! Geometry and velocity source loading.
//!
//! An [`Environment`] is assembled from two logical datasets:
//!
//! - a **geometry source** (JSON) describing the grid layout and obstacles, and
//! - a **velocity source** (CSV or JSON) listing `(x, y, u, v)` wind samples.
//!
//! Each cell takes the wind of its nearest sample. Samples with non-finite
//! components mark the cells they resolve to as solid, which is how CFD
//! exports usually encode building interiors.
//!
//! Construction is all-or-nothing: any malformed, missing, or inconsistent
//! input yields an error and no environment.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use rstar::primitives::GeomWithData;
use rstar::RTree;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::field::{Cell, Environment, GridSpec, ObstacleRect, Position, WindVector};
use crate::spatial::{nearest_with_ties, IndexedPoint};

/// On-disk encoding of a source file, detected from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Csv,
}

impl SourceFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(SourceFormat::Json),
            "csv" => Some(SourceFormat::Csv),
            _ => None,
        }
    }
}

/// One obstacle mask entry, written either as a boolean or as an integer flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaskValue {
    Flag(bool),
    Level(u8),
}

impl MaskValue {
    /// `true` and any non-zero level mark an obstacle.
    pub fn is_blocked(self) -> bool {
        match self {
            MaskValue::Flag(flag) => flag,
            MaskValue::Level(level) => level != 0,
        }
    }
}

impl From<bool> for MaskValue {
    fn from(value: bool) -> Self {
        MaskValue::Flag(value)
    }
}

impl From<u8> for MaskValue {
    fn from(value: u8) -> Self {
        MaskValue::Level(value)
    }
}

/// Grid layout and obstacle description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometrySource {
    /// Optional coordinate reference label; must match the velocity source when both set it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
    /// Center of cell `(0, 0)`.
    pub origin: [f64; 2],
    pub cell_size: f64,
    pub rows: usize,
    pub cols: usize,
    /// Row-major obstacle mask (`rows` x `cols`) of `true`/`false` or `0`/`1` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obstacle_mask: Option<Vec<Vec<MaskValue>>>,
    /// Axis-aligned obstacle footprints; cells whose centers fall inside are blocked.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obstacles: Vec<ObstacleRect>,
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl GeometrySource {
    /// Geometry for an obstacle-free grid.
    pub fn new(origin: Position, cell_size: f64, rows: usize, cols: usize) -> Self {
        Self {
            crs: None,
            origin: [origin.x, origin.y],
            cell_size,
            rows,
            cols,
            obstacle_mask: None,
            obstacles: Vec::new(),
            source: None,
        }
    }

    /// Load geometry from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        match SourceFormat::from_path(path) {
            Some(SourceFormat::Json) => {}
            _ => {
                return Err(Error::data_load(
                    path,
                    "geometry sources must be JSON documents (.json)",
                ))
            }
        }
        let file = open_source(path)?;
        let mut geometry = Self::from_reader(file).map_err(|err| relabel(err, path))?;
        geometry.source = Some(path.to_path_buf());
        Ok(geometry)
    }

    /// Load geometry from a reader containing a JSON document.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let geometry: GeometrySource = serde_json::from_reader(BufReader::new(reader))?;
        Ok(geometry)
    }

    /// Path the geometry was loaded from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn label(&self) -> PathBuf {
        self.source
            .clone()
            .unwrap_or_else(|| PathBuf::from("<geometry>"))
    }

    fn grid(&self) -> Result<GridSpec> {
        let origin = Position::new(self.origin[0], self.origin[1]);
        GridSpec::new(origin, self.cell_size, self.rows, self.cols).map_err(|err| match err {
            Error::InvalidConfig { message } => Error::data_load(self.label(), message),
            other => other,
        })
    }

    fn validate_obstacles(&self) -> Result<()> {
        if let Some(mask) = &self.obstacle_mask {
            if mask.len() != self.rows {
                return Err(Error::data_load(
                    self.label(),
                    format!(
                        "obstacle_mask has {} rows, expected {}",
                        mask.len(),
                        self.rows
                    ),
                ));
            }
            if let Some((row, values)) = mask
                .iter()
                .enumerate()
                .find(|(_, values)| values.len() != self.cols)
            {
                return Err(Error::data_load(
                    self.label(),
                    format!(
                        "obstacle_mask row {} has {} columns, expected {}",
                        row,
                        values.len(),
                        self.cols
                    ),
                ));
            }
        }

        if let Some(rect) = self.obstacles.iter().find(|rect| !rect.is_well_formed()) {
            return Err(Error::data_load(
                self.label(),
                format!(
                    "obstacle rectangle {:?}..{:?} is not well formed",
                    rect.min, rect.max
                ),
            ));
        }

        Ok(())
    }

    fn is_masked(&self, row: usize, col: usize) -> bool {
        self.obstacle_mask
            .as_ref()
            .and_then(|mask| mask.get(row))
            .and_then(|values| values.get(col))
            .is_some_and(|value| value.is_blocked())
    }
}

/// A single wind sample at a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocitySample {
    pub x: f64,
    pub y: f64,
    pub u: f64,
    pub v: f64,
}

impl VelocitySample {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn wind(&self) -> WindVector {
        WindVector::new(self.u, self.v)
    }
}

/// Collection of wind samples covering the grid domain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VelocitySource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
    pub samples: Vec<VelocitySample>,
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl VelocitySource {
    pub fn new(samples: Vec<VelocitySample>) -> Self {
        Self {
            crs: None,
            samples,
            source: None,
        }
    }

    /// Load samples from a CSV or JSON file, chosen by extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let format = SourceFormat::from_path(path).ok_or_else(|| {
            Error::data_load(path, "velocity sources must be .csv or .json files")
        })?;
        let file = open_source(path)?;
        let parsed = match format {
            SourceFormat::Csv => Self::from_csv_reader(file),
            SourceFormat::Json => Self::from_json_reader(file),
        };
        let mut velocity = parsed.map_err(|err| relabel(err, path))?;
        velocity.source = Some(path.to_path_buf());
        Ok(velocity)
    }

    /// Parse a JSON document of the form `{"crs": ..., "samples": [{x, y, u, v}, ...]}`.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let velocity: VelocitySource = serde_json::from_reader(BufReader::new(reader))?;
        Ok(velocity)
    }

    /// Parse CSV with one sample per row.
    ///
    /// Header names are matched case-insensitively against a few common
    /// synonyms (`vx`/`vy`, `pos_x`/`pos_y`, ...). Empty `u`/`v` fields are
    /// read as missing data (NaN) and therefore mark the sample as solid.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::Fields).from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|err| Error::data_load("<velocity>", format!("failed to read headers: {err}")))?
            .clone();

        let normalize = |s: &str| {
            s.to_ascii_lowercase()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect::<String>()
        };
        let normalized_headers: Vec<String> = headers.iter().map(normalize).collect();

        let synonyms: &[(&str, &[&str])] = &[
            ("x", &["x", "px", "pos_x", "position_x", "points_0"]),
            ("y", &["y", "py", "pos_y", "position_y", "points_1"]),
            ("u", &["u", "vx", "wind_u", "velocity_0", "u_ms"]),
            ("v", &["v", "vy", "wind_v", "velocity_1", "v_ms"]),
        ];

        let mut index_map: BTreeMap<&str, usize> = BTreeMap::new();
        for (canon, alts) in synonyms {
            if let Some(position) = alts
                .iter()
                .find_map(|alt| normalized_headers.iter().position(|h| h == alt))
            {
                index_map.insert(*canon, position);
            }
        }

        let missing: Vec<&str> = ["x", "y", "u", "v"]
            .into_iter()
            .filter(|column| !index_map.contains_key(column))
            .collect();
        if !missing.is_empty() {
            return Err(Error::data_load(
                "<velocity>",
                format!(
                    "missing required columns: {}. Available: {}",
                    missing.join(", "),
                    headers.iter().collect::<Vec<_>>().join(", ")
                ),
            ));
        }

        let mut samples = Vec::new();
        for (offset, record) in csv_reader.records().enumerate() {
            // header is line 1
            let line = offset + 2;
            let record = record?;
            let field = |name: &str| {
                index_map
                    .get(name)
                    .and_then(|&i| record.get(i))
                    .unwrap_or("")
            };

            let coordinate = |name: &str| -> Result<f64> {
                let raw = field(name);
                raw.parse::<f64>().map_err(|err| {
                    Error::data_load(
                        "<velocity>",
                        format!("invalid {name} value '{raw}' on line {line}: {err}"),
                    )
                })
            };
            let component = |name: &str| -> Result<f64> {
                let raw = field(name);
                if raw.is_empty() {
                    return Ok(f64::NAN);
                }
                raw.parse::<f64>().map_err(|err| {
                    Error::data_load(
                        "<velocity>",
                        format!("invalid {name} value '{raw}' on line {line}: {err}"),
                    )
                })
            };

            samples.push(VelocitySample {
                x: coordinate("x")?,
                y: coordinate("y")?,
                u: component("u")?,
                v: component("v")?,
            });
        }

        Ok(Self::new(samples))
    }

    /// Path the samples were loaded from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn label(&self) -> PathBuf {
        self.source
            .clone()
            .unwrap_or_else(|| PathBuf::from("<velocity>"))
    }
}

/// Load both sources from disk and build the environment.
pub fn load_environment(geometry_path: &Path, velocity_path: &Path) -> Result<Environment> {
    debug!(
        geometry = %geometry_path.display(),
        velocity = %velocity_path.display(),
        "loading environment"
    );

    let geometry = GeometrySource::from_path(geometry_path)?;
    let velocity = VelocitySource::from_path(velocity_path)?;
    Environment::from_sources(&geometry, &velocity)
}

impl Environment {
    /// Build an environment from parsed sources.
    ///
    /// Validates both sources against each other and resolves every cell's
    /// wind to its nearest sample.
    pub fn from_sources(geometry: &GeometrySource, velocity: &VelocitySource) -> Result<Self> {
        let grid = geometry.grid()?;
        geometry.validate_obstacles()?;
        validate_samples(velocity)?;
        check_consistency(geometry, velocity, &grid)?;

        let points: Vec<IndexedPoint<usize>> = velocity
            .samples
            .iter()
            .enumerate()
            .map(|(index, sample)| GeomWithData::new([sample.x, sample.y], index))
            .collect();
        let tree = RTree::bulk_load(points);

        let mut invalidated = 0usize;
        let mut cells = Vec::with_capacity(grid.len());
        for linear in 0..grid.len() {
            let index = grid.index_of(linear);
            let center = grid.center(index);
            let (sample_index, _) = nearest_with_ties(&tree, [center.x, center.y]).ok_or_else(
                || Error::data_load(velocity.label(), "velocity source has no samples"),
            )?;
            let wind = velocity.samples[sample_index].wind();

            let blocked = geometry.is_masked(index.row, index.col)
                || geometry.obstacles.iter().any(|rect| rect.contains(center));
            if !blocked && !wind.is_finite() {
                invalidated += 1;
            }

            cells.push(Cell {
                index,
                center,
                wind,
                traversable: !blocked && wind.is_finite(),
            });
        }

        if invalidated > 0 {
            warn!(
                cells = invalidated,
                "cells marked solid because their nearest velocity sample is not finite"
            );
        }

        let environment = Environment::from_cells(grid, cells)?;
        info!(
            samples = velocity.samples.len(),
            obstacles = grid.len() - environment.traversable_count(),
            "resolved velocity samples onto grid"
        );
        Ok(environment)
    }
}

fn validate_samples(velocity: &VelocitySource) -> Result<()> {
    if velocity.samples.is_empty() {
        return Err(Error::data_load(
            velocity.label(),
            "velocity source has no samples",
        ));
    }
    if let Some((row, sample)) = velocity
        .samples
        .iter()
        .enumerate()
        .find(|(_, sample)| !sample.position().is_finite())
    {
        return Err(Error::data_load(
            velocity.label(),
            format!(
                "sample {} has a non-finite position ({}, {})",
                row, sample.x, sample.y
            ),
        ));
    }
    Ok(())
}

fn check_consistency(
    geometry: &GeometrySource,
    velocity: &VelocitySource,
    grid: &GridSpec,
) -> Result<()> {
    if let (Some(a), Some(b)) = (&geometry.crs, &velocity.crs) {
        if !a.eq_ignore_ascii_case(b) {
            return Err(Error::InconsistentSources {
                message: format!("geometry crs '{a}' does not match velocity crs '{b}'"),
            });
        }
    }

    // Every side of the grid must be covered to within one cell by the samples.
    let (min, max) = grid.extent();
    let tolerance = grid.cell_size;
    let (lo, hi) = sample_bounds(velocity);
    let gaps = [
        ("west", lo.x - min.x),
        ("east", max.x - hi.x),
        ("south", lo.y - min.y),
        ("north", max.y - hi.y),
    ];
    if let Some((side, gap)) = gaps.iter().find(|(_, gap)| *gap > tolerance) {
        return Err(Error::InconsistentSources {
            message: format!(
                "velocity samples span {}..{} but the grid extent is {}..{}; {} edge uncovered by {:.3}",
                lo, hi, min, max, side, gap
            ),
        });
    }

    Ok(())
}

fn sample_bounds(velocity: &VelocitySource) -> (Position, Position) {
    velocity.samples.iter().fold(
        (
            Position::new(f64::INFINITY, f64::INFINITY),
            Position::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(lo, hi), sample| {
            (
                Position::new(lo.x.min(sample.x), lo.y.min(sample.y)),
                Position::new(hi.x.max(sample.x), hi.y.max(sample.y)),
            )
        },
    )
}

fn open_source(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(Error::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }
    File::open(path).map_err(|err| Error::data_load(path, err.to_string()))
}

/// Attach the real source path to parse errors raised by reader-based loaders.
fn relabel(err: Error, path: &Path) -> Error {
    match err {
        Error::DataLoad { message, .. } => Error::data_load(path, message),
        Error::Json(err) => Error::data_load(path, format!("malformed JSON: {err}")),
        Error::Csv(err) => Error::data_load(path, format!("malformed CSV: {err}")),
        Error::Io(err) => Error::data_load(path, err.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(
            SourceFormat::from_path(Path::new("PV.CSV")),
            Some(SourceFormat::Csv)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("info.json")),
            Some(SourceFormat::Json)
        );
        assert_eq!(SourceFormat::from_path(Path::new("info.nc")), None);
    }

    #[test]
    fn csv_headers_accept_synonyms() {
        let csv = "Pos_X,Pos_Y,VX,VY\n0,0,1.5,-0.5\n1,0,,2\n";
        let velocity = VelocitySource::from_csv_reader(Cursor::new(csv)).expect("parses");
        assert_eq!(velocity.samples.len(), 2);
        assert_eq!(velocity.samples[0].u, 1.5);
        assert!(velocity.samples[1].u.is_nan());
    }

    #[test]
    fn csv_missing_column_is_reported() {
        let csv = "x,y,u\n0,0,1\n";
        let err = VelocitySource::from_csv_reader(Cursor::new(csv)).unwrap_err();
        assert!(err.is_data_load());
        assert!(err.to_string().contains("missing required columns: v"));
    }

    #[test]
    fn mask_shape_must_match_grid() {
        let mut geometry = GeometrySource::new(Position::new(0.0, 0.0), 1.0, 2, 2);
        geometry.obstacle_mask = Some(vec![
            vec![MaskValue::Level(0), MaskValue::Level(0)],
            vec![MaskValue::Level(0)],
        ]);
        let velocity = VelocitySource::new(vec![VelocitySample {
            x: 0.0,
            y: 0.0,
            u: 0.0,
            v: 0.0,
        }]);
        let err = Environment::from_sources(&geometry, &velocity).unwrap_err();
        assert!(err.to_string().contains("row 1 has 1 columns"));
    }

    #[test]
    fn nearest_sample_ties_prefer_first_sample() {
        let geometry = GeometrySource::new(Position::new(0.0, 0.0), 1.0, 1, 1);
        let velocity = VelocitySource::new(vec![
            VelocitySample {
                x: -1.0,
                y: 0.0,
                u: 1.0,
                v: 0.0,
            },
            VelocitySample {
                x: 1.0,
                y: 0.0,
                u: 2.0,
                v: 0.0,
            },
        ]);
        let env = Environment::from_sources(&geometry, &velocity).expect("builds");
        assert_eq!(env.cells()[0].wind, WindVector::new(1.0, 0.0));
    }
}
