use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the windpath library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A geometry or velocity source could not be located at the given path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// A source was readable but its content is malformed or incomplete.
    #[error("failed to load {path}: {message}")]
    DataLoad { path: PathBuf, message: String },

    /// Both sources parsed, but they do not describe the same spatial domain.
    #[error("geometry and velocity sources are inconsistent: {message}")]
    InconsistentSources { message: String },

    /// A coordinate has no traversable cell within reach of the grid.
    #[error("coordinate ({x}, {y}) is outside the traversable domain")]
    OutOfDomain { x: f64, y: f64 },

    /// Metrics were requested for a path without any points.
    #[error("path is empty")]
    EmptyPath,

    /// Raised when a multi-waypoint route aborts on an unreachable segment.
    #[error("no route found for segment {segment} between {} and {}", format_point(.from), format_point(.to))]
    RouteNotFound {
        segment: usize,
        from: (f64, f64),
        to: (f64, f64),
    },

    /// Raised when a scenario name could not be found in the scenario set.
    #[error("unknown scenario: {name}{}", format_suggestions(.suggestions))]
    UnknownScenario {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when vehicle, search, or scenario parameters fail validation.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Whether this error belongs to the environment construction family.
    ///
    /// Such errors are fatal to a run: no environment exists to search over.
    pub fn is_data_load(&self) -> bool {
        matches!(
            self,
            Error::DatasetNotFound { .. } | Error::DataLoad { .. } | Error::InconsistentSources { .. }
        )
    }

    pub(crate) fn data_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::DataLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }
}

fn format_point(point: &(f64, f64)) -> String {
    format!("({}, {})", point.0, point.1)
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
