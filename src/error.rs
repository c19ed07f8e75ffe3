//! Error types for simulation runs and their export side effects.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for simulation and export operations.
pub type SimResult<T> = Result<T, SimError>;

/// Errors that abort a run or an export.
///
/// Numeric edge cases inside the model never surface here: they are
/// clamped in place. Everything in this enum comes from the world outside
/// the state transition.
#[derive(Debug, Error)]
pub enum SimError {
    /// File system failure while reading or writing records.
    #[error("I/O error at \"{}\": {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// CSV encoding failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding or decoding failure.
    #[error("JSON error in \"{}\": {}", .path.display(), .source)]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The record directory does not hold exactly one record per tick.
    #[error(
        "record directory \"{}\" holds {found} tick records, expected {expected}",
        .dir.display()
    )]
    RecordCount {
        dir: PathBuf,
        expected: usize,
        found: usize,
    },

    /// The per-tick sink rejected a state; the run stopped at this tick.
    #[error("export failed at tick {tick}: {source}")]
    Export {
        tick: usize,
        #[source]
        source: Box<SimError>,
    },
}

impl SimError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
