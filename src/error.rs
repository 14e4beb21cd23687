//! Pipeline error taxonomy
//!
//! Every variant here is fatal for a run: the pipeline is cheap to rerun
//! from raw inputs, so there is no partial-success mode. Empty bins and
//! instruments without samples in a bin are not errors and never surface
//! here.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{} is not a valid directory", .0.display())]
    MissingDirectory(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error(
        "{source_name}: timestamps not ascending at index {index} ({previous} followed by {current})"
    )]
    UnorderedInput {
        source_name: String,
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("distance {distance_rs:.4} Rs cannot be assigned to any bin in [{lower}, {upper})")]
    UnassignableDistance {
        distance_rs: f64,
        lower: f64,
        upper: f64,
    },

    #[error("{file}: channel '{channel}' has {found} entries, expected {expected}")]
    ChannelLengthMismatch {
        file: String,
        channel: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{file}, record {line}: {message}")]
    MalformedRecord {
        file: String,
        line: usize,
        message: String,
    },

    #[error("I/O error ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    /// Wrap an I/O error with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
