//! Report error types.

use std::path::PathBuf;

use snapdigest_core::SizeError;
use snapdigest_engine::EngineError;
use thiserror::Error;

/// Errors that abort report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The large-file threshold literal is malformed.
    #[error("Invalid large-file threshold: {0}")]
    Threshold(#[from] SizeError),

    /// Listing or diffing snapshots failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// An artifact could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
