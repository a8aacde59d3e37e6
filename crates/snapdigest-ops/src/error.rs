//! Errors raised by maintenance commands.

use std::path::PathBuf;

use snapdigest_engine::EngineError;
use thiserror::Error;

/// Errors that abort a maintenance command.
#[derive(Debug, Error)]
pub enum OpsError {
    /// An engine call that must succeed did not.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A local file or directory operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OpsError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
