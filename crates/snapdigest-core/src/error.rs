//! Error types for configuration and threshold parsing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a [`BackupConfig`](crate::BackupConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The env file does not exist.
    #[error("Missing env file: {path} (create it from {example})")]
    MissingEnvFile { path: PathBuf, example: PathBuf },

    /// A file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more required keys are absent or empty.
    #[error("Missing required config values: {}", keys.join(", "))]
    MissingKeys { keys: Vec<String> },

    /// The source include file does not exist.
    #[error("Missing source include file: {path}")]
    MissingIncludeFile { path: PathBuf },

    /// The source include file lists no paths.
    #[error("No source paths found in {path}")]
    NoSourcePaths { path: PathBuf },

    /// An exclude file does not exist.
    #[error("Missing exclude file: {path}")]
    MissingExcludeFile { path: PathBuf },

    /// A numeric key holds something that is not an integer.
    #[error("Invalid integer for {key}: {value}")]
    InvalidNumber { key: &'static str, value: String },

    /// The report directory could not be created.
    #[error("Failed to create report directory {path}: {source}")]
    ReportDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The assembled configuration failed validation.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    /// Create a read error with path context.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

/// Error returned by [`parse_bytes`](crate::parse_bytes).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeError {
    /// The literal does not match `<digits>[K|M|G|T|P][B]`.
    #[error("Invalid size format: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_message_lists_all() {
        let err = ConfigError::MissingKeys {
            keys: vec!["RESTIC_REPOSITORY".into(), "REPORT_DIR".into()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required config values: RESTIC_REPOSITORY, REPORT_DIR"
        );
    }

    #[test]
    fn test_size_error_names_literal() {
        let err = SizeError::InvalidFormat("1.5G".into());
        assert_eq!(err.to_string(), "Invalid size format: 1.5G");
    }
}
