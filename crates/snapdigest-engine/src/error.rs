//! Errors raised by engine invocations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from running the backup engine or reading its output.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process could not be started.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine exited unsuccessfully for a call that requires success.
    #[error("{}", failed_message(command, *code, stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The snapshot listing is not valid JSON.
    #[error("Could not parse restic snapshots JSON: {source}")]
    SnapshotsUnparseable {
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot listing is JSON but not a list of snapshots.
    #[error("Unexpected snapshots payload format from restic: {detail}")]
    UnexpectedSnapshotShape { detail: String },
}

fn failed_message(command: &str, code: Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("`{command}` exited with status {code}"),
        None => format!("`{command}` was terminated by a signal"),
    };
    match stderr.lines().find(|line| !line.trim().is_empty()) {
        Some(line) => format!("{status}: {}", line.trim()),
        None => status,
    }
}

impl EngineError {
    /// Exit code of a failed invocation, if the engine ran and exited.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { code, .. } => *code,
            _ => None,
        }
    }
}
