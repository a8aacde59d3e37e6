//! Process-backed engine client.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use snapdigest_core::BackupConfig;
use tracing::{debug, info};

use crate::client::{EngineClient, EngineOutput, OutputMode};
use crate::error::EngineError;

/// Engine executable looked up on `PATH` by default.
pub const DEFAULT_PROGRAM: &str = "restic";

/// Runs the `restic` binary as a child process.
///
/// Every child gets the same explicit environment: a snapshot of the
/// process environment taken at construction, plus the repository and
/// password command. The process's own environment is never modified.
#[derive(Debug, Clone)]
pub struct ResticClient {
    program: PathBuf,
    env: BTreeMap<OsString, OsString>,
}

impl ResticClient {
    /// Create a client for the given repository.
    pub fn new(repository: &str, password_command: &str) -> Self {
        let mut env: BTreeMap<OsString, OsString> = std::env::vars_os().collect();
        env.insert("RESTIC_REPOSITORY".into(), repository.into());
        env.insert("RESTIC_PASSWORD_COMMAND".into(), password_command.into());
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            env,
        }
    }

    /// Create a client from a loaded configuration.
    pub fn from_config(config: &BackupConfig) -> Self {
        let [(_, repository), (_, password_command)] = config.engine_env();
        Self::new(repository, password_command)
    }

    /// Use a different engine executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Environment passed to every child process.
    pub fn env(&self) -> &BTreeMap<OsString, OsString> {
        &self.env
    }

    /// Engine executable.
    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

impl EngineClient for ResticClient {
    fn run(&self, args: &[&str], mode: OutputMode) -> Result<EngineOutput, EngineError> {
        info!(command = %self.describe(args), ?mode, "invoking engine");

        let mut command = Command::new(&self.program);
        command.args(args).env_clear().envs(&self.env);

        let spawn_error = |source| EngineError::Spawn {
            program: self.program.clone(),
            source,
        };

        let output = match mode {
            OutputMode::Capture => {
                let output = command
                    .stdin(Stdio::null())
                    .output()
                    .map_err(spawn_error)?;
                EngineOutput {
                    code: output.status.code(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                }
            }
            OutputMode::Inherit => {
                let status = command.status().map_err(spawn_error)?;
                EngineOutput {
                    code: status.code(),
                    ..EngineOutput::default()
                }
            }
        };

        debug!(code = ?output.code, stdout_bytes = output.stdout.len(), "engine exited");
        Ok(output)
    }

    fn describe(&self, args: &[&str]) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(args.iter().map(|a| a.to_string()));
        parts.join(" ")
    }
}
