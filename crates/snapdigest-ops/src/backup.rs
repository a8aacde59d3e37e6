//! The `backup` action.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use snapdigest_core::{BackupConfig, Clock, Command};
use snapdigest_engine::{EngineClient, OutputMode};
use tracing::{info, warn};

use crate::error::OpsError;

/// Tags attached to every snapshot taken by [`BackupCommand`].
pub const BACKUP_TAGS: [&str; 2] = ["hot", "notes-repos"];

/// Takes a snapshot of the configured sources.
///
/// Engine output is echoed to the console and copied into
/// `backup-<timestamp>.log` in the report directory. A failing backup is
/// not an error: the command returns the engine's exit status so callers
/// can pass it through.
pub struct BackupCommand<E, C> {
    config: BackupConfig,
    engine: E,
    clock: C,
}

impl<E: EngineClient, C: Clock> BackupCommand<E, C> {
    pub fn new(config: BackupConfig, engine: E, clock: C) -> Self {
        Self {
            config,
            engine,
            clock,
        }
    }

    /// Engine arguments for the backup invocation.
    pub fn engine_args(&self) -> Vec<String> {
        let mut args = vec![
            "backup".to_string(),
            "--files-from".to_string(),
            path_arg(&self.config.source_include_file),
            "--exclude-file".to_string(),
            path_arg(&self.config.exclude_common_file),
            "--exclude-file".to_string(),
            path_arg(&self.config.exclude_set_file),
        ];
        for tag in BACKUP_TAGS {
            args.push("--tag".to_string());
            args.push(tag.to_string());
        }
        args.push("--json".to_string());
        args
    }

    /// Path of the log file for a given timestamp.
    pub fn log_path(&self, timestamp: &str) -> PathBuf {
        self.config.report_dir.join(format!("backup-{timestamp}.log"))
    }
}

impl<E: EngineClient, C: Clock> Command for BackupCommand<E, C> {
    type Error = OpsError;

    fn name(&self) -> &'static str {
        "backup"
    }

    fn run(&self) -> Result<u8, OpsError> {
        self.engine.ensure_initialized()?;

        let log_path = self.log_path(&self.clock.timestamp());
        let header = format!(
            "Starting backup at {}\nRepo: {}\nSources include file: {}\n",
            self.clock.now_iso(),
            self.config.restic_repository,
            self.config.source_include_file.display()
        );
        print!("{header}");

        let mut log = File::create(&log_path).map_err(|e| OpsError::io(&log_path, e))?;
        let write_err = |e: std::io::Error| OpsError::io(&log_path, e);
        log.write_all(header.as_bytes()).map_err(write_err)?;

        let args = self.engine_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.engine.run(&args, OutputMode::Capture)?;

        if !output.stdout.is_empty() {
            print!("{}", output.stdout_text());
            log.write_all(&output.stdout).map_err(write_err)?;
        }
        if !output.stderr.is_empty() {
            eprint!("{}", output.stderr_text());
            log.write_all(&output.stderr).map_err(write_err)?;
        }

        if !output.is_success() {
            let status = exit_status(output.code);
            warn!(code = ?output.code, log = %log_path.display(), "backup failed");
            return Ok(status);
        }

        let done = format!("Backup completed at {}\n", self.clock.now_iso());
        log.write_all(done.as_bytes()).map_err(write_err)?;
        print!("{done}");
        println!("Log written: {}", log_path.display());
        info!(log = %log_path.display(), "backup completed");
        Ok(0)
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Map an engine exit code to a process exit status, never 0.
fn exit_status(code: Option<i32>) -> u8 {
    code.and_then(|c| u8::try_from(c).ok())
        .filter(|c| *c != 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(Some(3)), 3);
        assert_eq!(exit_status(None), 1);
        assert_eq!(exit_status(Some(-1)), 1);
        assert_eq!(exit_status(Some(300)), 1);
    }
}
