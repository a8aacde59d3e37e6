//! The `restore-smoke` action.

use std::fs;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use snapdigest_core::{BackupConfig, Clock, Command};
use snapdigest_engine::{EngineClient, OutputMode};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::OpsError;

/// Restores the latest snapshot into a scratch directory and counts the
/// regular files that came back.
///
/// The scratch directory is removed on every exit path, including errors.
pub struct RestoreSmokeCommand<E, C> {
    config: BackupConfig,
    engine: E,
    clock: C,
    scratch_parent: Option<PathBuf>,
}

impl<E: EngineClient, C: Clock> RestoreSmokeCommand<E, C> {
    pub fn new(config: BackupConfig, engine: E, clock: C) -> Self {
        Self {
            config,
            engine,
            clock,
            scratch_parent: None,
        }
    }

    /// Create the scratch directory under `parent` instead of the system
    /// temp dir.
    pub fn with_scratch_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(parent.into());
        self
    }

    pub fn engine_args(&self, target: &Path) -> Vec<String> {
        let mut args = vec![
            "restore".to_string(),
            "latest".to_string(),
            "--target".to_string(),
            target.to_string_lossy().into_owned(),
        ];
        for root in &self.config.source_paths {
            args.push("--include".to_string());
            args.push(root.to_string_lossy().into_owned());
        }
        args.push("--verify".to_string());
        args
    }

    fn scratch_dir(&self) -> Result<TempDir, OpsError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("snapdigest-restore-");
        match &self.scratch_parent {
            Some(parent) => builder.tempdir_in(parent).map_err(|e| OpsError::io(parent, e)),
            None => builder
                .tempdir()
                .map_err(|e| OpsError::io(std::env::temp_dir(), e)),
        }
    }
}

impl<E: EngineClient, C: Clock> Command for RestoreSmokeCommand<E, C> {
    type Error = OpsError;

    fn name(&self) -> &'static str {
        "restore-smoke"
    }

    fn run(&self) -> Result<u8, OpsError> {
        let scratch = self.scratch_dir()?;
        let restore_dir = scratch.path().join("restore");
        fs::create_dir_all(&restore_dir).map_err(|e| OpsError::io(&restore_dir, e))?;

        println!("Running restore smoke test at {}", self.clock.now_iso());
        println!("Temporary restore path: {}", restore_dir.display());

        if !self.engine.snapshots_exist()? {
            println!("No snapshots found. Run backup first.");
            return Ok(1);
        }

        let args = self.engine_args(&restore_dir);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.engine.run_checked(&args, OutputMode::Inherit)?;

        if !restore_dir.is_dir() {
            println!("Restore failed: target directory not created.");
            return Ok(1);
        }

        let restored = count_regular_files(&restore_dir);
        info!(restored, "restore smoke test complete");
        println!("Restore smoke test complete. Restored files: {restored}");
        Ok(0)
    }
}

/// Regular files anywhere under `dir`, following symlinks to files.
fn count_regular_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .skip_hidden(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(error = %err, "skipping unreadable restored entry");
                None
            }
        })
        .filter(|entry| !entry.file_type().is_dir())
        .filter(|entry| fs::metadata(entry.path()).is_ok_and(|m| m.is_file()))
        .count()
}
