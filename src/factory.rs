//! Wiring from a CLI action to a configured command.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use color_eyre::eyre::{Result, WrapErr};
use strum::Display;
use tracing::info;

use snapdigest_core::{BackupConfig, Clock, Command, ConfigLoader, SystemClock};
use snapdigest_engine::{EngineClient, ResticClient};
use snapdigest_ops::{BackupCommand, ForgetPruneCommand, RestoreSmokeCommand};
use snapdigest_report::ReportCommand;
use snapdigest_scan::{FileScanner, JwalkScanner};

/// Top-level actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Action {
    /// Take a tagged snapshot of the configured sources
    Backup,
    /// Write a change and hotspot report for the latest snapshots
    Report,
    /// Apply the retention policy and prune the repository
    ForgetPrune,
    /// Restore the latest snapshot into a scratch directory and count files
    RestoreSmoke,
}

/// Default engine constructor.
pub type ResticFactory = fn(&BackupConfig) -> ResticClient;

/// Loads configuration and builds the command for an action.
///
/// The clock, scanner and engine constructor are injectable; the engine is
/// built from each freshly loaded config.
pub struct CommandFactory<C, S, F> {
    loader: ConfigLoader,
    clock: C,
    scanner: S,
    engine_factory: F,
}

impl CommandFactory<SystemClock, JwalkScanner, ResticFactory> {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            loader: ConfigLoader::new(project_root),
            clock: SystemClock,
            scanner: JwalkScanner::new(),
            engine_factory: ResticClient::from_config,
        }
    }
}

impl<C, S, F> CommandFactory<C, S, F> {
    pub fn with_loader(mut self, loader: ConfigLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_clock<C2>(self, clock: C2) -> CommandFactory<C2, S, F> {
        CommandFactory {
            loader: self.loader,
            clock,
            scanner: self.scanner,
            engine_factory: self.engine_factory,
        }
    }

    pub fn with_scanner<S2>(self, scanner: S2) -> CommandFactory<C, S2, F> {
        CommandFactory {
            loader: self.loader,
            clock: self.clock,
            scanner,
            engine_factory: self.engine_factory,
        }
    }

    pub fn with_engine_factory<F2>(self, engine_factory: F2) -> CommandFactory<C, S, F2> {
        CommandFactory {
            loader: self.loader,
            clock: self.clock,
            scanner: self.scanner,
            engine_factory,
        }
    }
}

impl<C, S, F, E> CommandFactory<C, S, F>
where
    C: Clock,
    S: FileScanner,
    F: Fn(&BackupConfig) -> E,
    E: EngineClient,
{
    /// Load the config and run `action`, returning its exit status.
    pub fn execute(&self, action: Action, env_file: Option<&Path>) -> Result<u8> {
        let config = self
            .loader
            .load(env_file)
            .wrap_err("Failed to load configuration")?;
        let engine = (self.engine_factory)(&config);

        match action {
            Action::Backup => run(BackupCommand::new(config, engine, &self.clock)),
            Action::Report => run(ReportCommand::new(
                config,
                engine,
                &self.clock,
                &self.scanner,
            )),
            Action::ForgetPrune => run(ForgetPruneCommand::new(config, engine, &self.clock)),
            Action::RestoreSmoke => run(RestoreSmokeCommand::new(config, engine, &self.clock)),
        }
    }
}

fn run<T: Command>(command: T) -> Result<u8> {
    info!(command = command.name(), "running");
    let status = command
        .run()
        .wrap_err_with(|| format!("{} failed", command.name()))?;
    info!(command = command.name(), status, "finished");
    Ok(status)
}
