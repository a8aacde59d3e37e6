//! snapdigest - backup orchestration and snapshot reports for restic.
//!
//! Usage:
//!   snapdigest backup [ENV_FILE]          Take a tagged snapshot
//!   snapdigest report [ENV_FILE]          Write a change and hotspot report
//!   snapdigest forget-prune [ENV_FILE]    Apply the retention policy
//!   snapdigest restore-smoke [ENV_FILE]   Verify the latest snapshot restores
//!   snapdigest --help                     Show help

mod factory;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use crate::factory::{Action, CommandFactory};

#[derive(Debug, Parser)]
#[command(
    name = "snapdigest",
    version,
    about = "Backup orchestration and snapshot change reports for restic",
    long_about = "snapdigest drives a restic repository from a single env file.\n\n\
                  Run `snapdigest report` after a backup to see what changed between \
                  the two latest snapshots, which files are oversized, and which \
                  directories hold the most small files."
)]
struct Cli {
    /// Action to run
    #[arg(value_enum)]
    action: Action,

    /// Env file (defaults to <PROJECT_ROOT>/config/backup.env)
    env_file: Option<PathBuf>,

    /// Directory holding config/ (defaults to current directory)
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Log more detail to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let factory = CommandFactory::new(&cli.project_root);
    let status = factory.execute(cli.action, cli.env_file.as_deref())?;
    Ok(ExitCode::from(status))
}

/// Log to stderr. `RUST_LOG` applies unless `-v` is given.
fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
