//! Core types and traits for snapdigest.
//!
//! This crate holds the pieces every other snapdigest crate leans on: the
//! immutable [`BackupConfig`] and the env-file [`ConfigLoader`] that builds it,
//! the size literal parser used for thresholds, the [`Clock`] capability and
//! the [`Command`] trait implemented by each top-level action.

mod clock;
mod command;
mod config;
mod error;
mod loader;
mod size;

pub use clock::{Clock, FixedClock, SystemClock};
pub use command::Command;
pub use config::{BackupConfig, BackupConfigBuilder};
pub use error::{ConfigError, SizeError};
pub use loader::{ConfigLoader, expand_vars};
pub use size::parse_bytes;
