//! Backup engine client for snapdigest.
//!
//! The engine is an external process reached through a narrow surface:
//! list snapshots, diff two of them, and run arbitrary subcommands.
//! [`EngineClient`] captures that surface as a trait so commands can be
//! exercised against stand-ins; [`ResticClient`] is the process-backed
//! implementation.

mod client;
mod error;
mod restic;
mod snapshot;

pub use client::{EngineClient, EngineOutput, OutputMode};
pub use error::EngineError;
pub use restic::{DEFAULT_PROGRAM, ResticClient};
pub use snapshot::{Snapshot, parse_snapshots};
