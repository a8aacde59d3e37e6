//! Backup report synthesis for snapdigest.
//!
//! A report combines three inputs:
//!
//! - **Snapshot diff** - the engine's diff of the two most recent snapshots,
//!   classified into added/changed/removed counts and new directories
//! - **Large files** - regular files above the configured size threshold
//! - **Hotspots** - directories with many direct file children
//!
//! [`ReportCommand`] gathers them, renders a [`ReportDocument`], and writes
//! `report-<timestamp>.txt` plus, when a diff ran, the verbatim
//! `diff-<timestamp>.txt` next to it.

mod command;
mod diff;
mod document;
mod error;

pub use command::{ReportArtifact, ReportCommand};
pub use diff::{ChangeKind, DiffRecord, DiffSummary};
pub use document::{DiffSection, ReportDocument};
pub use error::ReportError;
