//! Repository maintenance commands for snapdigest.
//!
//! - [`BackupCommand`] - initialise the repository if needed, take a tagged
//!   snapshot and keep a log of the engine output
//! - [`ForgetPruneCommand`] - apply the daily/weekly/monthly retention policy
//! - [`RestoreSmokeCommand`] - restore the latest snapshot into a scratch
//!   directory and count what came back

mod backup;
mod error;
mod forget_prune;
mod restore_smoke;

pub use backup::{BACKUP_TAGS, BackupCommand};
pub use error::OpsError;
pub use forget_prune::ForgetPruneCommand;
pub use restore_smoke::RestoreSmokeCommand;
