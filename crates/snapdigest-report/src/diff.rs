//! Classification of `restic diff` output.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Change counters reported in the summary, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Changed,
    Removed,
}

/// One classified line of diff output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffRecord<'a> {
    /// `+ ` line; `path` is the marker-stripped remainder.
    Added { path: &'a str },
    /// `- ` line.
    Removed,
    /// `M `, `U ` or `T ` line. Modified, unknown and type-changed entries
    /// share one counter.
    Changed,
    /// Anything else: statistics, blank lines, metadata-only changes.
    Ignored,
}

impl<'a> DiffRecord<'a> {
    /// Classify a single line by its first two characters.
    pub fn classify(line: &'a str) -> Self {
        let Some((marker, rest)) = line.split_at_checked(2) else {
            return Self::Ignored;
        };
        match marker {
            "+ " => Self::Added { path: rest.trim() },
            "- " => Self::Removed,
            "M " | "U " | "T " => Self::Changed,
            _ => Self::Ignored,
        }
    }

    /// Counter this record increments, if any.
    pub fn kind(&self) -> Option<ChangeKind> {
        match self {
            Self::Added { .. } => Some(ChangeKind::Added),
            Self::Removed => Some(ChangeKind::Removed),
            Self::Changed => Some(ChangeKind::Changed),
            Self::Ignored => None,
        }
    }

    /// Path of a newly added directory.
    pub fn new_directory(&self) -> Option<&'a str> {
        match self {
            Self::Added { path } if path.ends_with('/') => Some(*path),
            _ => None,
        }
    }
}

/// Aggregated counts for one diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: u64,
    pub changed: u64,
    pub removed: u64,
    /// Added directories, in diff order.
    pub new_directories: Vec<String>,
}

impl DiffSummary {
    /// Classify every line of `text`.
    ///
    /// Both `\n` and `\r\n` line endings are accepted.
    pub fn from_diff(text: &str) -> Self {
        let mut summary = Self::default();
        for record in text.lines().map(DiffRecord::classify) {
            summary.record(record);
        }
        summary
    }

    /// Fold one record into the summary.
    pub fn record(&mut self, record: DiffRecord<'_>) {
        if let Some(dir) = record.new_directory() {
            self.new_directories.push(dir.to_string());
        }
        match record.kind() {
            Some(ChangeKind::Added) => self.added += 1,
            Some(ChangeKind::Changed) => self.changed += 1,
            Some(ChangeKind::Removed) => self.removed += 1,
            None => {}
        }
    }

    /// Value of one counter.
    pub fn count(&self, kind: ChangeKind) -> u64 {
        match kind {
            ChangeKind::Added => self.added,
            ChangeKind::Changed => self.changed,
            ChangeKind::Removed => self.removed,
        }
    }
}
