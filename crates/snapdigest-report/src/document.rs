//! Rendered report layout.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use snapdigest_scan::{Hotspot, LargeFile};
use strum::IntoEnumIterator;

use crate::diff::{ChangeKind, DiffSummary};

const NOT_ENOUGH_SNAPSHOTS: &str = "Not enough snapshots for diff (need at least 2).";
const NONE: &str = "(none)";

/// Diff portion of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DiffSection {
    /// Fewer than two snapshots exist.
    NotEnoughSnapshots,
    /// The two most recent snapshots were compared.
    Diffed {
        previous: String,
        current: String,
        summary: DiffSummary,
        log_path: PathBuf,
    },
}

/// A complete backup report.
///
/// The [`Display`](fmt::Display) output is the on-disk format: a fixed
/// sequence of sections, every line newline-terminated. Consumers grep it,
/// so the layout must not drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDocument {
    pub generated: String,
    pub repository: String,
    pub diff: DiffSection,
    /// Threshold exactly as configured, e.g. `2G`.
    pub large_file_threshold: String,
    pub large_files: Vec<LargeFile>,
    pub hotspot_threshold: i64,
    pub hotspots: Vec<Hotspot>,
}

impl fmt::Display for ReportDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Backup report")?;
        writeln!(f, "Generated: {}", self.generated)?;
        writeln!(f, "Repository: {}", self.repository)?;
        writeln!(f)?;

        match &self.diff {
            DiffSection::NotEnoughSnapshots => writeln!(f, "{NOT_ENOUGH_SNAPSHOTS}")?,
            DiffSection::Diffed {
                previous,
                current,
                summary,
                log_path,
            } => {
                writeln!(f, "Previous snapshot: {previous}")?;
                writeln!(f, "Current snapshot:  {current}")?;
                writeln!(f)?;
                writeln!(f, "Changes summary")?;
                for kind in ChangeKind::iter() {
                    writeln!(f, "- {:<8} {}", format!("{kind}:"), summary.count(kind))?;
                }
                writeln!(f)?;
                writeln!(f, "New directories")?;
                write_or_none(f, &summary.new_directories, |f, dir| writeln!(f, "{dir}"))?;
                writeln!(f)?;
                writeln!(f, "Diff log: {}", log_path.display())?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Large files over {}", self.large_file_threshold)?;
        write_or_none(f, &self.large_files, |f, file| {
            writeln!(f, "{} {}", file.size, file.path)
        })?;

        writeln!(f)?;
        writeln!(f, "Small-file hotspots over {} files", self.hotspot_threshold)?;
        write_or_none(f, &self.hotspots, |f, spot| {
            writeln!(f, "{:>7} {}", spot.file_count, spot.directory)
        })
    }
}

fn write_or_none<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut line: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    if items.is_empty() {
        return writeln!(f, "{NONE}");
    }
    items.iter().try_for_each(|item| line(f, item))
}
