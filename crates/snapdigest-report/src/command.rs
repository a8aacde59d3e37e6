//! The `report` action.

use std::fs;
use std::path::PathBuf;

use humansize::{BINARY, format_size};
use snapdigest_core::{BackupConfig, Clock, Command, parse_bytes};
use snapdigest_engine::EngineClient;
use snapdigest_scan::{DEFAULT_LIMIT, FileScanner};
use tracing::{debug, info};

use crate::diff::DiffSummary;
use crate::document::{DiffSection, ReportDocument};
use crate::error::ReportError;

/// Files produced by one report run.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    /// `report-<timestamp>.txt` in the report directory.
    pub report_path: PathBuf,
    /// `diff-<timestamp>.txt`, written only when two snapshots were compared.
    pub diff_log_path: Option<PathBuf>,
    pub document: ReportDocument,
}

/// Builds a report from the latest snapshot diff and two source scans.
///
/// The clock is read once at the start, so the report and diff log carry
/// the same timestamp. Nothing is written until every input has been
/// gathered.
pub struct ReportCommand<E, C, S> {
    config: BackupConfig,
    engine: E,
    clock: C,
    scanner: S,
    limit: usize,
}

impl<E, C, S> ReportCommand<E, C, S>
where
    E: EngineClient,
    C: Clock,
    S: FileScanner,
{
    pub fn new(config: BackupConfig, engine: E, clock: C, scanner: S) -> Self {
        Self {
            config,
            engine,
            clock,
            scanner,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Maximum entries per scan section.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Gather inputs, render, and write the artifacts.
    pub fn generate(&self) -> Result<ReportArtifact, ReportError> {
        let timestamp = self.clock.timestamp();
        let generated = self.clock.now_iso();
        let report_dir = &self.config.report_dir;
        let report_path = report_dir.join(format!("report-{timestamp}.txt"));
        let diff_path = report_dir.join(format!("diff-{timestamp}.txt"));

        let threshold = parse_bytes(&self.config.large_file_threshold)?;

        let snapshots = self.engine.list_snapshots()?;
        debug!(count = snapshots.len(), "listed snapshots");

        let (diff, diff_log) = match snapshots.as_slice() {
            [.., previous, current] => {
                let raw = self.engine.diff(&previous.id, &current.id)?;
                let summary = DiffSummary::from_diff(&String::from_utf8_lossy(&raw));
                let section = DiffSection::Diffed {
                    previous: previous.id.to_string(),
                    current: current.id.to_string(),
                    summary,
                    log_path: diff_path.clone(),
                };
                (section, Some(raw))
            }
            _ => (DiffSection::NotEnoughSnapshots, None),
        };

        let roots = &self.config.source_paths;
        info!(
            roots = roots.len(),
            threshold = %format_size(threshold, BINARY),
            "scanning for large files"
        );
        let large_files = self.scanner.find_large_files(roots, threshold, self.limit);

        info!(roots = roots.len(), threshold = self.config.hotspot_threshold, "scanning for hotspots");
        let hotspots = self
            .scanner
            .find_hotspots(roots, self.config.hotspot_threshold, self.limit);

        let document = ReportDocument {
            generated,
            repository: self.config.restic_repository.clone(),
            diff,
            large_file_threshold: self.config.large_file_threshold.clone(),
            large_files,
            hotspot_threshold: self.config.hotspot_threshold,
            hotspots,
        };

        let diff_log_path = match diff_log {
            Some(raw) => {
                fs::write(&diff_path, raw).map_err(|e| ReportError::write(&diff_path, e))?;
                info!(path = %diff_path.display(), "diff log written");
                Some(diff_path)
            }
            None => None,
        };

        fs::write(&report_path, document.to_string())
            .map_err(|e| ReportError::write(&report_path, e))?;
        info!(path = %report_path.display(), "report written");

        Ok(ReportArtifact {
            report_path,
            diff_log_path,
            document,
        })
    }
}

impl<E, C, S> Command for ReportCommand<E, C, S>
where
    E: EngineClient,
    C: Clock,
    S: FileScanner,
{
    type Error = ReportError;

    fn name(&self) -> &'static str {
        "report"
    }

    fn run(&self) -> Result<u8, ReportError> {
        let artifact = self.generate()?;
        println!("Report written: {}", artifact.report_path.display());
        Ok(0)
    }
}
