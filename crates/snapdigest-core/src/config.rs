//! Backup configuration value.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Immutable configuration for one invocation.
///
/// Built by [`ConfigLoader`](crate::ConfigLoader) from an env file, or
/// directly through [`BackupConfig::builder`].
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct BackupConfig {
    /// Project root the default env file is resolved against.
    #[builder(default = "PathBuf::from(\".\")")]
    pub project_root: PathBuf,

    /// Env file this config was read from.
    #[builder(default)]
    #[serde(default)]
    pub env_file: PathBuf,

    /// Engine repository identifier.
    pub restic_repository: String,

    /// Command the engine runs to obtain the repository password.
    pub restic_password_command: String,

    /// File listing the backup source paths, one per line.
    #[builder(default)]
    #[serde(default)]
    pub source_include_file: PathBuf,

    /// Ordered source roots; also the roots scanned by reports.
    #[builder(default)]
    #[serde(default)]
    pub source_paths: Vec<PathBuf>,

    /// Exclude patterns shared by every backup set.
    #[builder(default)]
    #[serde(default)]
    pub exclude_common_file: PathBuf,

    /// Exclude patterns specific to this backup set.
    #[builder(default)]
    #[serde(default)]
    pub exclude_set_file: PathBuf,

    /// Directory receiving reports and logs.
    pub report_dir: PathBuf,

    /// Size literal above which files are listed as large.
    #[builder(default = "default_large_file_threshold()")]
    #[serde(default = "default_large_file_threshold")]
    pub large_file_threshold: String,

    /// Direct file count above which a directory is a hotspot.
    #[builder(default = "DEFAULT_HOTSPOT_THRESHOLD")]
    #[serde(default = "default_hotspot_threshold")]
    pub hotspot_threshold: i64,

    /// Daily snapshots kept by forget/prune.
    #[builder(default = "30")]
    #[serde(default = "default_keep_daily")]
    pub keep_daily: u32,

    /// Weekly snapshots kept by forget/prune.
    #[builder(default = "12")]
    #[serde(default = "default_keep_weekly")]
    pub keep_weekly: u32,

    /// Monthly snapshots kept by forget/prune.
    #[builder(default = "12")]
    #[serde(default = "default_keep_monthly")]
    pub keep_monthly: u32,
}

pub(crate) const DEFAULT_LARGE_FILE_THRESHOLD: &str = "2G";
pub(crate) const DEFAULT_HOTSPOT_THRESHOLD: i64 = 5000;

fn default_large_file_threshold() -> String {
    DEFAULT_LARGE_FILE_THRESHOLD.to_string()
}

fn default_hotspot_threshold() -> i64 {
    DEFAULT_HOTSPOT_THRESHOLD
}

fn default_keep_daily() -> u32 {
    30
}

fn default_keep_weekly() -> u32 {
    12
}

fn default_keep_monthly() -> u32 {
    12
}

impl BackupConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.restic_repository.as_deref() {
            Some(repo) if repo.trim().is_empty() => {
                return Err("Repository cannot be empty".to_string());
            }
            _ => {}
        }
        if self
            .report_dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            return Err("Report directory cannot be empty".to_string());
        }
        Ok(())
    }
}

impl BackupConfig {
    /// Create a new config builder.
    pub fn builder() -> BackupConfigBuilder {
        BackupConfigBuilder::default()
    }

    /// Environment entries the engine needs to reach the repository.
    pub fn engine_env(&self) -> [(&'static str, &str); 2] {
        [
            ("RESTIC_REPOSITORY", self.restic_repository.as_str()),
            ("RESTIC_PASSWORD_COMMAND", self.restic_password_command.as_str()),
        ]
    }
}
