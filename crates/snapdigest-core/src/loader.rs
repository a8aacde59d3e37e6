//! Env-file configuration loading.
//!
//! The env file is a flat `KEY=value` list. Blank lines, `#` comments and
//! lines without `=` are skipped. Values are trimmed, stripped of surrounding
//! quotes and have `$VAR` / `${VAR}` references expanded. Relative paths are
//! resolved against the directory holding the env file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::config::{BackupConfig, DEFAULT_HOTSPOT_THRESHOLD, DEFAULT_LARGE_FILE_THRESHOLD};
use crate::error::ConfigError;

const REQUIRED_KEYS: [&str; 4] = [
    "RESTIC_REPOSITORY",
    "RESTIC_PASSWORD_COMMAND",
    "SOURCE_INCLUDE_FILE",
    "REPORT_DIR",
];

/// Reads a [`BackupConfig`] from an env file.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    project_root: PathBuf,
    vars: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a loader that expands variables from the process environment.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            vars: std::env::vars().collect(),
        }
    }

    /// Replace the variables used for `$VAR` expansion.
    pub fn with_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Env file used when none is given.
    pub fn default_env_file(&self) -> PathBuf {
        self.project_root.join("config").join("backup.env")
    }

    /// Template users copy to create their env file.
    pub fn example_env_file(&self) -> PathBuf {
        self.project_root.join("config").join("backup.env.example")
    }

    /// Load and validate the configuration.
    ///
    /// Creates the report directory if it does not exist yet.
    pub fn load(&self, env_path: Option<&Path>) -> Result<BackupConfig, ConfigError> {
        let env_file = match env_path {
            Some(path) => expand_user(&path.to_string_lossy()),
            None => self.default_env_file(),
        };
        if !env_file.is_file() {
            return Err(ConfigError::MissingEnvFile {
                path: env_file,
                example: self.example_env_file(),
            });
        }
        debug!(path = %env_file.display(), "loading env file");

        let text = fs::read_to_string(&env_file).map_err(|e| ConfigError::read(&env_file, e))?;
        let values = self.parse_env(&text);

        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|key| values.get(**key).is_none_or(|v| v.is_empty()))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys { keys: missing });
        }

        let base_dir = env_file.parent().unwrap_or(Path::new(".")).to_path_buf();
        let resolve = |value: &str| {
            let path = expand_user(value);
            if path.is_relative() {
                base_dir.join(path)
            } else {
                path
            }
        };

        let source_include_file = resolve(&values["SOURCE_INCLUDE_FILE"]);
        if !source_include_file.is_file() {
            return Err(ConfigError::MissingIncludeFile {
                path: source_include_file,
            });
        }
        let source_paths = self.read_path_list(&source_include_file)?;
        if source_paths.is_empty() {
            return Err(ConfigError::NoSourcePaths {
                path: source_include_file,
            });
        }

        let excludes_dir = self.project_root.join("config").join("excludes");
        let exclude_common_file = values
            .get("EXCLUDE_COMMON_FILE")
            .filter(|v| !v.is_empty())
            .map(|v| resolve(v))
            .unwrap_or_else(|| excludes_dir.join("common.exclude"));
        let exclude_set_file = values
            .get("EXCLUDE_SET_FILE")
            .filter(|v| !v.is_empty())
            .map(|v| resolve(v))
            .unwrap_or_else(|| excludes_dir.join("notes-repos.exclude"));
        for path in [&exclude_common_file, &exclude_set_file] {
            if !path.is_file() {
                return Err(ConfigError::MissingExcludeFile { path: path.clone() });
            }
        }

        let report_dir = resolve(&values["REPORT_DIR"]);
        let config = BackupConfig::builder()
            .project_root(self.project_root.clone())
            .env_file(env_file)
            .restic_repository(values["RESTIC_REPOSITORY"].clone())
            .restic_password_command(values["RESTIC_PASSWORD_COMMAND"].clone())
            .source_include_file(source_include_file)
            .source_paths(source_paths)
            .exclude_common_file(exclude_common_file)
            .exclude_set_file(exclude_set_file)
            .report_dir(report_dir.clone())
            .large_file_threshold(
                values
                    .get("LARGE_FILE_THRESHOLD")
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_LARGE_FILE_THRESHOLD.to_string()),
            )
            .hotspot_threshold(parse_number(&values, "HOTSPOT_THRESHOLD", DEFAULT_HOTSPOT_THRESHOLD)?)
            .keep_daily(parse_number(&values, "KEEP_DAILY", 30u32)?)
            .keep_weekly(parse_number(&values, "KEEP_WEEKLY", 12u32)?)
            .keep_monthly(parse_number(&values, "KEEP_MONTHLY", 12u32)?)
            .build()
            .map_err(|e| ConfigError::Invalid {
                message: e.to_string(),
            })?;

        fs::create_dir_all(&report_dir).map_err(|source| ConfigError::ReportDir {
            path: report_dir,
            source,
        })?;

        Ok(config)
    }

    fn parse_env(&self, text: &str) -> HashMap<String, String> {
        let mut values = HashMap::new();
        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let cleaned = value.trim().trim_matches('"').trim_matches('\'');
            values.insert(key.trim().to_string(), self.expand(cleaned));
        }
        values
    }

    fn read_path_list(&self, path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| expand_user(&self.expand(line)))
            .collect())
    }

    fn expand(&self, value: &str) -> String {
        expand_vars(value, |name| self.vars.get(name).cloned())
    }
}

fn parse_number<T: FromStr>(
    values: &HashMap<String, String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match values.get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            key,
            value: raw.clone(),
        }),
    }
}

/// Expand `$NAME` and `${NAME}` references using `lookup`.
///
/// References to unknown variables are left untouched.
pub fn expand_vars(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        match (!name.is_empty()).then(|| lookup(name)).flatten() {
            Some(expanded) => out.push_str(&expanded),
            None => out.push_str(&rest[pos..pos + 1 + consumed]),
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}

/// Expand a leading `~` to the user's home directory.
fn expand_user(value: &str) -> PathBuf {
    let home_relative = value
        .strip_prefix("~/")
        .or_else(|| (value == "~").then_some(""));
    match (home_relative, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    }
}
