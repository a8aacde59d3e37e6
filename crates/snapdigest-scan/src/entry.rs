//! Scan result entries.

use serde::{Deserialize, Serialize};

/// A file larger than the configured threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargeFile {
    /// Size in bytes.
    pub size: u64,
    /// Full path as text.
    pub path: String,
}

impl LargeFile {
    /// Create a new entry.
    pub fn new(size: u64, path: impl Into<String>) -> Self {
        Self {
            size,
            path: path.into(),
        }
    }
}

/// A directory with many direct file children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotspot {
    /// Number of regular files directly inside the directory.
    pub file_count: u64,
    /// Directory path as text.
    pub directory: String,
}

impl Hotspot {
    /// Create a new entry.
    pub fn new(file_count: u64, directory: impl Into<String>) -> Self {
        Self {
            file_count,
            directory: directory.into(),
        }
    }
}
