//! Source tree scanning for snapdigest.
//!
//! Two bounded scans feed the backup report:
//!
//! - **Large files** - regular files above a byte threshold, largest first
//! - **Hotspots** - directories whose direct file count exceeds a threshold
//!
//! Both accept several roots. Missing roots and unreadable entries are
//! skipped rather than reported, so a partially broken tree still yields a
//! useful report. Output is sorted descending with ties kept in walk order,
//! then cut to `limit` entries.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use snapdigest_scan::{DEFAULT_LIMIT, FileScanner, JwalkScanner};
//!
//! let roots = vec![PathBuf::from("/srv/notes"), PathBuf::from("/srv/repos")];
//! let scanner = JwalkScanner::new();
//!
//! for file in scanner.find_large_files(&roots, 1 << 30, DEFAULT_LIMIT) {
//!     println!("{} {}", file.size, file.path);
//! }
//! for spot in scanner.find_hotspots(&roots, 5000, DEFAULT_LIMIT) {
//!     println!("{:>7} {}", spot.file_count, spot.directory);
//! }
//! ```

mod entry;
mod scanner;

pub use entry::{Hotspot, LargeFile};
pub use scanner::{FileScanner, JwalkScanner};

/// Default number of entries kept by each scan.
pub const DEFAULT_LIMIT: usize = 20;
