//! JWalk-based directory scanner.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use jwalk::{DirEntry, Parallelism, WalkDir};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::entry::{Hotspot, LargeFile};

/// Bounded top-N scans over a set of source roots.
///
/// Implementations must be read-only and deterministic: for the same tree
/// they return the same entries in the same order.
pub trait FileScanner {
    /// Files strictly larger than `threshold` bytes, largest first.
    fn find_large_files(&self, roots: &[PathBuf], threshold: u64, limit: usize) -> Vec<LargeFile>;

    /// Directories with more than `threshold` direct file children, busiest first.
    fn find_hotspots(&self, roots: &[PathBuf], threshold: i64, limit: usize) -> Vec<Hotspot>;
}

impl<T: FileScanner + ?Sized> FileScanner for &T {
    fn find_large_files(&self, roots: &[PathBuf], threshold: u64, limit: usize) -> Vec<LargeFile> {
        (**self).find_large_files(roots, threshold, limit)
    }

    fn find_hotspots(&self, roots: &[PathBuf], threshold: i64, limit: usize) -> Vec<Hotspot> {
        (**self).find_hotspots(roots, threshold, limit)
    }
}

/// Scanner walking each root with jwalk.
///
/// Roots are walked concurrently on a rayon pool and merged back in root
/// order. Within a root, children are visited sorted by file name, so ties
/// between equal sizes or counts always resolve the same way.
#[derive(Debug, Clone, Default)]
pub struct JwalkScanner {
    threads: usize,
}

impl JwalkScanner {
    /// Create a scanner using the global rayon pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a dedicated pool with `threads` workers (0 = global pool).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Run `f` over every root, preserving root order in the output.
    fn per_root<T, F>(&self, roots: &[PathBuf], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&Path) -> T + Sync,
    {
        let run = || roots.par_iter().map(|root| f(root)).collect::<Vec<_>>();

        if self.threads == 0 {
            return run();
        }
        match rayon::ThreadPoolBuilder::new().num_threads(self.threads).build() {
            Ok(pool) => pool.install(run),
            Err(err) => {
                warn!(error = %err, "could not build scan pool, scanning sequentially");
                roots.iter().map(|root| f(root)).collect()
            }
        }
    }
}

impl FileScanner for JwalkScanner {
    fn find_large_files(&self, roots: &[PathBuf], threshold: u64, limit: usize) -> Vec<LargeFile> {
        let mut results: Vec<LargeFile> = self
            .per_root(roots, |root| large_files_under(root, threshold))
            .into_iter()
            .flatten()
            .collect();

        // Stable: equal sizes keep walk order.
        results.sort_by(|a, b| b.size.cmp(&a.size));
        results.truncate(limit);
        results
    }

    fn find_hotspots(&self, roots: &[PathBuf], threshold: i64, limit: usize) -> Vec<Hotspot> {
        let mut counts: IndexMap<String, u64> = IndexMap::new();
        for per_root in self.per_root(roots, directory_counts) {
            for (directory, count) in per_root {
                *counts.entry(directory).or_insert(0) += count;
            }
        }

        let mut hotspots: Vec<Hotspot> = counts
            .into_iter()
            .filter(|(_, count)| *count > 0 && exceeds(*count, threshold))
            .map(|(directory, file_count)| Hotspot {
                file_count,
                directory,
            })
            .collect();

        hotspots.sort_by(|a, b| b.file_count.cmp(&a.file_count));
        hotspots.truncate(limit);
        hotspots
    }
}

/// Collect files above `threshold` under one root, in walk order.
fn large_files_under(root: &Path, threshold: u64) -> Vec<LargeFile> {
    let mut found = Vec::new();
    for entry in walk(root) {
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let Some(size) = regular_file_size(&path) else {
            continue;
        };
        if size > threshold {
            found.push(LargeFile {
                size,
                path: path_text(&path),
            });
        }
    }
    found
}

/// Direct file-child counts for every directory under one root.
///
/// Keys are inserted when the directory itself is visited, so the map is
/// ordered parent-before-child.
fn directory_counts(root: &Path) -> IndexMap<String, u64> {
    let mut counts = IndexMap::new();
    for entry in walk(root) {
        let path = entry.path();
        if entry.file_type().is_dir() {
            counts.entry(path_text(&path)).or_insert(0);
        } else if regular_file_size(&path).is_some() {
            if let Some(parent) = path.parent() {
                *counts.entry(path_text(parent)).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Iterate every readable entry under `root`, root included.
///
/// Missing or non-directory roots yield nothing. Unreadable entries are
/// logged and skipped.
fn walk(root: &Path) -> Box<dyn Iterator<Item = DirEntry<((), ())>>> {
    if !root.is_dir() {
        debug!(root = %root.display(), "scan root missing or not a directory, skipping");
        return Box::new(std::iter::empty());
    }

    // Drops trailing separators and `.` segments so keys match across roots.
    let root: PathBuf = root.components().collect();

    let walker = WalkDir::new(root)
        .parallelism(Parallelism::Serial)
        .sort(true)
        .skip_hidden(false)
        .follow_links(false)
        .min_depth(0);

    Box::new(walker.into_iter().filter_map(|entry| match entry {
        Ok(entry) => Some(entry),
        Err(err) => {
            debug!(error = %err, "skipping unreadable entry");
            None
        }
    }))
}

/// Size of `path` if it resolves to a regular file.
///
/// Symlinks are followed; broken links and vanished files yield `None`.
fn regular_file_size(path: &Path) -> Option<u64> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Some(metadata.len()),
        Ok(_) => None,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "skipping file without metadata");
            None
        }
    }
}

fn exceeds(count: u64, threshold: i64) -> bool {
    i128::from(count) > i128::from(threshold)
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_sized(path: &Path, size: usize) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, vec![b'x'; size]).unwrap();
    }

    #[test]
    fn test_exceeds_handles_negative_threshold() {
        assert!(exceeds(0, -1));
        assert!(exceeds(3, 2));
        assert!(!exceeds(2, 2));
        assert!(exceeds(u64::MAX, i64::MAX));
    }

    #[test]
    fn test_walk_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        assert_eq!(walk(&temp.path().join("nope")).count(), 0);
    }

    #[test]
    fn test_walk_file_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        write_sized(&file, 4);
        assert_eq!(walk(&file).count(), 0);
    }

    #[test]
    fn test_directory_counts_are_direct_only() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_sized(&root.join("top.txt"), 1);
        write_sized(&root.join("sub/a.txt"), 1);
        write_sized(&root.join("sub/b.txt"), 1);
        write_sized(&root.join("sub/deeper/c.txt"), 1);

        let counts = directory_counts(root);
        let root_key = path_text(root);
        assert_eq!(counts[&root_key], 1);
        assert_eq!(counts[&path_text(&root.join("sub"))], 2);
        assert_eq!(counts[&path_text(&root.join("sub/deeper"))], 1);

        // Parent directories come before their children.
        let keys: Vec<&String> = counts.keys().collect();
        assert_eq!(keys[0], &root_key);
    }

    #[test]
    fn test_trailing_separator_root_keys_match() {
        let temp = TempDir::new().unwrap();
        write_sized(&temp.path().join("a.txt"), 1);

        let with_slash = PathBuf::from(format!("{}/", temp.path().display()));
        let counts = directory_counts(&with_slash);
        assert_eq!(counts[&path_text(temp.path())], 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_follow_to_target_size() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_sized(&root.join("real.bin"), 64);
        std::os::unix::fs::symlink(root.join("real.bin"), root.join("link.bin")).unwrap();
        std::os::unix::fs::symlink(root.join("gone.bin"), root.join("broken.bin")).unwrap();

        let found = large_files_under(root, 10);
        let paths: Vec<&str> = found.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(found.len(), 2);
        assert!(paths.iter().any(|p| p.ends_with("link.bin")));
        assert!(paths.iter().all(|p| !p.ends_with("broken.bin")));
    }
}
