//! Directory walking implementation using walkdir.

use super::FileRecord;
use crate::error::ScanError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, FilterEntry, WalkDir};

/// Configuration for the directory walker
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to list hidden files and descend into hidden directories
    pub include_hidden: bool,
    /// Maximum directory depth below the root (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_hidden: true,
            max_depth: None,
        }
    }
}

/// Lists the regular files below a root directory
#[derive(Debug, Clone, Default)]
pub struct DirectoryWalker {
    config: ScanConfig,
}

impl DirectoryWalker {
    /// Create a new walker with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Start walking `root`
    ///
    /// Fails immediately if `root` is missing, is not a directory or cannot
    /// be listed. Problems further down the tree are reported as `Err` items
    /// of the returned iterator and do not end the walk.
    pub fn enumerate(&self, root: &Path) -> Result<Walk, ScanError> {
        let metadata =
            fs::metadata(root).map_err(|e| ScanError::from_io(root.to_path_buf(), e))?;

        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        // walkdir would only report an unreadable root as the first item
        fs::read_dir(root).map_err(|e| ScanError::from_io(root.to_path_buf(), e))?;

        // Name order keeps member lists identical between runs
        let mut walker = WalkDir::new(root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let predicate: fn(&DirEntry) -> bool = if self.config.include_hidden {
            keep_all
        } else {
            is_visible
        };

        Ok(Walk {
            inner: walker.into_iter().filter_entry(predicate),
            root: root.to_path_buf(),
            symlinks_skipped: 0,
        })
    }
}

fn keep_all(_entry: &DirEntry) -> bool {
    true
}

fn is_visible(entry: &DirEntry) -> bool {
    // The root is walked even when its own name is hidden
    entry.depth() == 0
        || !entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// A lazy, single-use walk over the files below a root
///
/// Yields `Ok(FileRecord)` for every regular file and `Err(ScanError)` for
/// every entry that could not be read. Re-enumerating needs a new walk.
pub struct Walk {
    inner: FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>,
    root: PathBuf,
    symlinks_skipped: usize,
}

impl Walk {
    /// Number of symbolic links passed over so far
    pub fn symlinks_skipped(&self) -> usize {
        self.symlinks_skipped
    }

    fn entry_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        match error.into_io_error() {
            Some(source) if source.kind() == io::ErrorKind::PermissionDenied => {
                ScanError::PermissionDenied { path }
            }
            Some(source) => ScanError::ReadDirectory { path, source },
            None => ScanError::ReadDirectory {
                path,
                source: io::Error::new(io::ErrorKind::Other, "filesystem loop detected"),
            },
        }
    }
}

impl Iterator for Walk {
    type Item = Result<FileRecord, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(self.entry_error(e))),
            };

            let file_type = entry.file_type();

            if file_type.is_symlink() {
                debug!(path = %entry.path().display(), "skipping symlink");
                self.symlinks_skipped += 1;
                continue;
            }

            // Directories are descended into by walkdir; special files are ignored
            if !file_type.is_file() {
                continue;
            }

            return Some(match entry.metadata() {
                Ok(metadata) => Ok(FileRecord::new(entry.into_path(), metadata.len())),
                Err(e) => Err(self.entry_error(e)),
            });
        }
    }
}
