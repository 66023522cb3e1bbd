//! # Index Module
//!
//! Collects digests during hashing and turns them into duplicate groups.
//!
//! Every digested file is inserted once. When hashing ends the index is
//! consumed by [`DuplicateIndex::finalize`], which keeps only digests shared
//! by two or more files.

use crate::core::hasher::Digest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Files that share one digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Content digest shared by every member
    pub digest: Digest,
    /// Member paths in discovery order (always at least two)
    pub paths: Vec<PathBuf>,
    /// Size of each member in bytes
    pub file_size: u64,
}

impl DuplicateGroup {
    /// Get the number of duplicates (excluding one copy to keep)
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Bytes that keeping a single copy would free
    pub fn wasted_bytes(&self) -> u64 {
        self.file_size * self.duplicate_count() as u64
    }
}

#[derive(Debug, Clone)]
struct IndexEntry {
    paths: Vec<PathBuf>,
    file_size: u64,
}

/// Digest to paths mapping built during a scan
#[derive(Debug, Clone, Default)]
pub struct DuplicateIndex {
    entries: HashMap<Digest, IndexEntry>,
    files: usize,
}

impl DuplicateIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `path` (of `size` bytes) has content `digest`
    ///
    /// Inserting the same path twice is not detected; the caller hashes
    /// each path once.
    pub fn insert(&mut self, digest: Digest, path: PathBuf, size: u64) {
        self.files += 1;
        self.entries
            .entry(digest)
            .or_insert_with(|| IndexEntry {
                paths: Vec::new(),
                file_size: size,
            })
            .paths
            .push(path);
    }

    /// Number of files inserted
    pub fn len(&self) -> usize {
        self.files
    }

    /// Whether nothing was inserted
    pub fn is_empty(&self) -> bool {
        self.files == 0
    }

    /// Number of distinct digests seen
    pub fn unique_digests(&self) -> usize {
        self.entries.len()
    }

    /// Freeze the index into duplicate groups, sorted by digest
    ///
    /// Digests seen only once describe unique files and are dropped.
    pub fn finalize(self) -> Vec<DuplicateGroup> {
        let mut groups: Vec<DuplicateGroup> = self
            .entries
            .into_iter()
            .filter(|(_, entry)| entry.paths.len() >= 2)
            .map(|(digest, entry)| DuplicateGroup {
                digest,
                paths: entry.paths,
                file_size: entry.file_size,
            })
            .collect();

        groups.sort_by(|a, b| a.digest.cmp(&b.digest));
        groups
    }
}
