//! # Scanner Module
//!
//! Discovers regular files in a directory tree.
//!
//! ## What Gets Listed
//! - Regular files at any depth below the root
//! - Hidden files, unless [`ScanConfig::include_hidden`] is off
//!
//! Symbolic links are never followed and never listed, whether they point
//! at files or directories. Sockets, FIFOs and device nodes are skipped.
//!
//! ## Example
//! ```rust,ignore
//! use dupe_finder::core::scanner::{DirectoryWalker, ScanConfig};
//!
//! let walker = DirectoryWalker::new(ScanConfig::default());
//! for entry in walker.enumerate("/data".as_ref())? {
//!     match entry {
//!         Ok(record) => println!("{} ({} bytes)", record.path.display(), record.size),
//!         Err(e) => eprintln!("skipped: {}", e),
//!     }
//! }
//! ```

mod walker;

pub use walker::{DirectoryWalker, ScanConfig, Walk};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A discovered file and its size at enumeration time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path to the file, joined onto the walked root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileRecord {
    /// Create a new record
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}
