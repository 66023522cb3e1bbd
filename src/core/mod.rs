//! # Core Module
//!
//! The front-end agnostic duplicate detection engine.
//!
//! ## Modules
//! - `scanner` - Discovers regular files under a root
//! - `hasher` - Computes MD5 digests in fixed-size chunks
//! - `index` - Groups paths by digest
//! - `reporter` - Writes the JSON report and the final listing
//! - `pipeline` - Orchestrates the full workflow

pub mod hasher;
pub mod index;
pub mod pipeline;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use hasher::{Digest, StreamingHasher};
pub use index::{DuplicateGroup, DuplicateIndex};
pub use pipeline::{CancellationToken, ScanController, ScanCoordinator, ScanOutcome, ScanResult};
pub use reporter::ReportWriter;
pub use scanner::{DirectoryWalker, FileRecord, ScanConfig};
