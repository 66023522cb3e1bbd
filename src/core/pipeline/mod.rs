//! # Pipeline Module
//!
//! Orchestrates a full scan.
//!
//! ## Pipeline Stages
//! 1. **Enumerate** - Walk the root and total the size of every file
//! 2. **Hash** - Digest each file in chunks, reporting byte progress
//! 3. **Report** - Group equal digests and write the JSON report
//!
//! Files are hashed one at a time on a single worker. Per-file failures are
//! logged and skipped; only an unusable root or an unwritable report fails
//! the scan.

mod cancel;
mod controller;
mod coordinator;

pub use cancel::CancellationToken;
pub use controller::ScanController;
pub use coordinator::{
    ScanCoordinator, ScanCoordinatorBuilder, ScanOutcome, ScanRequest, ScanResult,
};
