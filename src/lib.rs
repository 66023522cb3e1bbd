//! # Dupe Finder
//!
//! Finds files whose content is byte-for-byte identical and writes a JSON
//! report grouping them by content digest.
//!
//! ## Core Philosophy
//! - **Never touch user files** - the scan only reads, it never deletes or moves
//! - **Content, not names** - files are grouped by an MD5 digest of their bytes
//! - **Keep going** - unreadable files are reported and skipped, never fatal
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Walking, hashing, indexing and reporting
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - User-friendly error types
//! - `settings` - Remembered front-end settings (last root / output)

pub mod core;
pub mod error;
pub mod events;
pub mod settings;

// Re-export commonly used types at the crate root
pub use error::{DuplicateFinderError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// `default_directive` is used when `RUST_LOG` is not set.
pub fn init_tracing(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    // A second initialisation (tests, embedding hosts) keeps the first subscriber
    let _ = tracing::subscriber::set_global_default(subscriber);
}
