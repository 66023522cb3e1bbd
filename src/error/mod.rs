//! # Error Module
//!
//! User-friendly error types for the duplicate file finder.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-file problems are recoverable** - only the root and the report are fatal

use crate::core::pipeline::ScanResult;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DuplicateFinderError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// The scan finished but the report could not be written.
    ///
    /// The complete result is kept so the caller can retry against
    /// another output path.
    #[error("Scan finished but the report was not written: {source}")]
    ReportNotWritten {
        #[source]
        source: ReportError,
        result: Box<ScanResult>,
    },

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("A scan is already in progress")]
    ScanInProgress,

    #[error("Failed to start the scan worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("The scan worker stopped unexpectedly")]
    WorkerPanicked,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while walking the directory tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for `path`
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => ScanError::DirectoryNotFound { path },
            std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied { path },
            _ => ScanError::ReadDirectory { path, source },
        }
    }

    /// Path the error refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            ScanError::DirectoryNotFound { path }
            | ScanError::NotADirectory { path }
            | ScanError::PermissionDenied { path }
            | ScanError::ReadDirectory { path, .. } => path,
        }
    }
}

/// Errors that occur while digesting a file
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Hashing of {path} was cancelled")]
    Cancelled { path: PathBuf },
}

/// Errors that occur while writing or reading a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read report {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors that occur with the remembered front-end settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Could not determine the home directory")]
    NoHomeDirectory,

    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings file {path} is malformed: {reason}. Delete this file and try again.")]
    Malformed { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DuplicateFinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/data/archive"),
        };
        let message = error.to_string();
        assert!(message.contains("/data/archive"));
    }

    #[test]
    fn io_errors_are_classified() {
        let not_found = ScanError::from_io(
            PathBuf::from("/missing"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(not_found, ScanError::DirectoryNotFound { .. }));

        let denied = ScanError::from_io(
            PathBuf::from("/secret"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(denied, ScanError::PermissionDenied { .. }));
        assert_eq!(denied.path(), std::path::Path::new("/secret"));
    }

    #[test]
    fn hash_error_includes_path() {
        let error = HashError::Read {
            path: PathBuf::from("/data/broken.bin"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "device gone"),
        };
        let message = error.to_string();
        assert!(message.contains("/data/broken.bin"));
        assert!(message.contains("device gone"));
    }

    #[test]
    fn settings_error_suggests_recovery() {
        let error = SettingsError::Malformed {
            path: PathBuf::from("/home/user/.dupe-finder.json"),
            reason: "expected value".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("Delete this file"));
    }
}
