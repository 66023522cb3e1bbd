//! JSON report serialization.
//!
//! The report is a single object mapping digest hex strings to the member
//! paths of each duplicate group:
//!
//! ```json
//! {
//!     "5d41402abc4b2a76b9719d911017c592": [
//!         "/data/a.txt",
//!         "/data/copy/a.txt"
//!     ]
//! }
//! ```

use crate::core::index::DuplicateGroup;
use crate::error::ReportError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::warn;

/// Parsed report: digest hex string to member paths
pub type DuplicateReport = BTreeMap<String, Vec<String>>;

/// Writes duplicate groups to disk
pub struct ReportWriter;

impl ReportWriter {
    /// Build the report document for `groups`
    ///
    /// Keys are sorted by the map itself, so the output does not depend on
    /// the order groups were discovered in.
    pub fn document(groups: &[DuplicateGroup]) -> DuplicateReport {
        groups
            .iter()
            .map(|group| {
                let paths = group.paths.iter().map(|p| path_text(p)).collect();
                (group.digest.to_hex(), paths)
            })
            .collect()
    }

    /// Render the report as pretty printed JSON with 4-space indentation
    pub fn to_json(groups: &[DuplicateGroup]) -> Result<String, ReportError> {
        let document = Self::document(groups);

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        document.serialize(&mut serializer)?;
        buffer.push(b'\n');

        // serde_json only ever emits UTF-8
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Write `groups` to `output_path`, replacing any existing file
    ///
    /// The document goes to a temporary file next to the destination and is
    /// renamed over it, so a failed write never leaves a truncated report.
    pub fn write(groups: &[DuplicateGroup], output_path: &Path) -> Result<(), ReportError> {
        let json = Self::to_json(groups)?;
        let write_error = |source| ReportError::Write {
            path: output_path.to_path_buf(),
            source,
        };

        let directory = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(directory).map_err(write_error)?;
        temp.write_all(json.as_bytes()).map_err(write_error)?;
        temp.as_file().sync_all().map_err(write_error)?;
        temp.persist(output_path).map_err(|e| write_error(e.error))?;

        Ok(())
    }

    /// Load a report written by [`ReportWriter::write`]
    pub fn read(path: &Path) -> Result<DuplicateReport, ReportError> {
        let content = fs::read_to_string(path).map_err(|source| ReportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Path as report text; non-UTF-8 bytes are replaced with U+FFFD
fn path_text(path: &Path) -> String {
    match path.to_str() {
        Some(text) => text.to_string(),
        None => {
            warn!(path = %path.display(), "path is not valid UTF-8, report entry is lossy");
            path.to_string_lossy().into_owned()
        }
    }
}
