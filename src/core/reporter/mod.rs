//! # Reporter Module
//!
//! Turns duplicate groups into the JSON report and the end-of-scan log text.

mod json;

pub use json::{DuplicateReport, ReportWriter};

use crate::core::index::DuplicateGroup;

/// Banner shown once hashing has finished
pub const FINISHED_BANNER: &str =
    "\n------------------------------ FINISHED -------------------------------\n";

/// Reminder that equal digests are overwhelmingly, not provably, equal content
pub const COLLISION_WARNING: &str =
    "\n WARNING: These files are 1-(2^-128) * 100 percent equal \n";

/// Shown in place of the listing when every file is unique
pub const NO_DUPLICATES: &str = "No duplicate files found.";

impl ReportWriter {
    /// Log lines listing every group: a `Hash:` header then indented members
    pub fn listing(groups: &[DuplicateGroup]) -> Vec<String> {
        if groups.is_empty() {
            return vec![NO_DUPLICATES.to_string()];
        }

        let mut lines = Vec::with_capacity(groups.iter().map(|g| g.paths.len() + 1).sum());
        for group in groups {
            lines.push(format!("Hash: {}", group.digest));
            for path in &group.paths {
                lines.push(format!("    {}", path.display()));
            }
        }
        lines
    }
}
