//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};

/// All events emitted by a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A line of user-facing status text, delivered in order
    LogLine(String),
    /// Discard all log text received so far
    LogClear,
    /// Byte-level progress snapshot
    Progress(ProgressState),
    /// The scan moved to a new phase
    PhaseChanged { phase: ScanPhase },
    /// The scan completed and the report was written
    Finished { summary: ScanSummary },
    /// The scan stopped on request
    Cancelled { summary: ScanSummary },
    /// The scan encountered a fatal error
    Failed { reason: String },
}

/// Phases of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanPhase {
    Idle,
    Enumerating,
    Hashing,
    Reporting,
    Done,
    Cancelled,
    Failed,
}

impl ScanPhase {
    /// Whether no further transitions can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanPhase::Done | ScanPhase::Cancelled | ScanPhase::Failed)
    }
}

/// Processed and total byte counts for the hashing phase
///
/// `total_bytes` is fixed once enumeration ends. `processed_bytes` only
/// goes down when a file fails part way through and its bytes are rolled back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Bytes digested so far
    pub processed_bytes: u64,
    /// Bytes of all enumerated files
    pub total_bytes: u64,
}

impl ProgressState {
    /// Create a progress snapshot
    pub fn new(processed_bytes: u64, total_bytes: u64) -> Self {
        Self {
            processed_bytes,
            total_bytes,
        }
    }

    /// Integer percentage in `0..=100`
    ///
    /// An empty scan reports 0. Files that grew after enumeration can push
    /// the raw value past 100, so it is clamped.
    pub fn percent(&self) -> u8 {
        if self.total_bytes == 0 {
            return 0;
        }
        let raw = u128::from(self.processed_bytes) * 100 / u128::from(self.total_bytes);
        raw.min(100) as u8
    }
}

/// Summary of a scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Files found during enumeration
    pub files_found: usize,
    /// Files successfully digested
    pub files_hashed: usize,
    /// Bytes of all enumerated files
    pub total_bytes: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Files that have at least one identical twin, excluding one copy per group
    pub duplicate_files: usize,
    /// Bytes that would be freed by keeping one copy per group
    pub wasted_bytes: u64,
    /// Entries skipped because of tolerated errors
    pub skipped: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanPhase::Idle => write!(f, "Idle"),
            ScanPhase::Enumerating => write!(f, "Finding files"),
            ScanPhase::Hashing => write!(f, "Hashing"),
            ScanPhase::Reporting => write!(f, "Reporting"),
            ScanPhase::Done => write!(f, "Done"),
            ScanPhase::Cancelled => write!(f, "Cancelled"),
            ScanPhase::Failed => write!(f, "Failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Progress(ProgressState::new(4096, 10000));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, event);
    }

    #[test]
    fn percent_is_floored() {
        assert_eq!(ProgressState::new(4096, 10000).percent(), 40);
        assert_eq!(ProgressState::new(8192, 10000).percent(), 81);
        assert_eq!(ProgressState::new(10000, 10000).percent(), 100);
    }

    #[test]
    fn percent_of_empty_scan_is_zero() {
        assert_eq!(ProgressState::new(0, 0).percent(), 0);
    }

    #[test]
    fn percent_is_clamped_when_files_grow() {
        assert_eq!(ProgressState::new(150, 100).percent(), 100);
    }

    #[test]
    fn percent_does_not_overflow_on_huge_totals() {
        let state = ProgressState::new(u64::MAX / 2, u64::MAX);
        assert_eq!(state.percent(), 49);
    }

    #[test]
    fn terminal_phases() {
        assert!(ScanPhase::Done.is_terminal());
        assert!(ScanPhase::Cancelled.is_terminal());
        assert!(ScanPhase::Failed.is_terminal());
        assert!(!ScanPhase::Hashing.is_terminal());
    }
}
