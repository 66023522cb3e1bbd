//! Scan execution implementation.

use super::CancellationToken;
use crate::core::hasher::{StreamingHasher, DEFAULT_CHUNK_SIZE};
use crate::core::index::{DuplicateGroup, DuplicateIndex};
use crate::core::reporter::{ReportWriter, COLLISION_WARNING, FINISHED_BANNER};
use crate::core::scanner::{DirectoryWalker, FileRecord, ScanConfig};
use crate::error::{DuplicateFinderError, HashError, ScanError};
use crate::events::{null_sender, ProgressSink, ProgressState, ScanPhase, ScanSummary};
use std::fs::File;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What to scan and where to put the report
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Directory to scan
    pub root: PathBuf,
    /// Where the JSON report is written
    pub output_path: PathBuf,
    /// Walker configuration
    pub scan_config: ScanConfig,
    /// Bytes read per chunk while hashing
    pub chunk_size: NonZeroUsize,
    /// Write the groups found so far when the scan is cancelled
    pub write_report_on_cancel: bool,
}

impl ScanRequest {
    /// Request with default settings
    pub fn new(root: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_path: output_path.into(),
            scan_config: ScanConfig::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            write_report_on_cancel: false,
        }
    }
}

/// Result of a scan that reached the end of hashing (or was cancelled)
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Duplicate groups, sorted by digest
    pub groups: Vec<DuplicateGroup>,
    /// Counters for the run
    pub summary: ScanSummary,
    /// Byte progress at the end of the run
    pub progress: ProgressState,
    /// Tolerated errors, one message per skipped entry
    pub errors: Vec<String>,
    /// Where the report was written, if it was
    pub report_path: Option<PathBuf>,
}

/// How a scan ended, when it did not fail
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// Every file was offered to the hasher and the report was written
    Completed(ScanResult),
    /// The scan stopped on request
    Cancelled(ScanResult),
}

impl ScanOutcome {
    /// The result, however the scan ended
    pub fn result(&self) -> &ScanResult {
        match self {
            ScanOutcome::Completed(result) | ScanOutcome::Cancelled(result) => result,
        }
    }

    /// Whether the scan stopped on request
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScanOutcome::Cancelled(_))
    }
}

/// Builder for scan configuration
pub struct ScanCoordinatorBuilder {
    request: ScanRequest,
    cancel: Option<CancellationToken>,
}

impl ScanCoordinatorBuilder {
    /// Create a new builder for scanning `root` into `output_path`
    pub fn new(root: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            request: ScanRequest::new(root, output_path),
            cancel: None,
        }
    }

    /// Set the hashing chunk size
    pub fn chunk_size(mut self, chunk_size: NonZeroUsize) -> Self {
        self.request.chunk_size = chunk_size;
        self
    }

    /// Set walker configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.request.scan_config = config;
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.request.scan_config.include_hidden = include;
        self
    }

    /// Limit how deep the walk descends
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.request.scan_config.max_depth = depth;
        self
    }

    /// Write a report of what was found when the scan is cancelled
    pub fn write_report_on_cancel(mut self, write: bool) -> Self {
        self.request.write_report_on_cancel = write;
        self
    }

    /// Use an existing cancellation token
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build the coordinator
    pub fn build(self) -> ScanCoordinator {
        let mut coordinator = ScanCoordinator::new(self.request);
        if let Some(token) = self.cancel {
            coordinator.cancel = token;
        }
        coordinator
    }
}

/// Drives one scan: walk, hash, group, report
///
/// A coordinator is meant for a single run at a time; [`super::ScanController`]
/// enforces that when scans are started from a UI.
pub struct ScanCoordinator {
    request: ScanRequest,
    walker: DirectoryWalker,
    hasher: StreamingHasher,
    cancel: CancellationToken,
    phase: Arc<Mutex<ScanPhase>>,
}

/// Files found during enumeration
struct Enumeration {
    records: Vec<FileRecord>,
    total_bytes: u64,
    errors: Vec<String>,
    cancelled: bool,
}

/// Digests gathered during hashing
struct Hashing {
    index: DuplicateIndex,
    errors: Vec<String>,
    cancelled: bool,
}

impl ScanCoordinator {
    /// Create a new builder
    pub fn builder(
        root: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> ScanCoordinatorBuilder {
        ScanCoordinatorBuilder::new(root, output_path)
    }

    /// Create a coordinator for `request` with a fresh cancellation token
    pub fn new(request: ScanRequest) -> Self {
        Self {
            walker: DirectoryWalker::new(request.scan_config.clone()),
            hasher: StreamingHasher::new(request.chunk_size),
            request,
            cancel: CancellationToken::new(),
            phase: Arc::new(Mutex::new(ScanPhase::Idle)),
        }
    }

    /// The request this coordinator runs
    pub fn request(&self) -> &ScanRequest {
        &self.request
    }

    /// Token that stops this scan when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current phase
    pub fn phase(&self) -> ScanPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn shared_phase(&self) -> Arc<Mutex<ScanPhase>> {
        Arc::clone(&self.phase)
    }

    /// Run the scan without events
    pub fn run(&self) -> Result<ScanOutcome, DuplicateFinderError> {
        self.run_with_events(&null_sender())
    }

    /// Run the scan, reporting progress to `sink`
    ///
    /// Exactly one terminal event (`Finished`, `Cancelled` or `Failed`) is
    /// emitted before this returns.
    pub fn run_with_events(
        &self,
        sink: &dyn ProgressSink,
    ) -> Result<ScanOutcome, DuplicateFinderError> {
        self.run_with_opener(sink, |path: &Path| File::open(path))
    }

    pub(crate) fn run_with_opener<R, O>(
        &self,
        sink: &dyn ProgressSink,
        open: O,
    ) -> Result<ScanOutcome, DuplicateFinderError>
    where
        R: Read,
        O: FnMut(&Path) -> io::Result<R>,
    {
        let start_time = Instant::now();

        // Phase 1: Enumerating
        self.transition(sink, ScanPhase::Enumerating);
        sink.log_line(format!("Finding files in {}", self.request.root.display()));

        let enumeration = match self.enumerate(sink) {
            Ok(enumeration) => enumeration,
            Err(e) => {
                warn!(root = %self.request.root.display(), error = %e, "scan root is not usable");
                self.transition(sink, ScanPhase::Failed);
                sink.failed(e.to_string());
                return Err(e.into());
            }
        };

        let files_found = enumeration.records.len();
        let mut progress = ProgressState::new(0, enumeration.total_bytes);
        let mut errors = enumeration.errors;

        info!(
            files = files_found,
            bytes = enumeration.total_bytes,
            "enumeration finished"
        );

        if enumeration.cancelled {
            let tally = Tally::new(files_found, 0, errors, start_time);
            return Ok(self.finish_cancelled(sink, DuplicateIndex::new(), progress, tally));
        }

        // Phase 2: Hashing
        self.transition(sink, ScanPhase::Hashing);
        sink.set_progress(progress);

        let hashing = self.hash_files(enumeration.records, &mut progress, sink, open);
        errors.extend(hashing.errors);

        let tally = Tally::new(files_found, hashing.index.len(), errors, start_time);

        if hashing.cancelled {
            return Ok(self.finish_cancelled(sink, hashing.index, progress, tally));
        }

        // Phase 3: Reporting
        self.transition(sink, ScanPhase::Reporting);

        let groups = hashing.index.finalize();

        sink.log_clear();
        sink.log_line(FINISHED_BANNER.to_string());
        sink.log_line(COLLISION_WARNING.to_string());
        for line in ReportWriter::listing(&groups) {
            sink.log_line(line);
        }

        let summary = tally.summarize(&groups, progress.total_bytes);
        let mut result = ScanResult {
            groups,
            summary,
            progress,
            errors: tally.errors,
            report_path: None,
        };

        match ReportWriter::write(&result.groups, &self.request.output_path) {
            Ok(()) => {
                result.report_path = Some(self.request.output_path.clone());
                sink.log_line(format!(
                    "Report written to {}",
                    self.request.output_path.display()
                ));
                self.transition(sink, ScanPhase::Done);
                sink.finished(result.summary.clone());
                Ok(ScanOutcome::Completed(result))
            }
            Err(e) => {
                warn!(error = %e, "report was not written");
                self.transition(sink, ScanPhase::Failed);
                sink.failed(e.to_string());
                Err(DuplicateFinderError::ReportNotWritten {
                    source: e,
                    result: Box::new(result),
                })
            }
        }
    }

    fn transition(&self, sink: &dyn ProgressSink, phase: ScanPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
        debug!(%phase, "scan phase changed");
        sink.emit(crate::events::Event::PhaseChanged { phase });
    }

    /// Walk the root, fixing the byte total
    fn enumerate(&self, sink: &dyn ProgressSink) -> Result<Enumeration, ScanError> {
        let mut walk = self.walker.enumerate(&self.request.root)?;

        let mut enumeration = Enumeration {
            records: Vec::new(),
            total_bytes: 0,
            errors: Vec::new(),
            cancelled: false,
        };

        for entry in walk.by_ref() {
            if self.cancel.is_cancelled() {
                enumeration.cancelled = true;
                break;
            }

            match entry {
                Ok(record) => {
                    sink.log_line(format!("Found: {}", record.path.display()));
                    enumeration.total_bytes += record.size;
                    enumeration.records.push(record);
                }
                Err(e) => {
                    warn!(path = %e.path().display(), error = %e, "skipping entry");
                    sink.log_line(format!("Skipped: {}", e));
                    enumeration.errors.push(e.to_string());
                }
            }
        }

        if walk.symlinks_skipped() > 0 {
            debug!(count = walk.symlinks_skipped(), "symlinks were not followed");
        }

        Ok(enumeration)
    }

    /// Digest every record in order, feeding the index
    fn hash_files<R, O>(
        &self,
        records: Vec<FileRecord>,
        progress: &mut ProgressState,
        sink: &dyn ProgressSink,
        mut open: O,
    ) -> Hashing
    where
        R: Read,
        O: FnMut(&Path) -> io::Result<R>,
    {
        let mut hashing = Hashing {
            index: DuplicateIndex::new(),
            errors: Vec::new(),
            cancelled: false,
        };

        for record in records {
            if self.cancel.is_cancelled() {
                hashing.cancelled = true;
                break;
            }

            sink.log_line(format!("Analyzing: {}", record.path.display()));

            let bytes_before = progress.processed_bytes;
            let cancel = &self.cancel;

            let result = match open(&record.path) {
                Ok(reader) => self.hasher.digest_reader(reader, &record.path, |len| {
                    progress.processed_bytes += len as u64;
                    sink.set_progress(*progress);
                    thread::yield_now();
                    if cancel.is_cancelled() {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                }),
                Err(source) => Err(HashError::Open {
                    path: record.path.clone(),
                    source,
                }),
            };

            match result {
                Ok(digest) => {
                    // Count the size seen at enumeration so the total still adds up
                    // if the file changed length since
                    progress.processed_bytes = bytes_before + record.size;
                    sink.log_line(format!("Calculated Hash: {}", digest));
                    sink.set_progress(*progress);
                    hashing.index.insert(digest, record.path, record.size);
                }
                Err(HashError::Cancelled { path }) => {
                    debug!(path = %path.display(), "hashing interrupted");
                    progress.processed_bytes = bytes_before;
                    sink.set_progress(*progress);
                    hashing.cancelled = true;
                    break;
                }
                Err(e) => {
                    warn!(path = %record.path.display(), error = %e, "skipping unreadable file");
                    progress.processed_bytes = bytes_before;
                    sink.log_line(format!("Skipped: {}", e));
                    sink.set_progress(*progress);
                    hashing.errors.push(e.to_string());
                }
            }

            thread::yield_now();
        }

        hashing
    }

    fn finish_cancelled(
        &self,
        sink: &dyn ProgressSink,
        index: DuplicateIndex,
        progress: ProgressState,
        tally: Tally,
    ) -> ScanOutcome {
        info!("scan cancelled");
        self.transition(sink, ScanPhase::Cancelled);

        let groups = index.finalize();
        let summary = tally.summarize(&groups, progress.total_bytes);
        let mut result = ScanResult {
            groups,
            summary,
            progress,
            errors: tally.errors,
            report_path: None,
        };

        sink.log_line("Scan cancelled.".to_string());

        if self.request.write_report_on_cancel {
            match ReportWriter::write(&result.groups, &self.request.output_path) {
                Ok(()) => {
                    result.report_path = Some(self.request.output_path.clone());
                    sink.log_line(format!(
                        "Partial report written to {}",
                        self.request.output_path.display()
                    ));
                }
                Err(e) => {
                    warn!(error = %e, "partial report was not written");
                    sink.log_line(format!("Partial report not written: {}", e));
                }
            }
        }

        sink.cancelled(result.summary.clone());
        ScanOutcome::Cancelled(result)
    }
}

/// Counters carried from hashing into the summary
struct Tally {
    files_found: usize,
    files_hashed: usize,
    errors: Vec<String>,
    start_time: Instant,
}

impl Tally {
    fn new(files_found: usize, files_hashed: usize, errors: Vec<String>, start_time: Instant) -> Self {
        Self {
            files_found,
            files_hashed,
            errors,
            start_time,
        }
    }

    fn summarize(&self, groups: &[DuplicateGroup], total_bytes: u64) -> ScanSummary {
        ScanSummary {
            files_found: self.files_found,
            files_hashed: self.files_hashed,
            total_bytes,
            duplicate_groups: groups.len(),
            duplicate_files: groups.iter().map(DuplicateGroup::duplicate_count).sum(),
            wasted_bytes: groups.iter().map(DuplicateGroup::wasted_bytes).sum(),
            skipped: self.errors.len(),
            duration_ms: self.start_time.elapsed().as_millis() as u64,
        }
    }
}
