//! Integration tests for the scan pipeline.
//!
//! These tests verify end-to-end scan behavior including:
//! - Grouping identical files and the exact report text
//! - Byte accounting and progress events
//! - Nonexistent roots and unwritable reports
//! - Cancellation and single-flight control

use dupe_finder::core::hasher::Digest;
use dupe_finder::core::pipeline::{ScanController, ScanCoordinator, ScanOutcome, ScanRequest};
use dupe_finder::core::reporter::ReportWriter;
use dupe_finder::error::DuplicateFinderError;
use dupe_finder::events::{Event, EventChannel, MemorySink, ScanPhase};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch area with a `data` directory to scan and room for the report
struct Fixture {
    temp_dir: TempDir,
    data: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data");
        fs::create_dir(&data).unwrap();
        Self { temp_dir, data }
    }

    fn file(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.data.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn output(&self) -> PathBuf {
        self.temp_dir.path().join("report.json")
    }
}

fn scan(root: &Path, output: &Path) -> (ScanOutcome, MemorySink) {
    let sink = MemorySink::new();
    let outcome = ScanCoordinator::builder(root, output)
        .build()
        .run_with_events(&sink)
        .unwrap();
    (outcome, sink)
}

#[test]
fn identical_files_end_up_in_the_report() {
    let fixture = Fixture::new();
    let a = fixture.file("A.txt", b"hello");
    let b = fixture.file("B.txt", b"hello");
    fixture.file("C.txt", b"world");

    let (outcome, _sink) = scan(&fixture.data, &fixture.output());

    assert!(matches!(outcome, ScanOutcome::Completed(_)));

    let report = ReportWriter::read(&fixture.output()).unwrap();
    assert_eq!(report.len(), 1);

    let mut members = report["5d41402abc4b2a76b9719d911017c592"].clone();
    members.sort();
    assert_eq!(
        members,
        vec![
            a.to_string_lossy().into_owned(),
            b.to_string_lossy().into_owned()
        ]
    );
}

#[test]
fn nested_copies_are_grouped_and_unique_files_left_out() {
    let fixture = Fixture::new();
    fixture.file("a.txt", b"alpha");
    fixture.file("deep/er/a-copy.txt", b"alpha");
    fixture.file("deep/b.txt", b"bravo");
    fixture.file("b-copy.txt", b"bravo");
    fixture.file("b-copy-2.txt", b"bravo");
    fixture.file("unique.txt", b"charlie");

    let (outcome, _sink) = scan(&fixture.data, &fixture.output());
    let result = outcome.result();

    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.summary.files_found, 6);
    assert_eq!(result.summary.duplicate_files, 3);
    assert_eq!(result.summary.wasted_bytes, 5 + 5 * 2);

    let alpha = result
        .groups
        .iter()
        .find(|g| g.digest == Digest::of(b"alpha"))
        .unwrap();
    assert_eq!(alpha.paths.len(), 2);

    let bravo = result
        .groups
        .iter()
        .find(|g| g.digest == Digest::of(b"bravo"))
        .unwrap();
    assert_eq!(bravo.paths.len(), 3);

    // groups come out in digest order
    let digests: Vec<Digest> = result.groups.iter().map(|g| g.digest).collect();
    let mut sorted = digests.clone();
    sorted.sort();
    assert_eq!(digests, sorted);
}

#[test]
fn report_is_stable_across_runs() {
    let fixture = Fixture::new();
    fixture.file("x/1", b"same");
    fixture.file("y/2", b"same");
    fixture.file("z/3", b"other");
    fixture.file("z/4", b"other");

    let first_path = fixture.temp_dir.path().join("first.json");
    let second_path = fixture.temp_dir.path().join("second.json");
    scan(&fixture.data, &first_path);
    scan(&fixture.data, &second_path);

    let first = fs::read_to_string(first_path).unwrap();
    let second = fs::read_to_string(second_path).unwrap();
    assert_eq!(first, second);
    assert!(first.starts_with("{\n    \""));
}

#[test]
fn every_byte_is_counted_once() {
    let fixture = Fixture::new();
    fixture.file("one", &vec![1u8; 9000]);
    fixture.file("two", &vec![2u8; 4096]);
    fixture.file("three", &vec![3u8; 17]);
    fixture.file("empty", b"");

    let (outcome, sink) = scan(&fixture.data, &fixture.output());
    let result = outcome.result();

    assert_eq!(result.progress.total_bytes, 9000 + 4096 + 17);
    assert_eq!(result.progress.processed_bytes, result.progress.total_bytes);

    let progress = sink.progress();
    assert_eq!(progress.first().unwrap().processed_bytes, 0);
    assert_eq!(progress.last().unwrap().percent(), 100);
    // no rollbacks on a clean run
    assert!(progress
        .windows(2)
        .all(|w| w[0].processed_bytes <= w[1].processed_bytes));
    assert!(progress.iter().all(|p| p.processed_bytes <= p.total_bytes));
}

#[test]
fn large_file_reports_progress_per_chunk() {
    let fixture = Fixture::new();
    fixture.file("big.bin", &vec![7u8; 10_000]);

    let (_outcome, sink) = scan(&fixture.data, &fixture.output());

    let processed: Vec<u64> = sink.progress().iter().map(|p| p.processed_bytes).collect();
    assert_eq!(processed, vec![0, 4096, 8192, 10_000, 10_000]);
}

#[test]
fn empty_directory_writes_empty_report() {
    let fixture = Fixture::new();

    let (outcome, sink) = scan(&fixture.data, &fixture.output());

    assert!(outcome.result().groups.is_empty());
    assert!(sink.progress().iter().all(|p| p.percent() == 0));
    assert_eq!(fs::read_to_string(fixture.output()).unwrap(), "{}\n");
}

#[test]
fn analysis_is_logged_per_file() {
    let fixture = Fixture::new();
    let path = fixture.file("note.txt", b"hello");

    let (_outcome, sink) = scan(&fixture.data, &fixture.output());
    let lines = sink.log_lines();

    let analyzing = format!("Analyzing: {}", path.display());
    let analyzed_at = lines.iter().position(|l| *l == analyzing).unwrap();
    assert_eq!(
        lines[analyzed_at + 1],
        "Calculated Hash: 5d41402abc4b2a76b9719d911017c592"
    );
}

#[test]
fn phases_are_announced_in_order() {
    let fixture = Fixture::new();
    fixture.file("a", b"a");

    let (_outcome, sink) = scan(&fixture.data, &fixture.output());

    let phases: Vec<ScanPhase> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::PhaseChanged { phase } => Some(phase),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            ScanPhase::Enumerating,
            ScanPhase::Hashing,
            ScanPhase::Reporting,
            ScanPhase::Done
        ]
    );
}

#[test]
fn nonexistent_root_fails_without_writing() {
    let fixture = Fixture::new();
    let missing = fixture.temp_dir.path().join("nope");
    let sink = MemorySink::new();

    let result = ScanCoordinator::builder(&missing, fixture.output())
        .build()
        .run_with_events(&sink);

    assert!(matches!(result, Err(DuplicateFinderError::Scan(_))));
    assert!(!fixture.output().exists());

    let terminal: Vec<Event> = sink
        .events()
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                Event::Finished { .. } | Event::Cancelled { .. } | Event::Failed { .. }
            )
        })
        .collect();
    assert_eq!(terminal.len(), 1);
    assert!(matches!(terminal[0], Event::Failed { .. }));
}

#[test]
fn file_as_root_is_rejected() {
    let fixture = Fixture::new();
    let file = fixture.file("plain.txt", b"x");

    let result = ScanCoordinator::builder(&file, fixture.output()).build().run();

    assert!(matches!(result, Err(DuplicateFinderError::Scan(_))));
}

#[test]
fn report_failure_hands_back_the_result() {
    let fixture = Fixture::new();
    fixture.file("a", b"twin");
    fixture.file("b", b"twin");
    let output = fixture.temp_dir.path().join("gone").join("report.json");

    let result = ScanCoordinator::builder(&fixture.data, &output).build().run();

    match result {
        Err(DuplicateFinderError::ReportNotWritten { result, .. }) => {
            assert_eq!(result.groups.len(), 1);
        }
        other => panic!("expected ReportNotWritten, got {:?}", other.map(|_| ())),
    }
}

#[cfg(unix)]
#[test]
fn symlinks_are_never_followed() {
    use std::os::unix::fs::symlink;

    let fixture = Fixture::new();
    let real = fixture.file("real.txt", b"content");
    symlink(&real, fixture.data.join("link.txt")).unwrap();
    symlink(&fixture.data, fixture.data.join("loop")).unwrap();

    let (outcome, _sink) = scan(&fixture.data, &fixture.output());
    let result = outcome.result();

    assert_eq!(result.summary.files_found, 1);
    assert!(result.groups.is_empty());
}

#[test]
fn hidden_files_are_included_unless_skipped() {
    let fixture = Fixture::new();
    fixture.file(".hidden", b"twin");
    fixture.file("visible", b"twin");

    let (included, _sink) = scan(&fixture.data, &fixture.output());
    assert_eq!(included.result().groups.len(), 1);

    let skipped = ScanCoordinator::builder(&fixture.data, fixture.output())
        .include_hidden(false)
        .build()
        .run()
        .unwrap();
    assert!(skipped.result().groups.is_empty());
    assert_eq!(skipped.result().summary.files_found, 1);
}

#[test]
fn cancelled_scan_writes_no_report_by_default() {
    let fixture = Fixture::new();
    fixture.file("a", b"twin");
    fixture.file("b", b"twin");

    let coordinator = ScanCoordinator::builder(&fixture.data, fixture.output()).build();
    coordinator.cancellation_token().cancel();

    let outcome = coordinator.run().unwrap();

    assert!(outcome.is_cancelled());
    assert_eq!(coordinator.phase(), ScanPhase::Cancelled);
    assert!(!fixture.output().exists());
}

#[test]
fn controller_runs_scans_one_after_another() {
    let fixture = Fixture::new();
    fixture.file("a", b"twin");
    fixture.file("b", b"twin");

    let controller = ScanController::new();
    let (sender, receiver) = EventChannel::new();

    controller
        .start(ScanRequest::new(&fixture.data, fixture.output()), sender)
        .unwrap();
    let first = controller.wait().unwrap().unwrap();
    assert_eq!(first.result().groups.len(), 1);

    let events = receiver.drain();
    assert!(matches!(events.last(), Some(Event::Finished { .. })));

    controller
        .start(
            ScanRequest::new(&fixture.data, fixture.output()),
            MemorySink::new(),
        )
        .unwrap();
    assert!(controller.wait().unwrap().is_ok());
    assert_eq!(controller.state(), ScanPhase::Idle);
}
