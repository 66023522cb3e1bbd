//! # CLI Module
//!
//! Command-line interface for the duplicate file finder.
//!
//! ## Usage
//! ```bash
//! # Scan a directory, writing the report to dupes.json
//! dupe-finder scan ~/Documents -o dupes
//!
//! # Re-run the last scan
//! dupe-finder scan
//!
//! # Print a report written earlier
//! dupe-finder show dupes.json
//! ```

use clap::{Parser, Subcommand};
use console::{style, Term};
use dupe_finder::core::pipeline::{ScanController, ScanOutcome, ScanRequest, ScanResult};
use dupe_finder::core::reporter::{ReportWriter, NO_DUPLICATES};
use dupe_finder::core::scanner::ScanConfig;
use dupe_finder::error::{DuplicateFinderError, Result};
use dupe_finder::events::{Event, EventChannel, EventReceiver, ScanSummary};
use dupe_finder::settings::{JsonFileStore, Settings, SettingsStore};
use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::warn;

/// Dupe Finder - Find files with identical content
#[derive(Parser, Debug)]
#[command(name = "dupe-finder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory for duplicate files
    Scan {
        /// Directory to scan (defaults to the last one scanned)
        root: Option<PathBuf>,

        /// Report file; `.json` is appended when missing
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Bytes read per hashing step
        #[arg(long, default_value = "4096")]
        chunk_size: NonZeroUsize,

        /// Skip files and directories whose name starts with a dot
        #[arg(long)]
        skip_hidden: bool,

        /// Maximum directory depth to descend
        #[arg(long)]
        max_depth: Option<usize>,

        /// Write the groups found so far when interrupted
        #[arg(long)]
        write_on_cancel: bool,

        /// Only print errors
        #[arg(short, long, conflicts_with = "verbose")]
        quiet: bool,

        /// Print every file as it is analyzed
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print a report written by an earlier scan
    Show {
        /// Report file
        report: PathBuf,
    },
}

struct ScanArgs {
    root: Option<PathBuf>,
    output: Option<PathBuf>,
    chunk_size: NonZeroUsize,
    skip_hidden: bool,
    max_depth: Option<usize>,
    write_on_cancel: bool,
    quiet: bool,
    verbose: bool,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            root,
            output,
            chunk_size,
            skip_hidden,
            max_depth,
            write_on_cancel,
            quiet,
            verbose,
        } => {
            dupe_finder::init_tracing(if verbose { "debug" } else { "warn" });
            run_scan(ScanArgs {
                root,
                output,
                chunk_size,
                skip_hidden,
                max_depth,
                write_on_cancel,
                quiet,
                verbose,
            })
        }
        Commands::Show { report } => {
            dupe_finder::init_tracing("warn");
            run_show(&report)
        }
    }
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let term = Term::stderr();
    let store = JsonFileStore::default_location();
    let remembered = load_settings(store.as_ref().ok());

    let root = args
        .root
        .or(remembered.last_root)
        .ok_or_else(|| DuplicateFinderError::Config("no directory given to scan".to_string()))?;
    let output = args
        .output
        .or(remembered.last_output)
        .map(with_json_suffix)
        .ok_or_else(|| {
            DuplicateFinderError::Config("no report file given (use --output)".to_string())
        })?;

    // Absolute roots give absolute paths in the report; a missing root is
    // left as typed so the scan reports it
    let root = root.canonicalize().unwrap_or(root);

    if !args.quiet {
        term.write_line(&format!(
            "{} {}",
            style("Dupe Finder").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let request = ScanRequest {
        root: root.clone(),
        output_path: output.clone(),
        scan_config: ScanConfig {
            include_hidden: !args.skip_hidden,
            max_depth: args.max_depth,
        },
        chunk_size: args.chunk_size,
        write_report_on_cancel: args.write_on_cancel,
    };

    let controller = Arc::new(ScanController::new());
    let (sender, receiver) = EventChannel::new();

    let progress = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .map_err(|e| DuplicateFinderError::Config(e.to_string()))?
                .progress_chars("█▓░"),
        );
        Some(pb)
    };

    let handler_controller = Arc::clone(&controller);
    ctrlc::set_handler(move || {
        handler_controller.cancel();
    })
    .map_err(|e| DuplicateFinderError::Config(format!("cannot install Ctrl-C handler: {}", e)))?;

    controller.start(request, sender)?;

    let verbose = args.verbose;
    let quiet = args.quiet;
    let event_thread = thread::spawn(move || forward_events(receiver, progress, verbose, quiet));

    let outcome = controller.wait();
    event_thread.join().ok();

    if let (Ok(store), Some(Ok(outcome))) = (&store, &outcome) {
        if let Some(settings) = settings_to_remember(outcome, root, output) {
            if let Err(e) = store.save(&settings) {
                warn!(error = %e, "could not remember scan settings");
            }
        }
    }

    match outcome {
        Some(Ok(ScanOutcome::Completed(result))) => {
            if !args.quiet {
                print_summary(&term, &result);
            }
            Ok(())
        }
        Some(Ok(ScanOutcome::Cancelled(result))) => {
            if !args.quiet {
                term.write_line(&format!("{} Scan cancelled", style("✗").yellow().bold()))
                    .ok();
                if let Some(path) = &result.report_path {
                    term.write_line(&format!(
                        "  Partial report written to {}",
                        style(path.display()).cyan()
                    ))
                    .ok();
                }
            }
            Ok(())
        }
        Some(Err(e)) => Err(e),
        None => Err(DuplicateFinderError::WorkerPanicked),
    }
}

/// Drive the progress bar and log output until the worker hangs up
fn forward_events(
    receiver: EventReceiver,
    progress: Option<ProgressBar>,
    verbose: bool,
    quiet: bool,
) {
    let print = |line: &str| match &progress {
        Some(pb) => pb.println(line),
        None => println!("{}", line),
    };

    // Before the clear the log is per-file chatter; after it, the listing
    let mut listing = false;

    for event in receiver.iter() {
        match event {
            Event::PhaseChanged { phase } => {
                if let Some(pb) = &progress {
                    pb.set_message(phase.to_string());
                }
            }
            Event::Progress(state) => {
                if let Some(pb) = &progress {
                    pb.set_position(u64::from(state.percent()));
                }
            }
            Event::LogClear => listing = true,
            Event::LogLine(line) => {
                if !quiet && (listing || verbose) {
                    print(&line);
                }
            }
            Event::Finished { .. } | Event::Cancelled { .. } => {
                if let Some(pb) = &progress {
                    pb.finish_and_clear();
                }
            }
            Event::Failed { reason } => {
                if let Some(pb) = &progress {
                    pb.abandon_with_message(reason);
                }
            }
        }
    }
}

fn run_show(report: &Path) -> Result<()> {
    let report = ReportWriter::read(report)?;

    if report.is_empty() {
        println!("{}", NO_DUPLICATES);
        return Ok(());
    }

    for (digest, paths) in &report {
        println!("Hash: {}", digest);
        for path in paths {
            println!("    {}", path);
        }
    }

    Ok(())
}

fn print_summary(term: &Term, result: &ScanResult) {
    let summary: &ScanSummary = &result.summary;

    term.write_line("").ok();
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files ({}) scanned in {:.1}s",
        style(summary.files_found).cyan(),
        format_bytes(summary.total_bytes),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!(
        "  {} duplicate groups, {} duplicate files",
        style(summary.duplicate_groups).cyan(),
        style(summary.duplicate_files).cyan()
    ))
    .ok();

    term.write_line(&format!(
        "  {} potential space savings",
        style(format_bytes(summary.wasted_bytes)).yellow()
    ))
    .ok();

    if summary.skipped > 0 {
        term.write_line(&format!(
            "  {} files skipped (see log)",
            style(summary.skipped).red()
        ))
        .ok();
    }

    if let Some(path) = &result.report_path {
        term.write_line(&format!("  Report: {}", style(path.display()).cyan()))
            .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("Remember: No files were deleted. Review carefully before taking action.").dim()
    ))
    .ok();
}

/// Root and output worth offering next time; only a completed scan counts
fn settings_to_remember(outcome: &ScanOutcome, root: PathBuf, output: PathBuf) -> Option<Settings> {
    match outcome {
        ScanOutcome::Completed(_) => Some(Settings {
            last_root: Some(root),
            last_output: Some(output),
        }),
        ScanOutcome::Cancelled(_) => None,
    }
}

/// One-line failure notice; never includes the partial result
pub fn failure_message(error: &DuplicateFinderError) -> String {
    format!("{} {}", style("Error:").red().bold(), error)
}

fn load_settings(store: Option<&JsonFileStore>) -> Settings {
    match store.map(|s| s.load()) {
        Some(Ok(settings)) => settings,
        Some(Err(e)) => {
            warn!(error = %e, "ignoring saved settings");
            Settings::default()
        }
        None => Settings::default(),
    }
}

/// Append `.json` unless the path already ends with it
fn with_json_suffix(path: PathBuf) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "json") {
        return path;
    }
    let mut name = OsString::from(path);
    name.push(".json");
    PathBuf::from(name)
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
