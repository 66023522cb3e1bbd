//! Single-flight scan control for interactive hosts.

use super::{CancellationToken, ScanCoordinator, ScanOutcome, ScanRequest};
use crate::error::DuplicateFinderError;
use crate::events::{ProgressSink, ScanPhase};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

type ScanHandle = JoinHandle<Result<ScanOutcome, DuplicateFinderError>>;

struct ActiveScan {
    cancel: CancellationToken,
    phase: Arc<Mutex<ScanPhase>>,
    handle: ScanHandle,
}

/// Runs at most one scan at a time on a background worker
///
/// The host keeps one controller for its lifetime. `start` refuses while a
/// previous scan is still running; once it has ended, the next `start`
/// replaces it.
#[derive(Default)]
pub struct ScanController {
    active: Mutex<Option<ActiveScan>>,
}

impl ScanController {
    /// Create an idle controller
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveScan>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start scanning on a worker thread, delivering events to `sink`
    pub fn start<S>(&self, request: ScanRequest, sink: S) -> Result<(), DuplicateFinderError>
    where
        S: ProgressSink + 'static,
    {
        let mut active = self.lock();

        if let Some(scan) = active.as_ref() {
            if !scan.handle.is_finished() {
                return Err(DuplicateFinderError::ScanInProgress);
            }
        }

        let coordinator = ScanCoordinator::new(request);
        let cancel = coordinator.cancellation_token();
        let phase = coordinator.shared_phase();

        info!(root = %coordinator.request().root.display(), "starting scan");

        let handle = thread::Builder::new()
            .name("dupe-scan".to_string())
            .spawn(move || coordinator.run_with_events(&sink))
            .map_err(DuplicateFinderError::WorkerSpawn)?;

        *active = Some(ActiveScan {
            cancel,
            phase,
            handle,
        });

        Ok(())
    }

    /// Request the running scan to stop
    ///
    /// Returns `false` when there is nothing to cancel.
    pub fn cancel(&self) -> bool {
        match self.lock().as_ref() {
            Some(scan) if !scan.handle.is_finished() => {
                debug!("cancellation requested");
                scan.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Whether a scan is running right now
    pub fn is_scanning(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|scan| !scan.handle.is_finished())
    }

    /// Phase of the current or most recent scan
    pub fn state(&self) -> ScanPhase {
        match self.lock().as_ref() {
            Some(scan) => *scan.phase.lock().unwrap_or_else(PoisonError::into_inner),
            None => ScanPhase::Idle,
        }
    }

    /// Block until the current scan ends and take its outcome
    ///
    /// Returns `None` when no scan was started since the last `wait`.
    pub fn wait(&self) -> Option<Result<ScanOutcome, DuplicateFinderError>> {
        let scan = self.lock().take()?;
        Some(
            scan.handle
                .join()
                .unwrap_or(Err(DuplicateFinderError::WorkerPanicked)),
        )
    }
}
