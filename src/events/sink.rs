//! The observer side of the event interface.

use super::{Event, ProgressState, ScanSummary};
use std::sync::Mutex;

/// Consumer of scan events
///
/// The scan worker pushes every event through this trait. Implementations
/// must not block for long: the worker calls them between chunk reads.
pub trait ProgressSink: Send + Sync {
    /// Deliver one event
    fn emit(&self, event: Event);

    /// Append a line of status text
    fn log_line(&self, text: String) {
        self.emit(Event::LogLine(text));
    }

    /// Ask the consumer to discard accumulated log text
    fn log_clear(&self) {
        self.emit(Event::LogClear);
    }

    /// Report a progress snapshot
    fn set_progress(&self, progress: ProgressState) {
        self.emit(Event::Progress(progress));
    }

    /// Report successful completion
    fn finished(&self, summary: ScanSummary) {
        self.emit(Event::Finished { summary });
    }

    /// Report a cooperative stop
    fn cancelled(&self, summary: ScanSummary) {
        self.emit(Event::Cancelled { summary });
    }

    /// Report a fatal error
    fn failed(&self, reason: String) {
        self.emit(Event::Failed { reason });
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &S {
    fn emit(&self, event: Event) {
        (**self).emit(event);
    }
}

/// Sink that keeps every event in memory
///
/// Useful for tests and for hosts that poll instead of subscribing.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event received so far
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Log text received so far, in order
    pub fn log_lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::LogLine(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Progress snapshots received so far, in order
    pub fn progress(&self) -> Vec<ProgressState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Progress(state) => Some(state),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for MemorySink {
    fn emit(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
