//! Event channel implementation using crossbeam-channel.
//!
//! Provides a thread-safe way to send events from the scan worker
//! to any UI layer.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::{Event, ProgressSink};

/// Sends events from the core library.
///
/// This is a thin wrapper around crossbeam's Sender that can be
/// cloned and sent across threads.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event. Never blocks: the channel is unbounded.
    ///
    /// If the receiver is dropped, the event is silently discarded.
    /// This allows progress reporting to be optional.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

impl ProgressSink for EventSender {
    fn emit(&self, event: Event) {
        self.send(event);
    }
}

/// Receives events from the core library.
///
/// Used by UI layers to subscribe to progress updates.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event is received
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Returns an iterator over received events
    ///
    /// Ends once every sender has been dropped.
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }

    /// Drain everything currently queued without blocking
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }
}

/// A one-directional event channel from the scan worker to a UI layer.
///
/// The channel is unbounded so the worker never waits on a slow consumer
/// and no log line is ever dropped.
pub struct EventChannel;

impl EventChannel {
    /// Create a new event channel.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A no-op event sender for when you don't need progress reporting.
///
/// This is useful for tests or when running without a UI.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ProgressState;
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.set_progress(ProgressState::new(25, 100));
        });

        handle.join().unwrap();

        match receiver.recv().unwrap() {
            Event::Progress(p) => assert_eq!(p.percent(), 25),
            other => panic!("Wrong event type: {:?}", other),
        }
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.log_line("nobody is listening".to_string());
        // Should not panic even though no one is receiving
    }

    #[test]
    fn log_lines_arrive_in_order() {
        let (sender, receiver) = EventChannel::new();

        for i in 0..100 {
            sender.log_line(format!("line {}", i));
        }
        drop(sender);

        let lines: Vec<String> = receiver
            .iter()
            .filter_map(|event| match event {
                Event::LogLine(text) => Some(text),
                _ => None,
            })
            .collect();

        assert_eq!(lines.len(), 100);
        assert_eq!(lines[0], "line 0");
        assert_eq!(lines[99], "line 99");
    }

    #[test]
    fn drain_does_not_block_on_empty_channel() {
        let (_sender, receiver) = EventChannel::new();
        assert!(receiver.drain().is_empty());
        assert!(receiver.try_recv().is_none());
    }
}
