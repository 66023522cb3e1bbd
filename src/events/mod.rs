//! # Events Module
//!
//! Event-driven architecture for GUI-ready progress reporting.
//!
//! ## Design
//! The scan worker emits tagged events through a [`ProgressSink`], allowing any
//! UI (CLI, GUI, web) to subscribe and display progress. The usual sink is
//! the sending half of an [`EventChannel`].
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! // In a separate thread, listen for events
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::LogLine(text) => println!("{}", text),
//!             Event::Progress(p) => println!("{}%", p.percent()),
//!             _ => {}
//!         }
//!     }
//! });
//!
//! // Run the scan with the sender
//! coordinator.run_with_events(&sender)?;
//! ```

mod channel;
mod sink;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use sink::{MemorySink, ProgressSink};
pub use types::*;
