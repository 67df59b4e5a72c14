//! Channel type definitions for run events
//!
//! A run publishes `RunEvent`s on a broadcast channel so any number of
//! observers (a console renderer, a test, a log sink) can follow it.

use tokio::sync::broadcast;

use crate::core::RunEvent;

/// Default buffer size for the event broadcast channel
pub const EVENT_CHANNEL_SIZE: usize = 256;

/// Sender half of the event channel (held by the run)
pub type EventSender = broadcast::Sender<RunEvent>;

/// Receiver half of the event channel (used by subscribers)
pub type EventReceiver = broadcast::Receiver<RunEvent>;

/// Create a new event broadcast channel with the default capacity
///
/// Receivers are created by calling `sender.subscribe()`.
pub fn create_event_channel() -> EventSender {
    create_event_channel_with_capacity(EVENT_CHANNEL_SIZE)
}

/// Create a new event broadcast channel with a custom capacity
pub fn create_event_channel_with_capacity(capacity: usize) -> EventSender {
    let (tx, _) = broadcast::channel(capacity.max(1));
    tx
}

/// Publish an event
///
/// Returns the number of subscribers that received it. Having no
/// subscribers is not an error.
pub fn emit(tx: &EventSender, event: RunEvent) -> usize {
    tx.send(event).unwrap_or(0)
}
