//! Log and progress sinks
//!
//! The job reports through two narrow capabilities instead of writing to a UI or
//! a global logger. Any thread-affinity concerns (marshaling onto a GUI thread)
//! belong to the sink implementation, not to the job.

use crate::types::{Event, Severity};
use tokio::sync::broadcast;

/// Receives human-readable log lines
pub trait LogSink: Send + Sync {
    /// Record one message
    fn log(&self, message: &str, severity: Severity);
}

/// Receives overall progress as a percentage
pub trait ProgressSink: Send + Sync {
    /// Report progress (0 to 100)
    fn set_progress(&self, percent: u8);
}

impl<F> LogSink for F
where
    F: Fn(&str, Severity) + Send + Sync,
{
    fn log(&self, message: &str, severity: Severity) {
        self(message, severity)
    }
}

impl<F> ProgressSink for F
where
    F: Fn(u8) + Send + Sync,
{
    fn set_progress(&self, percent: u8) {
        self(percent)
    }
}

/// Forwards log lines to `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => tracing::error!(severity = ?severity, "{message}"),
            _ => tracing::info!(severity = ?severity, "{message}"),
        }
    }
}

impl ProgressSink for TracingSink {
    fn set_progress(&self, percent: u8) {
        tracing::debug!(percent, "progress");
    }
}

/// Discards progress updates
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn set_progress(&self, _percent: u8) {}
}

/// Broadcasts log lines and progress as [`Event`]s
///
/// Multiple subscribers are supported. Sending never blocks the job; events are
/// dropped when nobody is subscribed.
#[derive(Clone, Debug)]
pub struct EventSink {
    event_tx: broadcast::Sender<Event>,
}

impl EventSink {
    /// Create a sink buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        Self { event_tx }
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: Event) {
        // No receivers is fine
        self.event_tx.send(event).ok();
    }
}

impl Default for EventSink {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl LogSink for EventSink {
    fn log(&self, message: &str, severity: Severity) {
        self.emit(Event::Log {
            message: message.to_string(),
            severity,
        });
    }
}

impl ProgressSink for EventSink {
    fn set_progress(&self, percent: u8) {
        self.emit(Event::Progress { percent });
    }
}
