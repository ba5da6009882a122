//! Core types for product-img-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One item to process: a product page URL and the filename prefix for its image
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Product page URL; must contain the identifier marker
    pub url: String,
    /// Prepended to the identifier to form the output filename
    #[serde(default)]
    pub prefix: String,
}

impl InputRecord {
    /// Create a new input record
    pub fn new(url: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prefix: prefix.into(),
        }
    }
}

/// Severity of a log line sent to a [`LogSink`](crate::sinks::LogSink)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Regular progress information
    #[default]
    Normal,
    /// A failure
    Error,
    /// A completed step
    Success,
    /// An action taken on the user's behalf
    Command,
}

/// Lifecycle of a batch job run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Not started
    #[default]
    Idle,
    /// Processing items
    Running,
    /// Every item was processed
    Completed,
    /// Stopped on the first unrecoverable error or cancellation
    Aborted,
}

impl JobStatus {
    /// Whether the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Aborted)
    }
}

/// Mutable state of one job run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct JobState {
    /// Number of input records
    pub total: usize,
    /// Zero-based index of the item being processed
    pub current_index: usize,
    /// Message of the error that aborted the run
    pub last_error: Option<String>,
    /// Current lifecycle state
    pub status: JobStatus,
}

/// Summary of a completed run
#[derive(Clone, Debug, Serialize)]
pub struct JobReport {
    /// Number of items processed
    pub total: usize,
    /// Files written, in input order
    pub downloaded: Vec<PathBuf>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

/// Event emitted by [`EventSink`](crate::sinks::EventSink)
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A log line
    Log {
        /// Message text
        message: String,
        /// Message severity
        severity: Severity,
    },
    /// Overall progress changed
    Progress {
        /// Percentage complete (0 to 100)
        percent: u8,
    },
}
