//! # product-img-dl
//!
//! Resilient product image fetch pipeline: fetch each product page over HTTP with
//! bounded retry, find the high resolution image link through an ordered chain of
//! extraction strategies, and download the image to local storage, one item at a
//! time.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - No CLI or UI; callers supply input records and sinks
//! - **Explicit collaborators** - Config, HTTP client and sinks are parameters, never globals
//! - **Fail fast** - The first error ends the run; nothing already saved is touched
//! - **Cooperative cancellation** - One `CancellationToken` reaches every wait
//!
//! ## Quick Start
//!
//! ```no_run
//! use product_img_dl::{BatchDownloadJob, Config, InputRecord, TracingSink};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         output_dir: "images".into(),
//!         ..Default::default()
//!     };
//!     let sink = Arc::new(TracingSink);
//!     let mut job = BatchDownloadJob::from_config(config, sink.clone(), sink)?;
//!
//!     let inputs = vec![InputRecord::new("https://shop.example/dp/B000ABC123", "img_")];
//!     let report = job.run(&inputs, &CancellationToken::new()).await?;
//!     println!("saved {} images", report.downloaded.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Image link extraction strategies
pub mod extract;
/// Retrying HTTP client
pub mod http;
/// Batch download job
pub mod job;
/// Fixed-delay retry with cancellation
pub mod retry;
/// Log and progress sinks
pub mod sinks;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{Config, DiagnosticsConfig, FileCollisionAction, HttpConfig};
pub use error::{Error, ErrorKind, Result};
pub use extract::{
    AttributeStrategy, EmbeddedJsonStrategy, ExtractionStrategy, ImageLinkExtractor,
};
pub use http::{HttpClient, HttpRequest, RequestBody};
pub use job::BatchDownloadJob;
pub use sinks::{EventSink, LogSink, NoProgress, ProgressSink, TracingSink};
pub use types::{Event, InputRecord, JobReport, JobState, JobStatus, Severity};

use tokio_util::sync::CancellationToken;

/// Cancel `token` when the process receives a termination signal
///
/// - **Unix:** SIGTERM or SIGINT.
/// - **Windows/other:** Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// Returns without cancelling if `token` is cancelled by someone else first.
///
/// # Example
///
/// ```no_run
/// use product_img_dl::cancel_on_signal;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let cancel = CancellationToken::new();
/// tokio::spawn(cancel_on_signal(cancel.clone()));
/// # }
/// ```
pub async fn cancel_on_signal(token: CancellationToken) {
    tokio::select! {
        _ = token.cancelled() => {}
        _ = wait_for_signal() => {
            tracing::info!("cancelling job");
            token.cancel();
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C signal");
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
    }
}
