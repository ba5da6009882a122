//! Error types for product-img-dl
//!
//! Errors fall into two tiers:
//! - **Known failures** are domain-expected and user-actionable (retries exhausted,
//!   no image link on a page, download target already present). Their message is
//!   meant to be shown verbatim.
//! - **Unexpected failures** (malformed embedded data, I/O outside the anticipated
//!   paths, client construction problems) are reported with full diagnostic detail.
//!
//! Cancellation is neither: it propagates as [`Error::Cancelled`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for product-img-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for product-img-dl
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP call failed on every allowed attempt
    #[error("Error calling : {url}\n{message} {body}")]
    Http {
        /// Target URL of the request
        url: String,
        /// Message of the last underlying failure
        message: String,
        /// Response body read from the last failed attempt (empty if unavailable)
        body: String,
        /// Number of attempts made
        attempts: u32,
    },

    /// No extraction strategy found an image link on the page
    #[error("Failed to locate image link on {url} (page saved to {diagnostic_path})")]
    ExtractionFailed {
        /// Page URL the HTML was fetched from
        url: String,
        /// Where the failing HTML was written for inspection
        diagnostic_path: PathBuf,
    },

    /// Download destination already exists and collisions are not allowed
    #[error("file already exists: {path}")]
    FileExists {
        /// The existing file that was left untouched
        path: PathBuf,
    },

    /// Input record is unusable (e.g. the URL carries no product identifier)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "output_dir")
        key: Option<String>,
    },

    /// Embedded image JSON was found but did not have the expected shape
    #[error("embedded image data is malformed: {0}")]
    EmbeddedFormat(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error outside the retried request path (client setup, bad request)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation was cancelled by the caller
    #[error("operation cancelled")]
    Cancelled,

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Which tier an [`Error`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Domain-expected failure; show the message as-is
    Known,
    /// Anything else; report with full detail
    Unexpected,
    /// Cooperative cancellation
    Cancelled,
}

impl Error {
    /// Classify the error into known / unexpected / cancelled
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http { .. }
            | Error::ExtractionFailed { .. }
            | Error::FileExists { .. }
            | Error::InvalidInput(_)
            | Error::Config { .. } => ErrorKind::Known,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::EmbeddedFormat(_)
            | Error::Io(_)
            | Error::Network(_)
            | Error::Serialization(_)
            | Error::Other(_) => ErrorKind::Unexpected,
        }
    }

    /// Shorthand for `kind() == ErrorKind::Known`
    pub fn is_known(&self) -> bool {
        self.kind() == ErrorKind::Known
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &str {
        match self {
            Error::Http { .. } => "http_failed",
            Error::ExtractionFailed { .. } => "extraction_failed",
            Error::FileExists { .. } => "file_exists",
            Error::InvalidInput(_) => "invalid_input",
            Error::Config { .. } => "config_error",
            Error::EmbeddedFormat(_) => "embedded_format",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::Cancelled => "cancelled",
            Error::Other(_) => "internal_error",
        }
    }

    /// Render the error for a log sink
    ///
    /// Known failures and cancellation use their display message. Unexpected
    /// failures include the debug form and the full `source()` chain.
    pub fn report(&self) -> String {
        if self.kind() != ErrorKind::Unexpected {
            return self.to_string();
        }

        let mut out = format!("{self}\n{self:?}");
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(&format!("\ncaused by: {cause}"));
            source = cause.source();
        }
        out
    }
}
