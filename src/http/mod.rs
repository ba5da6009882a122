//! Retrying HTTP client
//!
//! [`HttpClient`] wraps a shared `reqwest::Client` (cookie store, gzip/deflate
//! decompression, timeout, user agent) and runs every request under the fixed-delay
//! [`RetryPolicy`](crate::retry::RetryPolicy). Failed attempts keep the response
//! body, when there was one, as diagnostic context for the final error.
//!
//! - [`request`] - Request description and builders
//! - [`download`] - Streaming a response body to a new file

mod download;
pub mod request;

pub use request::{HttpRequest, RequestBody};

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::retry::{IsRetryable, RetryError, RetryPolicy, with_retry};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio_util::sync::CancellationToken;

/// Failure of a single attempt
#[derive(Debug)]
pub(crate) enum AttemptError {
    /// The request could not be sent or the body could not be read
    Transport(reqwest::Error),
    /// The server answered with a non-success status
    Status {
        /// Response status
        status: StatusCode,
        /// Response body, empty if it could not be read
        body: String,
    },
}

impl AttemptError {
    fn body(&self) -> &str {
        match self {
            AttemptError::Transport(_) => "",
            AttemptError::Status { body, .. } => body,
        }
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Transport(e) => write!(f, "{e}"),
            AttemptError::Status { status, .. } => write!(f, "HTTP status {status}"),
        }
    }
}

impl IsRetryable for AttemptError {
    fn is_retryable(&self) -> bool {
        match self {
            // Invalid URL, method or header: every attempt would fail the same way
            AttemptError::Transport(e) => !e.is_builder(),
            AttemptError::Status { .. } => true,
        }
    }
}

/// HTTP client with bounded fixed-delay retry
///
/// Cloning is cheap; clones share the connection pool and cookie store.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Build a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for unusable default headers and
    /// [`Error::Network`] if the TLS backend cannot be initialised.
    pub fn new(config: HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::Config {
                message: format!("invalid header name '{name}': {e}"),
                key: Some("http.default_headers".to_string()),
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| Error::Config {
                message: format!("invalid value for header '{name}': {e}"),
                key: Some("http.default_headers".to_string()),
            })?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .gzip(true)
            .deflate(true)
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Wrap an existing `reqwest::Client`
    ///
    /// Only the retry settings of `config` are used; client-level settings are
    /// whatever `client` was built with.
    pub fn with_client(client: reqwest::Client, config: HttpConfig) -> Self {
        Self { client, config }
    }

    /// Configuration the client was built with
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Send a request and return the response body
    ///
    /// Attempts the request up to `request.max_attempts` (or the configured
    /// default) times, pausing `retry_delay` between attempts.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] once every attempt has failed; carries the URL, the last
    ///   failure message and the last response body, if any.
    /// - [`Error::Network`] for requests that cannot be built (invalid URL or
    ///   header); these are not retried.
    /// - [`Error::Cancelled`] if `cancel` fires first.
    pub async fn send(&self, request: HttpRequest, cancel: &CancellationToken) -> Result<String> {
        let policy = self.policy_for(request.max_attempts);

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            max_attempts = policy.attempts(),
            "sending request"
        );

        with_retry(&policy, cancel, || self.attempt(&request))
            .await
            .map_err(|e| into_error(&request.url, e))
    }

    /// GET a page and return its body
    pub async fn get_html(&self, url: &str, cancel: &CancellationToken) -> Result<String> {
        self.send(HttpRequest::get(url), cancel).await
    }

    /// POST a JSON document and return the response body
    pub async fn post_json(
        &self,
        url: &str,
        json: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        self.send(HttpRequest::post_json(url, json), cancel).await
    }

    /// POST form fields and return the response body
    pub async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> Result<String> {
        let fields = fields.iter().map(|(k, v)| (*k, *v));
        self.send(HttpRequest::post_form(url, fields), cancel).await
    }

    fn policy_for(&self, max_attempts: Option<u32>) -> RetryPolicy {
        RetryPolicy::fixed(
            max_attempts.unwrap_or(self.config.max_attempts),
            self.config.retry_delay,
        )
    }

    fn build(&self, request: &HttpRequest) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        match &request.body {
            Some(RequestBody::Json(json)) => builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(json.clone()),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder,
        }
    }

    async fn attempt(&self, request: &HttpRequest) -> std::result::Result<String, AttemptError> {
        let response = self
            .build(request)
            .send()
            .await
            .map_err(AttemptError::Transport)?;

        let status = response.status();
        if status.is_success() || self.config.accept_error_status {
            return response.text().await.map_err(AttemptError::Transport);
        }

        Err(AttemptError::Status {
            status,
            body: read_diagnostic_body(response).await,
        })
    }
}

/// Best-effort read of a failed response's body; read failures yield ""
async fn read_diagnostic_body(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_default()
}

fn into_error(url: &str, error: RetryError<AttemptError>) -> Error {
    match error {
        RetryError::Cancelled => Error::Cancelled,
        RetryError::Permanent(AttemptError::Transport(e)) => Error::Network(e),
        RetryError::Permanent(e) => Error::Http {
            url: url.to_string(),
            message: e.to_string(),
            body: e.body().to_string(),
            attempts: 1,
        },
        RetryError::Exhausted { error, attempts } => Error::Http {
            url: url.to_string(),
            message: error.to_string(),
            body: error.body().to_string(),
            attempts,
        },
    }
}
