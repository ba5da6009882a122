//! Sequential batch download job
//!
//! For every [`InputRecord`] the job fetches the product page, finds the image link
//! and downloads the image, reporting progress and log lines to the configured sinks.
//! The first error ends the run.
//!
//! - [`diagnostics`] - Saving (and optionally opening) the page extraction failed on

pub mod diagnostics;

use crate::config::Config;
use crate::error::{Error, ErrorKind, Result};
use crate::extract::ImageLinkExtractor;
use crate::http::HttpClient;
use crate::sinks::{LogSink, ProgressSink};
use crate::types::{InputRecord, JobReport, JobState, JobStatus, Severity};
use crate::utils::{derive_identifier, resolve_image_url};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Overall progress after finishing item `index` (zero-based) of `total`
///
/// Rounds up so the last item always reports 100.
pub fn progress_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = ((index + 1) * 100).div_ceil(total).min(100);
    percent as u8
}

/// Downloads one product image per input record, strictly in order
pub struct BatchDownloadJob {
    config: Config,
    client: HttpClient,
    extractor: ImageLinkExtractor,
    log: Arc<dyn LogSink>,
    progress: Arc<dyn ProgressSink>,
    state: JobState,
}

impl BatchDownloadJob {
    /// Create a job from its collaborators
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `config` fails validation.
    pub fn new(
        config: Config,
        client: HttpClient,
        extractor: ImageLinkExtractor,
        log: Arc<dyn LogSink>,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client,
            extractor,
            log,
            progress,
            state: JobState::default(),
        })
    }

    /// Create a job with an HTTP client built from `config.http` and the default
    /// extraction chain
    pub fn from_config(
        config: Config,
        log: Arc<dyn LogSink>,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<Self> {
        let client = HttpClient::new(config.http.clone())?;
        Self::new(config, client, ImageLinkExtractor::default(), log, progress)
    }

    /// State of the current or most recent run
    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Job configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process `inputs` in order
    ///
    /// Each call starts from a fresh [`JobState`]. Files downloaded before a failure
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; the state is left `Aborted` with
    /// `last_error` set. Cancellation through `cancel` yields [`Error::Cancelled`].
    pub async fn run(
        &mut self,
        inputs: &[InputRecord],
        cancel: &CancellationToken,
    ) -> Result<JobReport> {
        self.state = JobState {
            total: inputs.len(),
            status: JobStatus::Running,
            ..Default::default()
        };
        let started_at = Utc::now();

        tracing::info!(
            total = inputs.len(),
            output_dir = %self.config.output_dir.display(),
            "job started"
        );

        match self.process_all(inputs, cancel).await {
            Ok(downloaded) => {
                self.state.current_index = inputs.len();
                self.state.status = JobStatus::Completed;
                self.log.log("Completed", Severity::Success);
                tracing::info!(downloaded = downloaded.len(), "job completed");

                Ok(JobReport {
                    total: inputs.len(),
                    downloaded,
                    started_at,
                    finished_at: Utc::now(),
                })
            }
            Err(e) => {
                self.report_failure(&e);
                self.state.last_error = Some(e.to_string());
                self.state.status = JobStatus::Aborted;
                Err(e)
            }
        }
    }

    async fn process_all(
        &mut self,
        inputs: &[InputRecord],
        cancel: &CancellationToken,
    ) -> Result<Vec<PathBuf>> {
        self.log.log("Reading inputs", Severity::Normal);
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let total = inputs.len();
        let mut downloaded = Vec::with_capacity(total);

        for (index, record) in inputs.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            self.state.current_index = index;
            self.progress.set_progress(progress_percent(index, total));

            let path = self.process_item(index, total, record, cancel).await?;
            downloaded.push(path);

            self.pause(cancel).await?;
        }

        Ok(downloaded)
    }

    async fn process_item(
        &self,
        index: usize,
        total: usize,
        record: &InputRecord,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let identifier = derive_identifier(&record.url, &self.config.identifier_marker)?;
        self.log.log(
            &format!("Working on input {}/{} : {}", index + 1, total, identifier),
            Severity::Normal,
        );

        let html = self.client.get_html(&record.url, cancel).await?;

        let Some(link) = self.extractor.extract(&html)? else {
            return Err(self.keep_failed_page(&record.url, &html).await);
        };
        let image_url = resolve_image_url(&record.url, &link)?;

        let destination = self.config.output_dir.join(format!(
            "{}{}.{}",
            record.prefix, identifier, self.config.image_extension
        ));
        let (saved, bytes) = self
            .client
            .download_with(&image_url, &destination, self.config.file_collision, cancel)
            .await?;

        tracing::debug!(identifier = %identifier, image_url = %image_url, bytes, "item done");
        self.log
            .log(&format!("Saved {}", saved.display()), Severity::Success);
        Ok(saved)
    }

    /// Save the page for inspection and build the extraction error
    async fn keep_failed_page(&self, url: &str, html: &str) -> Error {
        let path = self.config.diagnostics.failed_page_path.clone();

        if let Err(e) = diagnostics::save_failed_page(&path, html).await {
            return e;
        }
        self.log.log(
            &format!("Page without image link saved to {}", path.display()),
            Severity::Error,
        );

        if self.config.diagnostics.open_failed_page {
            self.log
                .log(&format!("Opening {}", path.display()), Severity::Command);
            if let Err(e) = diagnostics::open_in_viewer(&path) {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to open diagnostic page"
                );
            }
        }

        Error::ExtractionFailed {
            url: url.to_string(),
            diagnostic_path: path,
        }
    }

    async fn pause(&self, cancel: &CancellationToken) -> Result<()> {
        let delay = self.config.inter_item_delay;
        if delay.is_zero() {
            return Ok(());
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    fn report_failure(&self, error: &Error) {
        match error.kind() {
            ErrorKind::Known => {
                tracing::warn!(error = %error, code = error.error_code(), "job aborted");
                self.log.log(&error.to_string(), Severity::Error);
            }
            ErrorKind::Unexpected => {
                tracing::error!(error = ?error, code = error.error_code(), "job aborted");
                self.log.log(&error.report(), Severity::Error);
            }
            ErrorKind::Cancelled => {
                tracing::info!("job cancelled");
                self.log.log("Cancelled", Severity::Normal);
            }
        }
    }
}

impl std::fmt::Debug for BatchDownloadJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchDownloadJob")
            .field("config", &self.config)
            .field("extractor", &self.extractor)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
