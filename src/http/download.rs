//! Streaming downloads to local files.

use super::{AttemptError, HttpClient, into_error, read_diagnostic_body};
use crate::config::FileCollisionAction;
use crate::error::{Error, Result};
use crate::retry::with_retry;
use crate::utils::get_unique_path;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

impl HttpClient {
    /// Download `url` into a new file at `destination`
    ///
    /// The file is created before any request is made and creation fails if the
    /// path already exists, so an earlier download is never clobbered. The response
    /// is fetched under the client's retry policy and streamed chunk by chunk.
    ///
    /// # Returns
    ///
    /// Number of bytes written.
    ///
    /// # Errors
    ///
    /// - [`Error::FileExists`] if `destination` exists; the file is left untouched.
    /// - [`Error::Http`] if the image could not be fetched or the transfer broke off.
    /// - [`Error::Cancelled`] if `cancel` fires first.
    ///
    /// On any error after the file was created, the partial file is removed.
    pub async fn download(
        &self,
        url: &str,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        self.download_with(url, destination, FileCollisionAction::Fail, cancel)
            .await
            .map(|(_, written)| written)
    }

    /// Download `url` to `destination`, resolving collisions with `action`
    ///
    /// Returns the path actually written (differs from `destination` for
    /// [`FileCollisionAction::Rename`]) and the number of bytes written.
    ///
    /// With [`FileCollisionAction::Overwrite`] the body is streamed into a sibling
    /// `.part` file that replaces `destination` only once the transfer completed,
    /// so a failed download leaves the existing file as it was.
    pub async fn download_with(
        &self,
        url: &str,
        destination: &Path,
        action: FileCollisionAction,
        cancel: &CancellationToken,
    ) -> Result<(PathBuf, u64)> {
        let target = get_unique_path(destination, action)?;
        let staging = match action {
            FileCollisionAction::Overwrite => part_path(&target),
            FileCollisionAction::Fail | FileCollisionAction::Rename => target.clone(),
        };
        let mut file = open_target(&staging, action).await?;

        tracing::debug!(url = %url, path = %staging.display(), "downloading");

        let result = self.stream_into(url, &mut file, cancel).await;
        drop(file);

        let written = match result {
            Ok(written) => written,
            Err(e) => {
                remove_partial(&staging).await;
                return Err(e);
            }
        };

        if staging != target
            && let Err(e) = tokio::fs::rename(&staging, &target).await
        {
            remove_partial(&staging).await;
            return Err(Error::Io(e));
        }

        tracing::info!(
            url = %url,
            path = %target.display(),
            bytes = written,
            "download complete"
        );
        Ok((target, written))
    }

    async fn stream_into(
        &self,
        url: &str,
        file: &mut File,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let policy = self.policy_for(None);
        let mut response = with_retry(&policy, cancel, || self.fetch_success(url))
            .await
            .map_err(|e| into_error(url, e))?;

        let mut written: u64 = 0;
        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                chunk = response.chunk() => chunk,
            };

            match chunk {
                Ok(Some(bytes)) => {
                    file.write_all(&bytes).await?;
                    written += bytes.len() as u64;
                }
                Ok(None) => break,
                Err(e) => {
                    return Err(Error::Http {
                        url: url.to_string(),
                        message: format!("transfer interrupted after {written} bytes: {e}"),
                        body: String::new(),
                        attempts: 1,
                    });
                }
            }
        }

        file.flush().await?;
        Ok(written)
    }

    /// GET `url`, treating any non-success status as a failed attempt
    ///
    /// Unlike [`send`](HttpClient::send), error statuses are never accepted here:
    /// an error page must not be saved as an image.
    async fn fetch_success(
        &self,
        url: &str,
    ) -> std::result::Result<reqwest::Response, AttemptError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(AttemptError::Transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(AttemptError::Status {
            status,
            body: read_diagnostic_body(response).await,
        })
    }
}

/// Sibling file an overwriting download is staged in
fn part_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "failed to remove partial download"
        );
    }
}

async fn open_target(path: &Path, action: FileCollisionAction) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    match action {
        // Staging file; a leftover from an interrupted run is replaced
        FileCollisionAction::Overwrite => options.create(true).truncate(true),
        FileCollisionAction::Fail | FileCollisionAction::Rename => options.create_new(true),
    };

    options.open(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            Error::FileExists {
                path: path.to_path_buf(),
            }
        } else {
            Error::Io(e)
        }
    })
}
