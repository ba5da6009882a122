//! Test configuration helpers for building jobs against a temporary directory

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use product_img_dl::{BatchDownloadJob, Config, DiagnosticsConfig, HttpConfig};

use super::assertions::Recorder;

/// Config writing into `temp`, with short retry delays and no inter-item pause
pub fn test_config(temp: &TempDir) -> Config {
    Config {
        output_dir: temp.path().join("images"),
        http: HttpConfig {
            max_attempts: 1,
            retry_delay: Duration::from_millis(10),
            timeout: Duration::from_secs(5),
            ..Default::default()
        },
        diagnostics: DiagnosticsConfig {
            failed_page_path: temp.path().join("failed.html"),
            open_failed_page: false,
        },
        ..Default::default()
    }
}

/// Build a job whose log and progress go to a fresh [`Recorder`]
pub fn recorded_job(config: Config) -> (BatchDownloadJob, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let job = BatchDownloadJob::from_config(config, recorder.clone(), recorder.clone())
        .unwrap_or_else(|e| panic!("failed to build job: {e}"));
    (job, recorder)
}
