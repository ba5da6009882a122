//! Recording sinks and assertions over what a job reported

use product_img_dl::{LogSink, ProgressSink, Severity};
use std::path::Path;
use std::sync::Mutex;

/// Sink that records every log line and progress value in order
#[derive(Debug, Default)]
pub struct Recorder {
    lines: Mutex<Vec<(String, Severity)>>,
    progress: Mutex<Vec<u8>>,
}

impl Recorder {
    /// Log lines so far
    pub fn lines(&self) -> Vec<(String, Severity)> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Progress values so far
    pub fn progress(&self) -> Vec<u8> {
        self.progress.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Messages logged with `severity`
    pub fn messages_with(&self, severity: Severity) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(_, s)| *s == severity)
            .map(|(m, _)| m)
            .collect()
    }
}

impl LogSink for Recorder {
    fn log(&self, message: &str, severity: Severity) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((message.to_string(), severity));
    }
}

impl ProgressSink for Recorder {
    fn set_progress(&self, percent: u8) {
        self.progress
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(percent);
    }
}

/// Assert that `dir` contains exactly the files named in `expected`
pub fn assert_dir_files(dir: &Path, expected: &[&str]) {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", dir.display()))
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    expected.sort();

    assert_eq!(names, expected, "files in {}", dir.display());
}
