//! Configuration types for product-img-dl
//!
//! Configuration is read-only to the pipeline and handed to the job at
//! construction. Loading and saving it is left to the embedding application; the
//! types derive serde so any format works.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::PathBuf, time::Duration};

/// HTTP layer configuration (attempts, retry delay, client settings)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Maximum number of attempts per request (default: 1 = no retry)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts (default: 2000 ms)
    #[serde(default = "default_retry_delay", with = "millis_serde")]
    pub retry_delay: Duration,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Treat any status code as success as long as the body could be read
    /// (default: false = non-2xx statuses are failed attempts)
    ///
    /// When enabled, an error page such as a 404 is handed to extraction like any
    /// other page; if it has no image link it is saved as the diagnostic page and
    /// the job fails with [`Error::ExtractionFailed`]. When disabled, the same page
    /// is retried and ends as [`Error::Http`] carrying the body, and no diagnostic
    /// page is written. Image downloads never accept error statuses.
    #[serde(default)]
    pub accept_error_status: bool,

    /// Extra headers sent with every request
    #[serde(default)]
    pub default_headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay: default_retry_delay(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            accept_error_status: false,
            default_headers: HashMap::new(),
        }
    }
}

/// Where a page that yielded no image link is written for inspection
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Path of the diagnostic HTML file (default: "failed.html")
    #[serde(default = "default_failed_page_path")]
    pub failed_page_path: PathBuf,

    /// Open the diagnostic file with the platform opener after writing it
    /// (default: false)
    #[serde(default)]
    pub open_failed_page: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            failed_page_path: default_failed_page_path(),
            open_failed_page: false,
        }
    }
}

/// How to handle a download target that already exists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCollisionAction {
    /// Fail the download and leave the existing file untouched (default)
    #[default]
    Fail,
    /// Replace the existing file
    Overwrite,
    /// Append (1), (2), etc. to the filename
    Rename,
}

/// Main configuration for a batch download job
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Directory images are saved to (default: "./downloads")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Pause after each item (default: 0 = no delay)
    #[serde(default, with = "duration_serde")]
    pub inter_item_delay: Duration,

    /// Substring in the item URL that precedes the product identifier (default: "/dp/")
    #[serde(default = "default_identifier_marker")]
    pub identifier_marker: String,

    /// Extension of saved image files, without the dot (default: "jpg")
    #[serde(default = "default_image_extension")]
    pub image_extension: String,

    /// Download target collision handling
    #[serde(default)]
    pub file_collision: FileCollisionAction,

    /// HTTP layer settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Diagnostic output on extraction failure
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            inter_item_delay: Duration::ZERO,
            identifier_marker: default_identifier_marker(),
            image_extension: default_image_extension(),
            file_collision: FileCollisionAction::default(),
            http: HttpConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl Config {
    /// Check settings that would make every item fail
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "output directory must not be empty".to_string(),
                key: Some("output_dir".to_string()),
            });
        }
        if self.identifier_marker.is_empty() {
            return Err(Error::Config {
                message: "identifier marker must not be empty".to_string(),
                key: Some("identifier_marker".to_string()),
            });
        }
        if self.image_extension.is_empty() || self.image_extension.contains(['/', '\\', '.']) {
            return Err(Error::Config {
                message: format!("invalid image extension '{}'", self.image_extension),
                key: Some("image_extension".to_string()),
            });
        }
        if self.diagnostics.failed_page_path.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "diagnostic page path must not be empty".to_string(),
                key: Some("diagnostics.failed_page_path".to_string()),
            });
        }
        for name in self.http.default_headers.keys() {
            if reqwest::header::HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(Error::Config {
                    message: format!("invalid header name '{name}'"),
                    key: Some("http.default_headers".to_string()),
                });
            }
        }
        Ok(())
    }
}

fn default_max_attempts() -> u32 {
    1
}

fn default_retry_delay() -> Duration {
    Duration::from_millis(2000)
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36".to_string()
}

fn default_failed_page_path() -> PathBuf {
    PathBuf::from("failed.html")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_identifier_marker() -> String {
    "/dp/".to_string()
}

fn default_image_extension() -> String {
    "jpg".to_string()
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds)
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config: Config = serde_json::from_str("{}").expect("deserialize failed");

        assert_eq!(config.output_dir, PathBuf::from("./downloads"));
        assert_eq!(config.inter_item_delay, Duration::ZERO);
        assert_eq!(config.identifier_marker, "/dp/");
        assert_eq!(config.image_extension, "jpg");
        assert_eq!(config.file_collision, FileCollisionAction::Fail);
        assert_eq!(config.http.max_attempts, 1);
        assert_eq!(config.http.retry_delay, Duration::from_millis(2000));
        assert!(!config.http.accept_error_status);
        assert_eq!(
            config.diagnostics.failed_page_path,
            PathBuf::from("failed.html")
        );
    }

    #[test]
    fn delays_use_seconds_and_retry_delay_uses_millis() {
        let json = r#"{
            "output_dir": "/tmp/out",
            "inter_item_delay": 3,
            "file_collision": "rename",
            "http": { "max_attempts": 4, "retry_delay": 250 }
        }"#;
        let config: Config = serde_json::from_str(json).expect("deserialize failed");

        assert_eq!(config.inter_item_delay, Duration::from_secs(3));
        assert_eq!(config.file_collision, FileCollisionAction::Rename);
        assert_eq!(config.http.max_attempts, 4);
        assert_eq!(config.http.retry_delay, Duration::from_millis(250));

        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["inter_item_delay"], 3);
        assert_eq!(back["http"]["retry_delay"], 250);
    }

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn validate_rejects_empty_marker() {
        let config = Config {
            identifier_marker: String::new(),
            ..Default::default()
        };
        match config.validate() {
            Err(Error::Config { key, .. }) => {
                assert_eq!(key.as_deref(), Some("identifier_marker"))
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_extension_with_separator() {
        let config = Config {
            image_extension: "../jpg".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_header_name() {
        let mut config = Config::default();
        config
            .http
            .default_headers
            .insert("bad header".to_string(), "x".to_string());
        assert!(config.validate().is_err());
    }
}
