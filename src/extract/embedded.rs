//! Gallery JSON embedded in an inline script
//!
//! Product pages carry the image gallery as a JS object literal:
//!
//! ```text
//! 'colorImages': { 'initial': [{"hiRes":"https://.../a.jpg","thumb":...},{...}]},
//! ```
//!
//! The array is cut out between two markers, closed again and parsed as JSON.

use super::ExtractionStrategy;
use crate::error::{Error, Result};
use crate::utils::text_between;
use serde_json::Value;

/// Default start marker, directly before the gallery array
pub const DEFAULT_START_MARKER: &str = "'colorImages': { 'initial': ";

/// Default end marker, closing the last gallery entry and the wrapper object
pub const DEFAULT_END_MARKER: &str = "}]},";

/// Suffix restoring the `}]` consumed by the end marker
const CLOSING: &str = "}]";

/// Reads the `hiRes` link of the first gallery entry
#[derive(Clone, Debug)]
pub struct EmbeddedJsonStrategy {
    start_marker: String,
    end_marker: String,
    field: String,
}

impl EmbeddedJsonStrategy {
    /// Strategy with custom markers and link field
    ///
    /// `end_marker` must begin with `}]` so that re-appending it yields a closed array.
    pub fn new(
        start_marker: impl Into<String>,
        end_marker: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            start_marker: start_marker.into(),
            end_marker: end_marker.into(),
            field: field.into(),
        }
    }
}

impl Default for EmbeddedJsonStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_START_MARKER, DEFAULT_END_MARKER, "hiRes")
    }
}

impl ExtractionStrategy for EmbeddedJsonStrategy {
    fn name(&self) -> &'static str {
        "embedded-json"
    }

    fn extract(&self, html: &str) -> Result<Option<String>> {
        let Some(fragment) = text_between(html, &self.start_marker, &self.end_marker) else {
            return Ok(None);
        };

        let json = format!("{fragment}{CLOSING}");
        let gallery: Value = serde_json::from_str(&json)
            .map_err(|e| Error::EmbeddedFormat(format!("gallery is not valid JSON: {e}")))?;

        let first = match &gallery {
            Value::Array(entries) => entries
                .first()
                .ok_or_else(|| Error::EmbeddedFormat("gallery array is empty".to_string()))?,
            other => {
                return Err(Error::EmbeddedFormat(format!(
                    "expected gallery array, found {}",
                    json_type(other)
                )));
            }
        };

        let Value::Object(entry) = first else {
            return Err(Error::EmbeddedFormat(format!(
                "expected gallery entry object, found {}",
                json_type(first)
            )));
        };

        match entry.get(&self.field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(link)) if link.trim().is_empty() => Ok(None),
            Some(Value::String(link)) => Ok(Some(link.trim().to_string())),
            Some(other) => Err(Error::EmbeddedFormat(format!(
                "'{}' should be a string, found {}",
                self.field,
                json_type(other)
            ))),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
