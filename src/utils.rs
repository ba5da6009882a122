//! Utility functions for string slicing, identifiers and path handling

use crate::config::FileCollisionAction;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Return the text strictly between the first `start` and the next `end` after it
///
/// Returns `None` when either marker is missing. An empty `end` returns the rest
/// of the text after `start`.
///
/// # Examples
///
/// ```
/// use product_img_dl::utils::text_between;
///
/// assert_eq!(text_between("a[b]c", "[", "]"), Some("b"));
/// assert_eq!(text_between("a[b]c", "<", ">"), None);
/// assert_eq!(text_between("key=value", "key=", ""), Some("value"));
/// ```
#[must_use]
pub fn text_between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let rest = &text[from..];
    if end.is_empty() {
        return Some(rest);
    }
    let to = rest.find(end)?;
    Some(&rest[..to])
}

/// Derive the product identifier from an item URL
///
/// Takes the text after the first occurrence of `marker`, stops at the next path
/// separator, query or fragment, and percent-decodes it.
///
/// # Examples
///
/// ```
/// use product_img_dl::utils::derive_identifier;
///
/// let id = derive_identifier("https://shop.example/dp/B000ABC123/ref=sr_1?th=1", "/dp/").unwrap();
/// assert_eq!(id, "B000ABC123");
/// ```
pub fn derive_identifier(url: &str, marker: &str) -> Result<String> {
    let rest = text_between(url, marker, "").ok_or_else(|| {
        Error::InvalidInput(format!(
            "URL '{url}' does not contain the identifier marker '{marker}'"
        ))
    })?;

    let raw = rest.split(['/', '?', '#']).next().unwrap_or_default();

    let identifier = urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string());

    if identifier.trim().is_empty() {
        return Err(Error::InvalidInput(format!(
            "URL '{url}' has no identifier after '{marker}'"
        )));
    }
    if identifier.contains(['/', '\\']) {
        return Err(Error::InvalidInput(format!(
            "identifier '{identifier}' from '{url}' contains a path separator"
        )));
    }

    Ok(identifier)
}

/// Resolve an extracted image link against the page it came from
///
/// Absolute links are returned unchanged; relative and protocol-relative links are
/// joined onto `page_url`.
pub fn resolve_image_url(page_url: &str, link: &str) -> Result<String> {
    if link.starts_with("http://") || link.starts_with("https://") {
        return Ok(link.to_string());
    }

    let base = url::Url::parse(page_url)
        .map_err(|e| Error::InvalidInput(format!("invalid page URL '{page_url}': {e}")))?;
    let resolved = base
        .join(link)
        .map_err(|e| Error::InvalidInput(format!("cannot resolve image link '{link}': {e}")))?;
    Ok(resolved.to_string())
}

/// Get the path to write a file to, handling collisions according to `action`
///
/// # Returns
///
/// For `Fail`, the original path, or [`Error::FileExists`] if it already exists.
/// For `Overwrite`, the original path unchanged.
/// For `Rename`, the first free `name (n).ext` variant.
pub fn get_unique_path(path: &Path, action: FileCollisionAction) -> Result<PathBuf> {
    match action {
        FileCollisionAction::Overwrite => Ok(path.to_path_buf()),
        FileCollisionAction::Fail => {
            if path.exists() {
                return Err(Error::FileExists {
                    path: path.to_path_buf(),
                });
            }
            Ok(path.to_path_buf())
        }
        FileCollisionAction::Rename => {
            if !path.exists() {
                return Ok(path.to_path_buf());
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
                Error::InvalidInput(format!("cannot extract file stem from {}", path.display()))
            })?;
            let extension = path.extension().and_then(|e| e.to_str());
            let parent = path.parent().unwrap_or_else(|| Path::new(""));

            for i in 1..=MAX_RENAME_ATTEMPTS {
                let new_name = match extension {
                    Some(ext) => format!("{} ({}).{}", stem, i, ext),
                    None => format!("{} ({})", stem, i),
                };
                let new_path = parent.join(new_name);
                if !new_path.exists() {
                    return Ok(new_path);
                }
            }

            Err(Error::FileExists {
                path: path.to_path_buf(),
            })
        }
    }
}
