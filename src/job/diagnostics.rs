//! Saving and opening the page that extraction failed on

use crate::error::Result;
use std::path::Path;
use tokio::process::Command;

/// Write the failing page HTML to `path`, replacing any previous diagnostic
pub async fn save_failed_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, html).await?;
    Ok(())
}

/// Open `path` with the platform's default viewer without waiting for it
pub fn open_in_viewer(path: &Path) -> Result<()> {
    let mut command = opener_command(path);
    let child = command.spawn()?;
    tracing::debug!(path = %path.display(), pid = ?child.id(), "opened diagnostic page");
    Ok(())
}

#[cfg(target_os = "windows")]
fn opener_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(target_os = "macos")]
fn opener_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}
