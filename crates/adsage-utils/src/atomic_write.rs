//! Atomic artifact writes.
//!
//! Run artifacts (insights, creatives, report) are written to a temporary file
//! in the destination directory, fsynced, then renamed over the target so a
//! reader never observes a half-written document.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

/// Write `content` to `path` atomically, creating parent directories.
///
/// Line endings are normalized to LF.
pub fn write_file_atomic(path: &Utf8Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create parent directory: {parent}"))?;

    let mut temp_file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in: {parent}"))?;

    temp_file
        .write_all(normalize_line_endings(content).as_bytes())
        .context("Failed to write content to temporary file")?;
    temp_file
        .as_file()
        .sync_all()
        .context("Failed to fsync temporary file")?;

    temp_file
        .persist(path.as_std_path())
        .map_err(|e| anyhow::anyhow!(e.error))
        .with_context(|| format!("Failed to atomically write file: {path}"))?;

    Ok(())
}

/// Serialize `value` as pretty JSON and write it atomically.
pub fn write_json_atomic<T: serde::Serialize + ?Sized>(path: &Utf8Path, value: &T) -> Result<()> {
    let mut rendered = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize JSON for {path}"))?;
    rendered.push('\n');
    write_file_atomic(path, &rendered)
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}
