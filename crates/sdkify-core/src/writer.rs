//! Persisting emitted descriptors

use crate::errors::MigrateError;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace the legacy descriptor on disk
    #[default]
    Persist,
    /// Leave the file system untouched; the caller displays the text
    Preview,
}

impl WriteMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            WriteMode::Preview
        } else {
            WriteMode::Persist
        }
    }
}

/// Replace `path` with `text`.
///
/// The text goes to a temporary file in the same directory first and is then
/// renamed over the original, so readers only ever see the old or the new file.
pub fn commit(path: &Path, text: &str) -> Result<(), MigrateError> {
    let write_error = |source: std::io::Error| MigrateError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    // The temp file is created 0600; keep whatever mode the original had.
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_error)?;
    }
    temp.write_all(text.as_bytes()).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;

    debug!(project = %path.display(), "Wrote {} bytes", text.len());
    Ok(())
}
