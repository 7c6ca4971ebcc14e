use crate::error::{Error, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Writes the finished document with all-or-nothing semantics.
pub(crate) struct Writer;

impl Writer {
    /// Writes a file atomically.
    ///
    /// # Process
    ///
    /// 1. Writes content to a temporary file next to the target
    /// 2. Syncs the temporary file to disk
    /// 3. Renames the temporary file over the target path
    ///
    /// On failure the temporary file is removed and the target is left
    /// untouched.
    pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
        let temp_path = Self::temp_path(path)?;

        let result = Self::write_temp(&temp_path, content)
            .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        } else {
            debug!("Wrote {} bytes to {}", content.len(), path.display());
        }

        result
    }

    fn write_temp(temp_path: &Path, content: &[u8]) -> Result<()> {
        let mut temp_file = fs::File::create(temp_path).map_err(|e| Error::io(temp_path, e))?;

        temp_file
            .write_all(content)
            .map_err(|e| Error::io(temp_path, e))?;

        temp_file.sync_all().map_err(|e| Error::io(temp_path, e))
    }

    pub(crate) fn temp_path(path: &Path) -> Result<PathBuf> {
        let filename = path
            .file_name()
            .ok_or_else(|| Error::config(format!("Invalid output path: {}", path.display())))?
            .to_string_lossy();

        Ok(path.with_file_name(format!(".{filename}.tmp")))
    }
}
