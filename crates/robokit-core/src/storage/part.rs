//! Temp-file writer that renames into place on finalize.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, Result};

/// Write handle for `<final>.part`. Implements `Write + Seek` so it can back a zip writer.
pub struct PartFile {
    file: Option<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
    finalized: bool,
}

impl PartFile {
    /// Create the temp file for `final_path`, creating parent directories as needed.
    /// Truncates a stale temp file left by an earlier crash.
    pub fn create(final_path: &Path) -> Result<Self> {
        if let Some(parent) = final_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ProvisionError::io(parent, e))?;
            }
        }
        let temp_path = super::temp_path(final_path);
        let file = File::options()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| ProvisionError::io(&temp_path, e))?;
        Ok(PartFile {
            file: Some(file),
            temp_path,
            final_path: final_path.to_path_buf(),
            finalized: false,
        })
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Path the file is renamed to on `finalize`.
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Flush, sync and rename the temp file over the final path. Returns the final path.
    pub fn finalize(mut self) -> Result<PathBuf> {
        if let Some(mut file) = self.file.take() {
            file.flush()
                .and_then(|_| file.sync_all())
                .map_err(|e| ProvisionError::io(&self.temp_path, e))?;
            // Closed before rename on every platform.
            drop(file);
        }
        std::fs::rename(&self.temp_path, &self.final_path)
            .map_err(|e| ProvisionError::io(&self.final_path, e))?;
        self.finalized = true;
        Ok(self.final_path.clone())
    }

    fn file_mut(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "part file already closed"))
    }
}

impl Write for PartFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file_mut()?.flush()
    }
}

impl Seek for PartFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file_mut()?.seek(pos)
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        drop(self.file.take());
        match std::fs::remove_file(&self.temp_path) {
            Ok(()) => tracing::debug!(path = %self.temp_path.display(), "removed unfinished temp file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.temp_path.display(), "failed to remove temp file: {}", e),
        }
    }
}
