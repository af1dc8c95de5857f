//! Artifact downloader: one blocking GET streamed straight to disk.
//!
//! The body goes to `<dest>.part` and is renamed over `dest` only after a 2xx
//! response, so a failed or interrupted download never leaves a file that a
//! later run would take as valid. No retry.

mod target;

pub use target::{DownloadTarget, DEFAULT_URL_TEMPLATE};

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::checksum::StreamDigest;
use crate::error::{ProvisionError, Result};
use crate::http::{self, HttpFailure, HttpOptions};
use crate::storage::PartFile;
use crate::version::Version;

/// What a completed download produced.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub path: PathBuf,
    pub version: Version,
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the body.
    pub sha256: String,
}

/// Downloads `target` to `dest`, creating parent directories.
pub fn download_artifact(target: &DownloadTarget, dest: &Path, opts: &HttpOptions) -> Result<DownloadReport> {
    tracing::info!(url = target.url(), dest = %dest.display(), "downloading");

    let mut part = PartFile::create(dest)?;
    let temp = part.temp_path().to_path_buf();
    let mut digest = StreamDigest::new();

    let bytes = http::get(target.url(), opts, |chunk| {
        part.write_all(chunk)?;
        digest.update(chunk);
        Ok(())
    })
    .map_err(|failure| match failure {
        HttpFailure::Sink(e) => ProvisionError::io(&temp, e),
        source => ProvisionError::Download {
            url: target.url().to_string(),
            source,
        },
    })?;

    let path = part.finalize()?;
    let sha256 = digest.finish();
    tracing::info!(path = %path.display(), bytes, %sha256, "download complete");

    Ok(DownloadReport {
        path,
        version: target.version().clone(),
        bytes,
        sha256,
    })
}
