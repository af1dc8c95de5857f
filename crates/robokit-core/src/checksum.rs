//! SHA-256 digests of downloaded setup jars and packaged robots.
//!
//! The downloader hashes inline while streaming (`StreamDigest`); the CLI
//! `checksum` command hashes existing files with `sha256_path`.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{ProvisionError, Result};

const BUF_SIZE: usize = 64 * 1024;

/// Incremental digest fed chunk by chunk.
#[derive(Default)]
pub struct StreamDigest {
    hasher: Sha256,
}

impl StreamDigest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
    }

    /// Lowercase hex of the digest.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).map_err(|e| ProvisionError::io(path, e))?;
    let mut digest = StreamDigest::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf).map_err(|e| ProvisionError::io(path, e))?;
        if n == 0 {
            break;
        }
        digest.update(&buf[..n]);
    }
    Ok(digest.finish())
}
