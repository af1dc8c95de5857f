//! Error taxonomy for the provisioning and packaging operations.
//!
//! Every variant is terminal for the operation that raised it. Nothing in the
//! core retries or substitutes a default; callers abort the whole sequence.

use std::path::PathBuf;

use crate::http::HttpFailure;

pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// Feed endpoint unreachable or returned a non-2xx status.
    #[error("fetch feed {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: HttpFailure,
    },

    /// Feed body could not be parsed as the expected XML document.
    #[error("parse feed {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: quick_xml::DeError,
    },

    /// No matching channel, item or version.
    #[error("not found: {0}")]
    NotFound(String),

    /// Artifact unreachable or returned a non-2xx status.
    #[error("download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: HttpFailure,
    },

    /// Archive corrupt or unreadable.
    #[error("extract {}: {source}", path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Robot archive could not be written.
    #[error("write archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Archive entry would land outside the destination directory.
    #[error("extract {}: entry {entry:?} escapes the destination", path.display())]
    UnsafeEntry { path: PathBuf, entry: String },

    /// Filesystem read/write failure.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid version {0:?}: expected dotted numeric (e.g. 1.9.5.0)")]
    InvalidVersion(String),

    #[error("invalid download url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid robot {name:?}: {reason}")]
    InvalidUnit { name: String, reason: String },
}

impl ProvisionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProvisionError::Io {
            path: path.into(),
            source,
        }
    }
}
