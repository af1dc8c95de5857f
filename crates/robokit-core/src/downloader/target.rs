//! Deterministic download URL for one version of the setup jar.

use crate::error::{ProvisionError, Result};
use crate::version::Version;

/// SourceForge download link; `{artifact}` and `{version}` are substituted.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://sourceforge.net/projects/robocode/files/{artifact}/{version}/{artifact}-{version}-setup.jar/download";

/// Version plus the URL derived from it. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    artifact: String,
    version: Version,
    url: String,
}

impl DownloadTarget {
    /// Fills `template` and checks the result is an absolute URL.
    pub fn new(template: &str, artifact: &str, version: Version) -> Result<Self> {
        let url = template
            .replace("{artifact}", artifact)
            .replace("{version}", version.as_str());
        url::Url::parse(&url).map_err(|source| ProvisionError::InvalidUrl {
            url: url.clone(),
            source,
        })?;
        Ok(DownloadTarget {
            artifact: artifact.to_string(),
            version,
            url,
        })
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Local file name for the setup jar, e.g. `robocode-1.9.5.0-setup.jar`.
    pub fn file_name(&self) -> String {
        format!("{}-{}-setup.jar", self.artifact, self.version)
    }
}
