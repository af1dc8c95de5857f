//! Version resolution from feed item titles.
//!
//! The feed carries no structured version field, only titles such as
//! `/robocode/1.9.5.0/robocode-1.9.5.0-setup.jar`. Items are taken as an
//! ordered log (most recent first) and the first title that matches wins.
//! Versions are never compared numerically.

use regex::Regex;

use crate::error::{ProvisionError, Result};
use crate::feed::{self, Feed};
use crate::http::HttpOptions;
use crate::version::Version;

/// Title pattern for one artifact's setup jar.
#[derive(Debug, Clone)]
pub struct VersionPattern {
    regex: Regex,
}

impl VersionPattern {
    /// Matches `<path>/<version>/<artifact>-<version>-setup.jar` on the whole title.
    pub fn for_artifact(artifact: &str) -> Result<Self> {
        let artifact = regex::escape(artifact);
        let pattern = format!(
            r"^(?:.*/)?{a}/(\d+(?:\.\d+)*)/{a}-(\d+(?:\.\d+)*)-setup\.jar$",
            a = artifact
        );
        let regex = Regex::new(&pattern).map_err(|e| ProvisionError::InvalidPattern {
            pattern,
            reason: e.to_string(),
        })?;
        Ok(VersionPattern { regex })
    }

    /// Version from the first capture group, if both groups match.
    pub fn extract(&self, title: &str) -> Option<Version> {
        let caps = self.regex.captures(title.trim())?;
        let first = caps.get(1)?;
        caps.get(2)?;
        Version::parse(first.as_str()).ok()
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Selects the channel titled `channel_title` and returns the version of its first matching item.
pub fn resolve_version(feed: &Feed, channel_title: &str, pattern: &VersionPattern) -> Result<Version> {
    let channel = feed.channel(channel_title).ok_or_else(|| {
        ProvisionError::NotFound(format!("no channel titled {:?} in feed", channel_title))
    })?;

    channel
        .items
        .iter()
        .find_map(|item| pattern.extract(&item.title))
        .ok_or_else(|| {
            ProvisionError::NotFound(format!(
                "no item in channel {:?} matches {}",
                channel_title,
                pattern.as_str()
            ))
        })
}

/// Anything that can produce the version to install.
pub trait VersionSource {
    fn resolve(&self) -> Result<Version>;
}

/// An explicit version override resolves to itself.
impl VersionSource for Version {
    fn resolve(&self) -> Result<Version> {
        Ok(self.clone())
    }
}

/// Latest version from the release feed.
#[derive(Debug, Clone)]
pub struct FeedVersionSource {
    pub feed_url: String,
    pub channel: String,
    pub pattern: VersionPattern,
    pub http: HttpOptions,
}

impl VersionSource for FeedVersionSource {
    fn resolve(&self) -> Result<Version> {
        let feed = feed::fetch_feed(&self.feed_url, &self.http)?;
        let version = resolve_version(&feed, &self.channel, &self.pattern)?;
        tracing::info!(url = %self.feed_url, %version, "resolved latest version from feed");
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{Channel, Item};

    fn feed_with(channel: &str, titles: &[&str]) -> Feed {
        Feed {
            title: String::new(),
            channels: vec![Channel {
                title: channel.to_string(),
                items: titles
                    .iter()
                    .map(|t| Item {
                        title: t.to_string(),
                    })
                    .collect(),
            }],
        }
    }

    fn robocode() -> VersionPattern {
        VersionPattern::for_artifact("robocode").unwrap()
    }

    #[test]
    fn first_match_in_feed_order_wins() {
        let feed = feed_with(
            "X",
            &[
                "robocode/1.9.5/robocode-1.9.5-setup.jar",
                "robocode/1.9.4/robocode-1.9.4-setup.jar",
            ],
        );
        assert_eq!(resolve_version(&feed, "X", &robocode()).unwrap().as_str(), "1.9.5");
    }

    #[test]
    fn feed_order_beats_numeric_order() {
        let feed = feed_with(
            "X",
            &[
                "/robocode/1.9.3.9/robocode-1.9.3.9-setup.jar",
                "/robocode/1.10.0.0/robocode-1.10.0.0-setup.jar",
            ],
        );
        assert_eq!(
            resolve_version(&feed, "X", &robocode()).unwrap().as_str(),
            "1.9.3.9"
        );
    }

    #[test]
    fn non_matching_items_are_skipped() {
        let feed = feed_with(
            "Robocode",
            &[
                "/robocode/1.9.5.0/README.md",
                "/robocode/1.9.5.0/robocode-1.9.5.0-src.zip",
                "/robocode/1.9.5.0/robocode-1.9.5.0-setup.jar",
            ],
        );
        assert_eq!(
            resolve_version(&feed, "Robocode", &robocode()).unwrap().as_str(),
            "1.9.5.0"
        );
    }

    #[test]
    fn first_capture_is_authoritative() {
        let v = robocode()
            .extract("/robocode/1.9.5.0/robocode-1.9.5.1-setup.jar")
            .unwrap();
        assert_eq!(v.as_str(), "1.9.5.0");
    }

    #[test]
    fn other_artifacts_do_not_match() {
        assert!(robocode()
            .extract("/tankroyale/0.9/tankroyale-0.9-setup.jar")
            .is_none());
        assert!(robocode()
            .extract("/robocode/1.9/robocode-1.9-setup.jar.sig")
            .is_none());
    }

    #[test]
    fn missing_channel_is_not_found() {
        let feed = feed_with("Y", &["robocode/1.9.5/robocode-1.9.5-setup.jar"]);
        let err = resolve_version(&feed, "X", &robocode()).unwrap_err();
        assert!(matches!(err, ProvisionError::NotFound(ref m) if m.contains("\"X\"")));
    }

    #[test]
    fn no_matching_item_is_not_found() {
        let feed = feed_with("X", &["/robocode/1.9.5.0/README.md"]);
        assert!(matches!(
            resolve_version(&feed, "X", &robocode()),
            Err(ProvisionError::NotFound(_))
        ));
        let empty = feed_with("X", &[]);
        assert!(matches!(
            resolve_version(&empty, "X", &robocode()),
            Err(ProvisionError::NotFound(_))
        ));
    }

    #[test]
    fn artifact_name_is_escaped() {
        let p = VersionPattern::for_artifact("a.b").unwrap();
        assert!(p.extract("a.b/1.0/a.b-1.0-setup.jar").is_some());
        assert!(p.extract("axb/1.0/axb-1.0-setup.jar").is_none());
    }

    #[test]
    fn explicit_version_resolves_to_itself() {
        let v = Version::parse("1.9.4.2").unwrap();
        assert_eq!(v.resolve().unwrap(), v);
    }
}
