//! Feed fetcher: GET the release feed and parse it.
//!
//! Any transport failure, non-2xx status or malformed body fails the whole
//! fetch. Nothing is cached or retried.

mod parse;

pub use parse::{parse_feed, Channel, Feed, Item};

use crate::error::{ProvisionError, Result};
use crate::http::{self, HttpOptions};

/// Default SourceForge feed for Robocode releases.
pub const DEFAULT_FEED_URL: &str = "https://sourceforge.net/projects/robocode/rss?limit=2";

/// Default channel title inside the feed.
pub const DEFAULT_CHANNEL: &str = "Robocode";

/// Fetches and parses the feed at `url`.
pub fn fetch_feed(url: &str, opts: &HttpOptions) -> Result<Feed> {
    tracing::debug!(url, "fetching release feed");
    let body = http::get_bytes(url, opts).map_err(|source| ProvisionError::Fetch {
        url: url.to_string(),
        source,
    })?;
    let feed = parse_feed(&body).map_err(|source| ProvisionError::Parse {
        url: url.to_string(),
        source,
    })?;
    tracing::debug!(
        url,
        channels = feed.channels.len(),
        "parsed release feed"
    );
    Ok(feed)
}
