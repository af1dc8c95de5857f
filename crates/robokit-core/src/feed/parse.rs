//! RSS structures for the SourceForge release feed.
//!
//! Only titles are read. Repeated `channel` and `item` elements appear bare
//! (no wrapper element); a single child deserializes the same as many.

use serde::Deserialize;

/// Root `<rss>` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Feed {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "channel", default)]
    pub channels: Vec<Channel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "item", default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub title: String,
}

impl Feed {
    /// The channel whose title equals `title` exactly.
    pub fn channel(&self, title: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.title == title)
    }
}

/// Parse a feed body. Unknown elements and attributes are ignored.
pub fn parse_feed(body: &[u8]) -> Result<Feed, quick_xml::DeError> {
    quick_xml::de::from_reader(body)
}
