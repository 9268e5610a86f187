//! Entry and wire types shared by the feed parser and fetcher.

use serde::Deserialize;
use tokio::time::Duration;

/// Per-attempt bound on a single feed request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Pause between attempts on the same source.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);
pub const MAX_RETRIES: usize = 3;

/// A feed entry as it arrives, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub summary: Option<String>,
}

/// The subset of JSON Feed 1.1 the digest reads.
#[derive(Debug, Deserialize)]
pub(crate) struct JsonFeedDocument {
    #[serde(default)]
    pub items: Vec<JsonFeedEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonFeedEntry {
    id: Option<String>,
    url: Option<String>,
    title: Option<String>,
    date_published: Option<String>,
    date_modified: Option<String>,
    summary: Option<String>,
    content_text: Option<String>,
}

impl From<JsonFeedEntry> for RawEntry {
    /// `id` doubles as the link when it is a URL, as many JSON feeds do.
    fn from(entry: JsonFeedEntry) -> Self {
        Self {
            title: entry.title,
            link: entry.url.or(entry.id),
            published: entry.date_published.or(entry.date_modified),
            summary: entry.summary.or(entry.content_text),
        }
    }
}
