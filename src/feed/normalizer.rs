use tracing::debug;

use super::dates::parse_date;
use super::types::RawEntry;
use crate::article::Article;
use crate::config::FeedSource;
use crate::TARGET_WEB_REQUEST;

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Converts one raw entry into an unscored article.
///
/// Entries without a title or link are dropped (`None`). An unparseable
/// date leaves `published_at` unset.
pub fn normalize_entry(entry: &RawEntry, source_id: &str, category: &str) -> Option<Article> {
    let title = non_blank(entry.title.as_ref())?;
    let link = non_blank(entry.link.as_ref())?;
    let published_raw = non_blank(entry.published.as_ref());
    let published_at = published_raw.as_deref().and_then(parse_date);

    Some(Article {
        title,
        link,
        source_id: source_id.to_string(),
        category: category.to_string(),
        published_raw,
        published_at,
        summary: non_blank(entry.summary.as_ref()),
        freshness_score: 0,
        affinity_score: 0,
        source_priority: 0,
        total_score: 0,
    })
}

/// Normalizes a batch of entries from one source, skipping malformed ones.
pub fn normalize_entries(entries: &[RawEntry], source: &FeedSource) -> Vec<Article> {
    let articles: Vec<Article> = entries
        .iter()
        .filter_map(|entry| normalize_entry(entry, &source.id, &source.category))
        .collect();

    let dropped = entries.len() - articles.len();
    if dropped > 0 {
        debug!(target: TARGET_WEB_REQUEST, "Dropped {} malformed entries from {}", dropped, source.id);
    }
    articles
}
