use chrono::{DateTime, Utc};
use serde::Serialize;

/// A normalized feed entry considered for a digest.
///
/// Built by the feed normalizer with zeroed scores; the scorer fills in the
/// score fields once and the article is not modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub link: String,
    pub source_id: String,
    pub category: String,
    pub published_raw: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub freshness_score: u32,
    pub affinity_score: u32,
    pub source_priority: u32,
    pub total_score: u32,
}

impl Article {
    /// Age in whole hours at `now`, or `None` when the publication date is unknown.
    pub fn hours_old(&self, now: DateTime<Utc>) -> Option<i64> {
        self.published_at
            .map(|published| now.signed_duration_since(published).num_hours())
    }
}
