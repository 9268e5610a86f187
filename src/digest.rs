//! One digest-generation run: filter, score and allocate the fetched
//! articles using the current preference profile.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::allocation::{allocate, selection_len, Ratio, Selection};
use crate::article::Article;
use crate::config::EngineConfig;
use crate::profile::PreferenceProfile;
use crate::scoring::Scorer;
use crate::TARGET_DIGEST;

/// What a downstream formatter receives for one run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Digest {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub ratio: Ratio,
    /// Topics used for affinity scoring, most clicked first.
    pub topics: Vec<String>,
    pub categories: Selection,
}

impl Digest {
    pub fn article_count(&self) -> usize {
        selection_len(&self.categories)
    }
}

/// Topics with at least one click, limited to the configured top-N.
pub fn affinity_topics(profile: &PreferenceProfile, config: &EngineConfig) -> Vec<String> {
    profile
        .top_topics(config, config.top_topic_limit)
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(topic, _)| topic)
        .collect()
}

/// Drop articles older than the configured window. Undated ones stay.
fn within_window(articles: Vec<Article>, config: &EngineConfig, now: DateTime<Utc>) -> Vec<Article> {
    let Some(max_hours) = config.max_article_age_hours else {
        return articles;
    };
    articles
        .into_iter()
        .filter(|a| a.hours_old(now).map_or(true, |hours| hours < max_hours))
        .collect()
}

pub fn build_digest(
    config: &EngineConfig,
    profile: &PreferenceProfile,
    articles: Vec<Article>,
    now: DateTime<Utc>,
) -> Digest {
    let ratio = profile.personalized_ratio(config);
    let topics = affinity_topics(profile, config);
    info!(target: TARGET_DIGEST, "Ratio: {:?}, topics: {:?}", ratio, topics);

    let candidates = within_window(articles, config, now);
    let scorer = Scorer::new(&config.scoring, &topics, now);
    let scored = scorer.score_all(candidates);
    let categories = allocate(&scored, &ratio, config.articles_per_day);

    let digest = Digest {
        generated_at: now,
        total: config.articles_per_day,
        ratio,
        topics,
        categories,
    };
    info!(target: TARGET_DIGEST, "Selected {} of {} candidates", digest.article_count(), scored.len());
    digest
}
