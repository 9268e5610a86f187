//! Engine configuration.
//!
//! Every tunable constant of the scorer, allocator and preference profile
//! lives here. The defaults reproduce the documented production values; a
//! JSON file named by `DIGEST_CONFIG_PATH` may override any subset of them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::environment::get_env_var;
use crate::TARGET_PROFILE;

pub const CONFIG_PATH_ENV: &str = "DIGEST_CONFIG_PATH";

/// Number of articles in one digest.
pub const DEFAULT_ARTICLES_PER_DAY: usize = 10;

/// Number of top topics used for affinity scoring and reports.
pub const DEFAULT_TOP_TOPIC_LIMIT: usize = 5;

/// Default archival cutoff used by scheduled runs.
pub const DEFAULT_ARCHIVE_DAYS: i64 = 180;

/// Articles older than this are dropped before scoring. Undated articles are kept.
pub const DEFAULT_MAX_ARTICLE_AGE_HOURS: i64 = 72;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub articles_per_day: usize,
    pub top_topic_limit: usize,
    pub max_article_age_hours: Option<i64>,
    pub scoring: ScoringConfig,
    /// Ordered: the last category absorbs the remainder of the ratio.
    pub categories: Vec<CategoryConfig>,
    /// Recognized topic keys, in insertion order of a fresh profile.
    pub topics: Vec<String>,
    /// Recognized source keys.
    pub sources: Vec<String>,
    pub feeds: Vec<FeedSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryConfig {
    pub name: String,
    /// Weight used while no category has a click. Defaults are relative
    /// emphasis and are not normalized.
    pub default_weight: f64,
    pub min_articles: usize,
    pub max_articles: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringConfig {
    pub base: u32,
    /// `(max_hours_old, bonus)` pairs, ascending by hours.
    pub freshness_bands: Vec<FreshnessBand>,
    /// Bonus for articles whose date could not be parsed.
    pub unknown_freshness: u32,
    pub affinity_bonus: u32,
    /// Checked in order against the source id; first match wins.
    pub source_priorities: Vec<SourcePriority>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessBand {
    pub max_hours: i64,
    pub bonus: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePriority {
    pub tag: String,
    pub bonus: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSource {
    pub id: String,
    pub name: String,
    pub url: String,
    pub category: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base: 50,
            freshness_bands: vec![
                FreshnessBand { max_hours: 24, bonus: 20 },
                FreshnessBand { max_hours: 48, bonus: 15 },
                FreshnessBand { max_hours: 72, bonus: 10 },
            ],
            unknown_freshness: 10,
            affinity_bonus: 20,
            source_priorities: vec![
                SourcePriority { tag: "featured".to_string(), bonus: 15 },
                SourcePriority { tag: "ai".to_string(), bonus: 10 },
                SourcePriority { tag: "hacker".to_string(), bonus: 8 },
            ],
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let category = |name: &str, default_weight, min_articles, max_articles| CategoryConfig {
            name: name.to_string(),
            default_weight,
            min_articles,
            max_articles,
        };
        let feed = |id: &str, name: &str, url: &str, category: &str| FeedSource {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            category: category.to_string(),
        };

        Self {
            articles_per_day: DEFAULT_ARTICLES_PER_DAY,
            top_topic_limit: DEFAULT_TOP_TOPIC_LIMIT,
            max_article_age_hours: Some(DEFAULT_MAX_ARTICLE_AGE_HOURS),
            scoring: ScoringConfig::default(),
            categories: vec![
                category("programming", 0.5, 1, 6),
                category("ai", 0.5, 1, 7),
                category("product", 0.2, 1, 2),
            ],
            topics: [
                "react",
                "python",
                "rust",
                "go",
                "ai-architecture",
                "frontend",
                "backend",
                "product-design",
                "devops",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
            sources: ["bestblogs", "hackernews", "reddit", "openai"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            feeds: vec![
                feed(
                    "bestblogs_featured",
                    "BestBlogs Featured",
                    "https://www.bestblogs.dev/zh/feeds/rss?featured=y",
                    "programming",
                ),
                feed(
                    "bestblogs_programming",
                    "BestBlogs Programming",
                    "https://www.bestblogs.dev/zh/feeds/rss?category=programming&type=article",
                    "programming",
                ),
                feed(
                    "bestblogs_ai",
                    "BestBlogs AI",
                    "https://www.bestblogs.dev/en/feeds/rss?category=ai&minScore=90",
                    "ai",
                ),
                feed(
                    "bestblogs_product",
                    "BestBlogs Product",
                    "https://www.bestblogs.dev/zh/feeds/rss?category=product",
                    "product",
                ),
                feed(
                    "hacker_news",
                    "Hacker News",
                    "https://hnrss.org/frontpage",
                    "programming",
                ),
                feed(
                    "reddit_programming",
                    "Reddit r/programming",
                    "https://www.reddit.com/r/programming/.rss",
                    "programming",
                ),
                feed(
                    "openai_blog",
                    "OpenAI Blog",
                    "https://openai.com/blog/rss.xml",
                    "ai",
                ),
            ],
        }
    }
}

impl EngineConfig {
    /// Loads the configuration named by `DIGEST_CONFIG_PATH`, or the defaults
    /// when the variable is unset.
    pub fn load() -> Result<Self> {
        match get_env_var(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!(target: TARGET_PROFILE, "Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn category(&self, name: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn feed(&self, id: &str) -> Option<&FeedSource> {
        self.feeds.iter().find(|f| f.id == id)
    }
}
