//! Persisted preference documents.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::EngineConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub weight: f64,
    pub clicks: u64,
}

/// One article selected by the user from a delivered digest. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRecord {
    pub timestamp: DateTime<Utc>,
    pub article_title: String,
    pub article_url: String,
    pub category: String,
    pub topics: Vec<String>,
    pub source: String,
    pub ai_score: f64,
}

/// The durable preference state.
///
/// Counter maps only ever contain recognized keys; `click_history` keeps
/// every click verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceProfile {
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryStats>,
    #[serde(default)]
    pub topics: BTreeMap<String, u64>,
    #[serde(default)]
    pub sources: BTreeMap<String, u64>,
    #[serde(default)]
    pub click_history: Vec<ClickRecord>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Snapshot of the clicks moved out of the live history by one archival run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivePartition {
    pub archive_date: DateTime<Utc>,
    pub cutoff_date: DateTime<Utc>,
    pub archived_clicks: Vec<ClickRecord>,
    pub count: usize,
}

/// A click as submitted by the user, before it becomes a [`ClickRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClickRequest {
    pub category: String,
    pub title: String,
    pub url: String,
    pub ai_score: f64,
    pub topics: Vec<String>,
    pub source: String,
}

impl ClickRequest {
    /// Unrecognized categories, topics and sources are valid; only the
    /// score is checked.
    pub fn validate(&self) -> Result<()> {
        if !self.ai_score.is_finite() || self.ai_score < 0.0 {
            bail!("AI score must be a non-negative number, got {}", self.ai_score);
        }
        Ok(())
    }

    pub fn into_record(self, timestamp: DateTime<Utc>) -> ClickRecord {
        ClickRecord {
            timestamp,
            article_title: self.title,
            article_url: self.url,
            category: self.category,
            topics: self.topics,
            source: self.source,
            ai_score: self.ai_score,
        }
    }
}

impl PreferenceProfile {
    /// A fresh profile: every configured category at its default weight and
    /// every configured topic and source at zero.
    pub fn with_defaults(config: &EngineConfig, now: DateTime<Utc>) -> Self {
        Self {
            categories: config
                .categories
                .iter()
                .map(|c| {
                    (
                        c.name.clone(),
                        CategoryStats {
                            weight: c.default_weight,
                            clicks: 0,
                        },
                    )
                })
                .collect(),
            topics: config.topics.iter().map(|t| (t.clone(), 0)).collect(),
            sources: config.sources.iter().map(|s| (s.clone(), 0)).collect(),
            click_history: Vec::new(),
            created_at: now,
            last_updated: now,
        }
    }

    /// Append a click and bump the counters for the keys the profile knows.
    pub fn apply_click(&mut self, record: ClickRecord) {
        if let Some(stats) = self.categories.get_mut(&record.category) {
            stats.clicks += 1;
        }
        for topic in &record.topics {
            if let Some(count) = self.topics.get_mut(topic) {
                *count += 1;
            }
        }
        if let Some(count) = self.sources.get_mut(&record.source) {
            *count += 1;
        }
        self.click_history.push(record);
    }

    pub fn total_category_clicks(&self) -> u64 {
        self.categories.values().map(|c| c.clicks).sum()
    }
}
