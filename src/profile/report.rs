//! Read-only summaries of the profile.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

use super::types::{ClickRecord, PreferenceProfile};
use crate::allocation::Ratio;
use crate::config::EngineConfig;

/// Window used by `recent_clicks_30_days`.
pub const RECENT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    /// Clicks in the live history (archived clicks are not counted).
    pub total_clicks: usize,
    pub recent_clicks_30_days: usize,
    /// Topics clicked at least once.
    pub total_topics: usize,
    /// Sources clicked at least once.
    pub active_sources: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceAnalysis {
    pub total_clicks: u64,
    pub category_clicks: BTreeMap<String, u64>,
    pub category_weights: BTreeMap<String, f64>,
    pub top_topics: Vec<(String, u64)>,
    pub source_preferences: BTreeMap<String, u64>,
    pub ratio: Ratio,
}

impl PreferenceProfile {
    pub fn stats(&self, now: DateTime<Utc>) -> ProfileStats {
        let recent_cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
        ProfileStats {
            total_clicks: self.click_history.len(),
            recent_clicks_30_days: self
                .click_history
                .iter()
                .filter(|c| c.timestamp > recent_cutoff)
                .count(),
            total_topics: self.topics.values().filter(|&&n| n > 0).count(),
            active_sources: self.sources.values().filter(|&&n| n > 0).count(),
        }
    }

    /// Clicks whose UTC date falls within `start..=end`, oldest first as
    /// stored, optionally restricted to one category and capped at `limit`.
    pub fn clicks_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        category: Option<&str>,
        limit: usize,
    ) -> Vec<&ClickRecord> {
        self.click_history
            .iter()
            .filter(|c| {
                let day = c.timestamp.date_naive();
                start <= day && day <= end
            })
            .filter(|c| category.map_or(true, |cat| c.category == cat))
            .take(limit)
            .collect()
    }

    pub fn analyze(&self, config: &EngineConfig) -> PreferenceAnalysis {
        PreferenceAnalysis {
            total_clicks: self.total_category_clicks(),
            category_clicks: self
                .categories
                .iter()
                .map(|(name, stats)| (name.clone(), stats.clicks))
                .collect(),
            category_weights: self.derive_weights(config),
            top_topics: self.top_topics(config, config.top_topic_limit),
            source_preferences: self.sources.clone(),
            ratio: self.personalized_ratio(config),
        }
    }
}

impl PreferenceAnalysis {
    /// Plain-text summary for the terminal.
    pub fn summary(&self, config: &EngineConfig, detailed: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total clicks: {}", self.total_clicks);

        let _ = writeln!(out, "\nCategory weights:");
        for category in &config.categories {
            let weight = self.category_weights.get(&category.name).copied().unwrap_or(0.0);
            let clicks = self.category_clicks.get(&category.name).copied().unwrap_or(0);
            let _ = writeln!(out, "  {}: {:.1}% ({} clicks)", category.name, weight * 100.0, clicks);
        }

        let _ = writeln!(out, "\nTop topics:");
        for (idx, (topic, count)) in self.top_topics.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}: {}", idx + 1, topic, count);
        }

        let _ = writeln!(out, "\nToday's ratio:");
        for category in &config.categories {
            let count = self.ratio.get(&category.name).copied().unwrap_or(0);
            let _ = writeln!(out, "  {}: {} articles", category.name, count);
        }

        if detailed {
            let _ = writeln!(out, "\nSource preferences:");
            for (source, count) in &self.source_preferences {
                let _ = writeln!(out, "  {}: {}", source, count);
            }
        }
        out
    }
}
