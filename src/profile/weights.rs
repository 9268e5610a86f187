//! Views derived from the click counters: category weights, the
//! personalized ratio and the top topics.

use std::collections::BTreeMap;

use super::types::PreferenceProfile;
use crate::allocation::Ratio;
use crate::config::EngineConfig;

impl PreferenceProfile {
    /// `clicks / total` per category. With no clicks at all the configured
    /// defaults are returned as-is; they are relative emphasis and do not
    /// sum to one.
    pub fn derive_weights(&self, config: &EngineConfig) -> BTreeMap<String, f64> {
        let total = self.total_category_clicks();
        self.categories
            .iter()
            .map(|(name, stats)| {
                let weight = if total > 0 {
                    stats.clicks as f64 / total as f64
                } else {
                    config.category(name).map_or(0.0, |c| c.default_weight)
                };
                (name.clone(), weight)
            })
            .collect()
    }

    /// Store freshly derived weights in the profile.
    pub fn recompute_weights(&mut self, config: &EngineConfig) -> BTreeMap<String, f64> {
        let weights = self.derive_weights(config);
        for (name, stats) in self.categories.iter_mut() {
            if let Some(weight) = weights.get(name) {
                stats.weight = *weight;
            }
        }
        weights
    }

    /// Article counts per category for one digest.
    ///
    /// In configured order, each category but the last gets
    /// `trunc(weight * total)` and the last gets whatever remains of `total`.
    /// Each count is then clamped into its band. The clamped counts are not
    /// rebalanced, so their sum can differ from `total`.
    pub fn personalized_ratio(&self, config: &EngineConfig) -> Ratio {
        let weights = self.derive_weights(config);
        let total = config.articles_per_day as i64;
        let last = config.categories.len().saturating_sub(1);

        let mut assigned = 0i64;
        let mut ratio = Ratio::new();
        for (idx, category) in config.categories.iter().enumerate() {
            let raw = if idx == last {
                total - assigned
            } else {
                let weight = weights.get(&category.name).copied().unwrap_or(0.0);
                let count = (weight * total as f64) as i64;
                assigned += count;
                count
            };
            let clamped = (category.min_articles as i64).max(raw.min(category.max_articles as i64));
            ratio.insert(category.name.clone(), clamped.max(0) as usize);
        }
        ratio
    }

    /// The `limit` most clicked topics, most clicked first.
    ///
    /// Ties keep the order in which a fresh profile lists its topics (the
    /// configured vocabulary), then name order for anything else.
    pub fn top_topics(&self, config: &EngineConfig, limit: usize) -> Vec<(String, u64)> {
        let rank = |topic: &str| {
            config
                .topics
                .iter()
                .position(|t| t == topic)
                .unwrap_or(config.topics.len())
        };

        let mut topics: Vec<(String, u64)> = self
            .topics
            .iter()
            .map(|(topic, count)| (topic.clone(), *count))
            .collect();
        topics.sort_by_key(|(topic, _)| rank(topic));
        topics.sort_by(|a, b| b.1.cmp(&a.1));
        topics.truncate(limit);
        topics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile_with_clicks(config: &EngineConfig, clicks: &[(&str, u64)]) -> PreferenceProfile {
        let mut profile = PreferenceProfile::with_defaults(config, Utc::now());
        for (category, count) in clicks {
            profile.categories.get_mut(*category).unwrap().clicks = *count;
        }
        profile
    }

    #[test]
    fn test_default_weights_without_clicks() {
        let config = EngineConfig::default();
        let profile = PreferenceProfile::with_defaults(&config, Utc::now());
        let weights = profile.derive_weights(&config);

        assert_eq!(weights["programming"], 0.5);
        assert_eq!(weights["ai"], 0.5);
        assert_eq!(weights["product"], 0.2);
    }

    #[test]
    fn test_weights_from_clicks() {
        let config = EngineConfig::default();
        let mut profile =
            profile_with_clicks(&config, &[("programming", 3), ("ai", 1), ("product", 0)]);
        let weights = profile.recompute_weights(&config);

        assert_eq!(weights["programming"], 0.75);
        assert_eq!(weights["ai"], 0.25);
        assert_eq!(weights["product"], 0.0);
        assert_eq!(profile.categories["programming"].weight, 0.75);
    }

    #[test]
    fn test_ratio_with_default_weights_exceeds_total() {
        let config = EngineConfig::default();
        let profile = PreferenceProfile::with_defaults(&config, Utc::now());
        let ratio = profile.personalized_ratio(&config);

        // 5 + 5 leaves 0 for product, which is clamped up to 1
        assert_eq!(ratio["programming"], 5);
        assert_eq!(ratio["ai"], 5);
        assert_eq!(ratio["product"], 1);
        assert_eq!(ratio.values().sum::<usize>(), 11);
    }

    #[test]
    fn test_ratio_clamps_into_bands() {
        let config = EngineConfig::default();
        let profile = profile_with_clicks(&config, &[("programming", 9), ("ai", 1)]);
        let ratio = profile.personalized_ratio(&config);

        // 9 -> 6, 1 -> 1, remainder 0 -> 1
        assert_eq!(ratio["programming"], 6);
        assert_eq!(ratio["ai"], 1);
        assert_eq!(ratio["product"], 1);

        let profile = profile_with_clicks(&config, &[("product", 4)]);
        let ratio = profile.personalized_ratio(&config);
        assert_eq!(ratio["programming"], 1);
        assert_eq!(ratio["ai"], 1);
        assert_eq!(ratio["product"], 2);
    }

    #[test]
    fn test_ratio_from_mixed_clicks() {
        let config = EngineConfig::default();
        let profile =
            profile_with_clicks(&config, &[("programming", 3), ("ai", 5), ("product", 2)]);
        let ratio = profile.personalized_ratio(&config);

        assert_eq!(ratio["programming"], 3);
        assert_eq!(ratio["ai"], 5);
        assert_eq!(ratio["product"], 2);
    }

    #[test]
    fn test_top_topics_ties_keep_vocabulary_order() {
        let config = EngineConfig::default();
        let mut profile = PreferenceProfile::with_defaults(&config, Utc::now());
        *profile.topics.get_mut("rust").unwrap() = 4;
        *profile.topics.get_mut("react").unwrap() = 2;
        *profile.topics.get_mut("devops").unwrap() = 2;
        *profile.topics.get_mut("backend").unwrap() = 2;

        let top = profile.top_topics(&config, 3);
        assert_eq!(
            top,
            vec![
                ("rust".to_string(), 4),
                ("react".to_string(), 2),
                ("backend".to_string(), 2),
            ]
        );

        let all = profile.top_topics(&config, 20);
        assert_eq!(all.len(), config.topics.len());
        // Zero counts follow vocabulary order
        assert_eq!(all[4].0, "python");
    }
}
