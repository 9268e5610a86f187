//! Composite relevance scoring.
//!
//! `total = base + freshness + affinity + source priority`, with every
//! constant taken from [`ScoringConfig`].

use chrono::{DateTime, Utc};

use crate::article::Article;
use crate::config::ScoringConfig;

pub struct Scorer<'a> {
    config: &'a ScoringConfig,
    /// Lowercased once; matched against lowercased titles.
    top_topics: Vec<String>,
    now: DateTime<Utc>,
}

impl<'a> Scorer<'a> {
    pub fn new(config: &'a ScoringConfig, top_topics: &[String], now: DateTime<Utc>) -> Self {
        Self {
            config,
            top_topics: top_topics
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            now,
        }
    }

    /// Step function of age. Unknown dates get the mid-range bonus instead
    /// of the minimum.
    pub fn freshness(&self, article: &Article) -> u32 {
        match article.hours_old(self.now) {
            None => self.config.unknown_freshness,
            Some(hours) => self
                .config
                .freshness_bands
                .iter()
                .find(|band| hours < band.max_hours)
                .map_or(0, |band| band.bonus),
        }
    }

    /// At most one topic match counts.
    pub fn affinity(&self, article: &Article) -> u32 {
        let title = article.title.to_lowercase();
        if self.top_topics.iter().any(|topic| title.contains(topic.as_str())) {
            self.config.affinity_bonus
        } else {
            0
        }
    }

    pub fn source_priority(&self, source_id: &str) -> u32 {
        self.config
            .source_priorities
            .iter()
            .find(|p| source_id.contains(p.tag.as_str()))
            .map_or(0, |p| p.bonus)
    }

    pub fn score(&self, mut article: Article) -> Article {
        article.freshness_score = self.freshness(&article);
        article.affinity_score = self.affinity(&article);
        article.source_priority = self.source_priority(&article.source_id);
        article.total_score = self.config.base
            + article.freshness_score
            + article.affinity_score
            + article.source_priority;
        article
    }

    pub fn score_all(&self, articles: Vec<Article>) -> Vec<Article> {
        articles.into_iter().map(|a| self.score(a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 16, 12, 0, 0).unwrap()
    }

    fn article(title: &str, source_id: &str, hours_old: Option<i64>) -> Article {
        Article {
            title: title.to_string(),
            link: format!("https://example.com/{}", title.len()),
            source_id: source_id.to_string(),
            category: "programming".to_string(),
            published_raw: None,
            published_at: hours_old.map(|h| now() - Duration::hours(h)),
            summary: None,
            freshness_score: 0,
            affinity_score: 0,
            source_priority: 0,
            total_score: 0,
        }
    }

    #[test]
    fn test_freshness_bands() {
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&config, &[], now());

        assert_eq!(scorer.freshness(&article("a", "s", Some(0))), 20);
        assert_eq!(scorer.freshness(&article("a", "s", Some(23))), 20);
        assert_eq!(scorer.freshness(&article("a", "s", Some(24))), 15);
        assert_eq!(scorer.freshness(&article("a", "s", Some(47))), 15);
        assert_eq!(scorer.freshness(&article("a", "s", Some(48))), 10);
        assert_eq!(scorer.freshness(&article("a", "s", Some(72))), 0);
        assert_eq!(scorer.freshness(&article("a", "s", Some(24 * 30))), 0);
        // Future-dated entries count as fresh
        assert_eq!(scorer.freshness(&article("a", "s", Some(-5))), 20);
        assert_eq!(scorer.freshness(&article("a", "s", None)), 10);
    }

    #[test]
    fn test_freshness_never_increases_with_age() {
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&config, &[], now());

        let mut previous = u32::MAX;
        for hours in 0..24 * 10 {
            let bonus = scorer.freshness(&article("a", "s", Some(hours)));
            assert!(bonus <= previous, "freshness increased at {} hours", hours);
            previous = bonus;
        }
    }

    #[test]
    fn test_affinity_counts_one_match() {
        let config = ScoringConfig::default();
        let topics = vec!["React".to_string(), "frontend".to_string()];
        let scorer = Scorer::new(&config, &topics, now());

        assert_eq!(scorer.affinity(&article("REACT for the frontend", "s", None)), 20);
        assert_eq!(scorer.affinity(&article("Server-side Rust", "s", None)), 0);
    }

    #[test]
    fn test_source_priority_order() {
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&config, &[], now());

        assert_eq!(scorer.source_priority("bestblogs_featured"), 15);
        assert_eq!(scorer.source_priority("bestblogs_ai"), 10);
        assert_eq!(scorer.source_priority("hacker_news"), 8);
        assert_eq!(scorer.source_priority("reddit_programming"), 0);
    }

    #[test]
    fn test_total_score() {
        let config = ScoringConfig::default();
        let topics = vec!["rust".to_string()];
        let scorer = Scorer::new(&config, &topics, now());

        let scored = scorer.score(article("Rust in production", "bestblogs_featured", Some(2)));
        assert_eq!(scored.freshness_score, 20);
        assert_eq!(scored.affinity_score, 20);
        assert_eq!(scored.source_priority, 15);
        assert_eq!(scored.total_score, 105);

        let plain = scorer.score(article("Weekly links", "reddit_programming", None));
        assert_eq!(plain.total_score, 60);
    }
}
