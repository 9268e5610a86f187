use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::archive::{archive_cutoff, split_history, ArchiveOutcome};
use super::report::{PreferenceAnalysis, ProfileStats};
use super::store::ProfileStore;
use super::types::{ArchivePartition, ClickRecord, ClickRequest, PreferenceProfile};
use crate::allocation::Ratio;
use crate::config::EngineConfig;
use crate::TARGET_PROFILE;

/// Owns the process-wide preference profile and writes every change
/// through to its store before returning.
pub struct PreferenceTracker<S: ProfileStore> {
    config: EngineConfig,
    store: S,
    profile: PreferenceProfile,
}

impl<S: ProfileStore> PreferenceTracker<S> {
    /// Load the stored profile, or start from defaults when there is none.
    pub fn open(config: EngineConfig, store: S) -> Result<Self> {
        let profile = match store.load()? {
            Some(profile) => {
                debug!(target: TARGET_PROFILE, "Loaded profile with {} clicks in history", profile.click_history.len());
                profile
            }
            None => {
                info!(target: TARGET_PROFILE, "No stored profile, starting from defaults");
                PreferenceProfile::with_defaults(&config, Utc::now())
            }
        };
        Ok(Self {
            config,
            store,
            profile,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn profile(&self) -> &PreferenceProfile {
        &self.profile
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist `updated` and only then make it the live profile, so a failed
    /// write leaves the tracker unchanged.
    fn commit(&mut self, mut updated: PreferenceProfile, now: DateTime<Utc>) -> Result<()> {
        updated.last_updated = now;
        self.store.save(&updated)?;
        self.profile = updated;
        Ok(())
    }

    pub fn record_click(&mut self, request: ClickRequest) -> Result<ClickRecord> {
        self.record_click_at(request, Utc::now())
    }

    /// Record a click at `now`. Invalid requests are rejected before the
    /// profile is touched.
    pub fn record_click_at(&mut self, request: ClickRequest, now: DateTime<Utc>) -> Result<ClickRecord> {
        request.validate()?;
        let record = request.into_record(now);

        let mut updated = self.profile.clone();
        updated.apply_click(record.clone());
        self.commit(updated, now)?;

        info!(target: TARGET_PROFILE, "Recorded click on '{}' ({})", record.article_title, record.category);
        Ok(record)
    }

    /// Recompute and store category weights in the live profile.
    pub fn derive_weights(&mut self) -> BTreeMap<String, f64> {
        self.profile.recompute_weights(&self.config)
    }

    pub fn personalized_ratio(&mut self) -> Ratio {
        self.derive_weights();
        self.profile.personalized_ratio(&self.config)
    }

    pub fn top_topics(&self, limit: usize) -> Vec<(String, u64)> {
        self.profile.top_topics(&self.config, limit)
    }

    pub fn stats(&self) -> ProfileStats {
        self.profile.stats(Utc::now())
    }

    pub fn analyze(&mut self) -> PreferenceAnalysis {
        self.derive_weights();
        self.profile.analyze(&self.config)
    }

    /// Records that `archive` would move, without changing anything.
    pub fn preview_archive(&self, cutoff_days: i64, now: DateTime<Utc>) -> Result<Vec<&ClickRecord>> {
        let cutoff = archive_cutoff(cutoff_days, now)?;
        Ok(self
            .profile
            .click_history
            .iter()
            .filter(|c| c.timestamp < cutoff)
            .collect())
    }

    pub fn archive(&mut self, cutoff_days: i64) -> Result<ArchiveOutcome> {
        self.archive_at(cutoff_days, Utc::now())
    }

    /// Move clicks older than `cutoff_days` into an archive snapshot.
    ///
    /// With nothing old enough this is a no-op that reports zero archived
    /// records. Counters are never touched.
    pub fn archive_at(&mut self, cutoff_days: i64, now: DateTime<Utc>) -> Result<ArchiveOutcome> {
        let cutoff = archive_cutoff(cutoff_days, now)?;
        let (old, new) = split_history(self.profile.click_history.clone(), cutoff);

        if old.is_empty() {
            info!(target: TARGET_PROFILE, "No clicks older than {} days to archive", cutoff_days);
            return Ok(ArchiveOutcome {
                archived: 0,
                retained: new.len(),
                cutoff,
                location: None,
            });
        }

        let archived = old.len();
        let retained = new.len();
        let partition = ArchivePartition::new(now, cutoff, old);
        let location = self.store.write_archive(&partition)?;

        let mut updated = self.profile.clone();
        updated.click_history = new;
        self.commit(updated, now)?;

        info!(target: TARGET_PROFILE, "Archived {} clicks to {}, {} remain", archived, location, retained);
        Ok(ArchiveOutcome {
            archived,
            retained,
            cutoff,
            location: Some(location),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::store::{JsonFileStore, MemoryStore};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn request(category: &str, topics: &[&str], source: &str) -> ClickRequest {
        ClickRequest {
            category: category.to_string(),
            title: "React 19 features".to_string(),
            url: "https://example.com/react".to_string(),
            ai_score: 9.5,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            source: source.to_string(),
        }
    }

    fn tracker() -> PreferenceTracker<MemoryStore> {
        PreferenceTracker::open(EngineConfig::default(), MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_record_click_updates_recognized_counters_only() {
        let mut tracker = tracker();
        let record = tracker
            .record_click_at(request("programming", &["react", "unknownxyz"], "bestblogs"), now())
            .unwrap();

        let profile = tracker.profile();
        assert_eq!(profile.topics["react"], 1);
        assert!(!profile.topics.contains_key("unknownxyz"));
        assert_eq!(profile.categories["programming"].clicks, 1);
        assert_eq!(profile.sources["bestblogs"], 1);
        assert_eq!(record.topics, vec!["react", "unknownxyz"]);
        assert_eq!(profile.click_history, vec![record]);

        // Persisted before returning
        assert_eq!(tracker.store().saves, 1);
        assert_eq!(tracker.store().profile.as_ref(), Some(tracker.profile()));
        assert_eq!(tracker.profile().last_updated, now());
    }

    #[test]
    fn test_unrecognized_click_is_logged_but_not_counted() {
        let mut tracker = tracker();
        tracker
            .record_click_at(request("security", &["kernel"], "lobsters"), now())
            .unwrap();

        let profile = tracker.profile();
        assert_eq!(profile.click_history.len(), 1);
        assert_eq!(profile.total_category_clicks(), 0);
        assert!(!profile.categories.contains_key("security"));
        assert!(!profile.sources.contains_key("lobsters"));
    }

    #[test]
    fn test_invalid_score_is_rejected() {
        let mut tracker = tracker();
        let before = tracker.profile().clone();

        let mut bad = request("ai", &[], "openai");
        bad.ai_score = -1.0;
        assert!(tracker.record_click_at(bad.clone(), now()).is_err());
        bad.ai_score = f64::NAN;
        assert!(tracker.record_click_at(bad, now()).is_err());

        assert_eq!(tracker.profile(), &before);
        assert_eq!(tracker.store().saves, 0);
    }

    #[test]
    fn test_ratio_follows_clicks() {
        let mut tracker = tracker();
        for _ in 0..3 {
            tracker.record_click_at(request("programming", &[], "bestblogs"), now()).unwrap();
        }
        tracker.record_click_at(request("ai", &[], "openai"), now()).unwrap();

        let weights = tracker.derive_weights();
        assert_eq!(weights["programming"], 0.75);
        assert_eq!(weights["ai"], 0.25);
        assert_eq!(weights["product"], 0.0);

        let ratio = tracker.personalized_ratio();
        assert_eq!(ratio["programming"], 6);
        assert_eq!(ratio["ai"], 2);
        assert_eq!(ratio["product"], 1);
    }

    #[test]
    fn test_archive_splits_history_and_is_idempotent() {
        let mut tracker = tracker();
        let ages = [400, 200, 10, 5, 0];
        for days in ages {
            tracker
                .record_click_at(request("ai", &[], "openai"), now() - Duration::days(days))
                .unwrap();
        }
        let clicks_before = tracker.profile().categories["ai"].clicks;

        assert_eq!(tracker.preview_archive(180, now()).unwrap().len(), 2);

        let outcome = tracker.archive_at(180, now()).unwrap();
        assert_eq!(outcome.archived, 2);
        assert_eq!(outcome.retained, 3);
        assert!(outcome.location.is_some());
        assert_eq!(tracker.profile().click_history.len(), 3);
        assert_eq!(tracker.profile().categories["ai"].clicks, clicks_before);

        let archives = &tracker.store().archives;
        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].count, 2);
        assert_eq!(archives[0].cutoff_date, now() - Duration::days(180));

        let again = tracker.archive_at(180, now()).unwrap();
        assert_eq!(again.archived, 0);
        assert_eq!(again.retained, 3);
        assert_eq!(again.location, None);
        assert_eq!(tracker.store().archives.len(), 1);
    }

    #[test]
    fn test_file_backed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_preferences.json");

        let mut tracker =
            PreferenceTracker::open(EngineConfig::default(), JsonFileStore::new(&path)).unwrap();
        tracker
            .record_click_at(request("ai", &["ai-architecture"], "openai"), now() - Duration::days(400))
            .unwrap();
        tracker.record_click_at(request("ai", &[], "openai"), now()).unwrap();
        let outcome = tracker.archive_at(365, now()).unwrap();
        assert_eq!(outcome.archived, 1);

        let archive_path = dir.path().join("user_preferences_archive_20251019.json");
        assert_eq!(outcome.location, Some(archive_path.display().to_string()));
        assert!(archive_path.exists());

        let reopened =
            PreferenceTracker::open(EngineConfig::default(), JsonFileStore::new(&path)).unwrap();
        assert_eq!(reopened.profile().click_history.len(), 1);
        assert_eq!(reopened.profile().categories["ai"].clicks, 2);
        assert_eq!(reopened.profile().topics["ai-architecture"], 1);
    }

    #[test]
    fn test_bad_archive_age_leaves_profile_untouched() {
        let mut tracker = tracker();
        tracker
            .record_click_at(request("ai", &[], "openai"), now() - Duration::days(2))
            .unwrap();
        let before = tracker.profile().clone();

        assert!(tracker.archive_at(-1, now()).is_err());
        assert!(tracker.archive_at(1_000_000_000, now()).is_err());
        assert!(tracker.preview_archive(-1, now()).is_err());

        assert_eq!(tracker.profile(), &before);
        assert_eq!(tracker.store().saves, 1);
        assert!(tracker.store().archives.is_empty());
    }

    #[test]
    fn test_second_archive_on_same_day_keeps_both_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_preferences.json");
        let mut tracker =
            PreferenceTracker::open(EngineConfig::default(), JsonFileStore::new(&path)).unwrap();

        let mut first = request("ai", &[], "openai");
        first.title = "first".to_string();
        let mut second = request("ai", &[], "openai");
        second.title = "second".to_string();
        tracker.record_click_at(first, now() - Duration::days(400)).unwrap();
        tracker
            .record_click_at(second, now() - Duration::days(365) + Duration::hours(1))
            .unwrap();

        let morning = tracker.archive_at(365, now()).unwrap();
        let later = tracker.archive_at(365, now() + Duration::hours(3)).unwrap();
        assert_eq!(morning.archived, 1);
        assert_eq!(later.archived, 1);
        assert_ne!(morning.location, later.location);
        assert!(tracker.profile().click_history.is_empty());

        let titles = |name: &str| {
            let json = std::fs::read_to_string(dir.path().join(name)).unwrap();
            let partition: ArchivePartition = serde_json::from_str(&json).unwrap();
            assert_eq!(partition.count, partition.archived_clicks.len());
            partition
                .archived_clicks
                .into_iter()
                .map(|c| c.article_title)
                .collect::<Vec<_>>()
        };
        assert_eq!(titles("user_preferences_archive_20251019.json"), vec!["first"]);
        assert_eq!(titles("user_preferences_archive_20251019_2.json"), vec!["second"]);
    }

    #[test]
    fn test_open_uses_stored_profile() {
        let config = EngineConfig::default();
        let mut stored = PreferenceProfile::with_defaults(&config, now() - Duration::days(30));
        stored.apply_click(request("product", &["product-design"], "bestblogs").into_record(now()));

        let tracker = PreferenceTracker::open(config, MemoryStore::with_profile(stored.clone())).unwrap();
        assert_eq!(tracker.profile(), &stored);
        assert_eq!(tracker.profile().categories["product"].clicks, 1);
        assert_eq!(tracker.top_topics(1), vec![("product-design".to_string(), 1)]);
        assert_eq!(tracker.store().saves, 0);
    }
}
