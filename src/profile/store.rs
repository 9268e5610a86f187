//! Persistence backends for the preference profile.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::types::{ArchivePartition, PreferenceProfile};
use crate::environment::get_env_var_or;
use crate::TARGET_PROFILE;

pub const PROFILE_PATH_ENV: &str = "DIGEST_PROFILE_PATH";
pub const DEFAULT_PROFILE_PATH: &str = "user_preferences.json";

/// Where the profile and its archives live.
pub trait ProfileStore {
    /// `Ok(None)` when no profile has been saved yet.
    fn load(&self) -> Result<Option<PreferenceProfile>>;

    /// Replace the stored profile with `profile`.
    fn save(&mut self, profile: &PreferenceProfile) -> Result<()>;

    /// Write one archive snapshot and return where it went.
    fn write_archive(&mut self, partition: &ArchivePartition) -> Result<String>;
}

/// A single JSON document on disk, rewritten in full on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `DIGEST_PROFILE_PATH`, falling back to `user_preferences.json`.
    pub fn from_env() -> Self {
        Self::new(get_env_var_or(PROFILE_PATH_ENV, DEFAULT_PROFILE_PATH))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<stem>_archive_<YYYYMMDD>.json` next to the profile, named after the cutoff date.
    pub fn archive_path(&self, partition: &ArchivePartition) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("user_preferences");
        let name = format!(
            "{}_archive_{}.json",
            stem,
            partition.cutoff_date.format("%Y%m%d")
        );
        self.path.with_file_name(name)
    }

    /// The first archive path for `partition` that is not taken yet.
    /// Later runs with the same cutoff date get `_2`, `_3`, ... suffixes.
    pub fn next_archive_path(&self, partition: &ArchivePartition) -> PathBuf {
        let base = self.archive_path(partition);
        let stem = base
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("archive")
            .to_string();

        let mut candidate = base.clone();
        let mut run = 1;
        while candidate.exists() {
            run += 1;
            candidate = base.with_file_name(format!("{}_{}.json", stem, run));
        }
        candidate
    }
}

/// Serialize to a temporary file in the target directory, then rename it
/// over the target. Readers see either the old or the new document.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

impl ProfileStore for JsonFileStore {
    fn load(&self) -> Result<Option<PreferenceProfile>> {
        if !self.path.exists() {
            debug!(target: TARGET_PROFILE, "No profile at {}", self.path.display());
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read profile {}", self.path.display()))?;
        let profile = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse profile {}", self.path.display()))?;
        Ok(Some(profile))
    }

    fn save(&mut self, profile: &PreferenceProfile) -> Result<()> {
        write_json_atomic(&self.path, profile)?;
        debug!(target: TARGET_PROFILE, "Saved profile to {}", self.path.display());
        Ok(())
    }

    fn write_archive(&mut self, partition: &ArchivePartition) -> Result<String> {
        let archive_path = self.next_archive_path(partition);
        write_json_atomic(&archive_path, partition)?;
        info!(target: TARGET_PROFILE, "Wrote {} archived clicks to {}", partition.count, archive_path.display());
        Ok(archive_path.display().to_string())
    }
}

/// Keeps everything in memory. Used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub profile: Option<PreferenceProfile>,
    pub archives: Vec<ArchivePartition>,
    pub saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(profile: PreferenceProfile) -> Self {
        Self {
            profile: Some(profile),
            ..Self::default()
        }
    }
}

impl ProfileStore for MemoryStore {
    fn load(&self) -> Result<Option<PreferenceProfile>> {
        Ok(self.profile.clone())
    }

    fn save(&mut self, profile: &PreferenceProfile) -> Result<()> {
        self.profile = Some(profile.clone());
        self.saves += 1;
        Ok(())
    }

    fn write_archive(&mut self, partition: &ArchivePartition) -> Result<String> {
        self.archives.push(partition.clone());
        Ok(format!("memory://archive/{}", self.archives.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("prefs.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let mut store = JsonFileStore::new(&path);

        let profile = PreferenceProfile::with_defaults(&EngineConfig::default(), Utc::now());
        store.save(&profile).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"clickHistory\""));
        assert!(json.contains("\"lastUpdated\""));
        assert_eq!(store.load().unwrap(), Some(profile));

        // Only the profile itself is left behind
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").unwrap();
        assert!(JsonFileStore::new(&path).load().is_err());
    }

    #[test]
    fn test_archive_path_uses_cutoff_date() {
        let store = JsonFileStore::new("/data/user_preferences.json");
        let partition = ArchivePartition {
            archive_date: Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
            cutoff_date: Utc.with_ymd_and_hms(2026, 4, 22, 9, 0, 0).unwrap(),
            archived_clicks: Vec::new(),
            count: 0,
        };
        assert_eq!(
            store.archive_path(&partition),
            PathBuf::from("/data/user_preferences_archive_20260422.json")
        );
    }

    #[test]
    fn test_archive_runs_never_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("user_preferences.json"));
        let cutoff = Utc.with_ymd_and_hms(2026, 4, 22, 9, 0, 0).unwrap();
        let partition = ArchivePartition {
            archive_date: Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
            cutoff_date: cutoff,
            archived_clicks: Vec::new(),
            count: 0,
        };

        let first = store.write_archive(&partition).unwrap();
        let second = store.write_archive(&partition).unwrap();
        let third = store.write_archive(&partition).unwrap();

        let expected = |name: &str| dir.path().join(name).display().to_string();
        assert_eq!(first, expected("user_preferences_archive_20260422.json"));
        assert_eq!(second, expected("user_preferences_archive_20260422_2.json"));
        assert_eq!(third, expected("user_preferences_archive_20260422_3.json"));
    }
}
