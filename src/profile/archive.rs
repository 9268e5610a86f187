//! Moving old clicks out of the live history.

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::types::{ArchivePartition, ClickRecord};

/// Result of one archival run. `archived == 0` means nothing was written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveOutcome {
    pub archived: usize,
    pub retained: usize,
    pub cutoff: DateTime<Utc>,
    pub location: Option<String>,
}

/// `now` minus `days` whole days. Negative or out-of-range ages are rejected.
pub fn archive_cutoff(days: i64, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if days < 0 {
        bail!("Archive age must not be negative, got {} days", days);
    }
    Duration::try_days(days)
        .and_then(|age| now.checked_sub_signed(age))
        .ok_or_else(|| anyhow!("Archive age of {} days is out of range", days))
}

/// Split `history` into records strictly older than `cutoff` and the rest,
/// both in their original order.
pub fn split_history(
    history: Vec<ClickRecord>,
    cutoff: DateTime<Utc>,
) -> (Vec<ClickRecord>, Vec<ClickRecord>) {
    history
        .into_iter()
        .partition(|click| click.timestamp < cutoff)
}

impl ArchivePartition {
    pub fn new(
        archive_date: DateTime<Utc>,
        cutoff_date: DateTime<Utc>,
        archived_clicks: Vec<ClickRecord>,
    ) -> Self {
        Self {
            archive_date,
            cutoff_date,
            count: archived_clicks.len(),
            archived_clicks,
        }
    }
}
