//! Best-effort publication date parsing.
//!
//! Feeds use a handful of date formats. Each strategy below is tried in
//! order and the first success wins; when none match the date is unknown,
//! which the scorer handles with its mid-range freshness bonus.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

type DateStrategy = fn(&str) -> Option<DateTime<Utc>>;

const STRATEGIES: &[(&str, DateStrategy)] = &[
    ("rfc2822", parse_rfc2822),
    ("rfc3339", parse_rfc3339),
    ("iso8601-offset", parse_iso8601_offset),
    ("iso8601-zulu", parse_iso8601_zulu),
    ("naive-datetime", parse_naive_datetime),
    ("naive-date", parse_naive_date),
];

/// Parse a date string in any of the known feed formats.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }
    STRATEGIES.iter().find_map(|(_, strategy)| strategy(trimmed))
}

fn parse_rfc2822(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

fn parse_iso8601_offset(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

fn parse_iso8601_zulu(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ")
        .ok()
        .map(|d| d.and_utc())
}

// Naive timestamps carry no zone; they are taken as UTC.
fn parse_naive_datetime(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|d| d.and_utc())
}

fn parse_naive_date(s: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}
