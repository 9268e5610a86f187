//! Feed parsing logic for RSS, Atom, and JSON formats.

use anyhow::{anyhow, Result};
use feed_rs::model::Entry;
use feed_rs::parser;
use std::io::Cursor;
use tracing::{debug, warn};

use super::types::{JsonFeedDocument, RawEntry};
use super::util::cleanup_xml;
use crate::TARGET_WEB_REQUEST;

/// Parse a feed body into raw entries.
///
/// JSON feeds are recognized by content type. Anything else is parsed as
/// RSS/Atom, retrying once after XML cleanup.
pub fn parse_feed(body: &str, content_type: Option<&str>, feed_url: &str) -> Result<Vec<RawEntry>> {
    if content_type.map_or(false, |ct| ct.contains("json")) {
        debug!(target: TARGET_WEB_REQUEST, "Processing as JSON feed: {}", feed_url);
        let feed: JsonFeedDocument = serde_json::from_str(body)
            .map_err(|err| anyhow!("JSON parsing error for {}: {}", feed_url, err))?;
        return Ok(feed.items.into_iter().map(RawEntry::from).collect());
    }

    debug!(target: TARGET_WEB_REQUEST, "Processing as XML feed: {}", feed_url);
    match parser::parse(Cursor::new(body)) {
        Ok(feed) => Ok(feed.entries.into_iter().map(entry_to_raw).collect()),
        Err(first_err) => {
            let cleaned_xml = cleanup_xml(body);
            if !(cleaned_xml.contains("<rss") || cleaned_xml.contains("<feed")) {
                return Err(anyhow!(
                    "Feed {} doesn't appear to be RSS or Atom: {}",
                    feed_url,
                    first_err
                ));
            }

            match parser::parse(Cursor::new(cleaned_xml)) {
                Ok(feed) => {
                    warn!(target: TARGET_WEB_REQUEST, "Feed {} parsed successfully after XML cleanup", feed_url);
                    Ok(feed.entries.into_iter().map(entry_to_raw).collect())
                }
                Err(second_err) => Err(anyhow!(
                    "Failed to parse feed {} even after cleanup. First error: {}. Second error: {}",
                    feed_url,
                    first_err,
                    second_err
                )),
            }
        }
    }
}

fn entry_to_raw(entry: Entry) -> RawEntry {
    RawEntry {
        title: entry.title.map(|t| t.content),
        link: entry.links.first().map(|link| link.href.clone()),
        published: entry.published.or(entry.updated).map(|d| d.to_rfc3339()),
        summary: entry.summary.map(|s| s.content),
    }
}
