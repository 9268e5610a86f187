//! Sequential feed fetching.

use anyhow::{anyhow, Result};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::client::{create_http_client, fetch_once};
use super::normalizer::normalize_entries;
use super::parser::parse_feed;
use super::types::{RawEntry, MAX_RETRIES, RETRY_DELAY};
use super::util::{decompress_body, is_valid_url};
use crate::article::Article;
use crate::config::FeedSource;
use crate::TARGET_WEB_REQUEST;

/// Fetch and parse one source, retrying up to `MAX_RETRIES` times.
pub async fn fetch_source(client: &reqwest::Client, source: &FeedSource) -> Result<Vec<RawEntry>> {
    if !is_valid_url(&source.url) {
        return Err(anyhow!("Invalid URL for {}: {}", source.id, source.url));
    }

    let mut attempts = 0;
    loop {
        attempts += 1;
        let result = fetch_once(client, &source.url).await.and_then(|body| {
            let bytes = decompress_body(&body.bytes, body.content_encoding.as_deref(), &source.url);
            let text = String::from_utf8(bytes)
                .map_err(|_| anyhow!("Failed to decode content as UTF-8 from {}", source.url))?;
            parse_feed(&text, body.content_type.as_deref(), &source.url)
        });

        match result {
            Ok(entries) => return Ok(entries),
            Err(err) if attempts < MAX_RETRIES => {
                warn!(target: TARGET_WEB_REQUEST, "Attempt {} for {} failed: {}", attempts, source.id, err);
                sleep(RETRY_DELAY).await;
            }
            Err(err) => {
                return Err(err.context(format!("Max retries reached for {}", source.id)));
            }
        }
    }
}

/// Fetch every configured source in order and normalize the entries.
///
/// A source that keeps failing is skipped; the batch always completes with
/// whatever the other sources returned.
pub async fn fetch_articles(sources: &[FeedSource]) -> Result<Vec<Article>> {
    let client = create_http_client()?;
    let mut articles = Vec::new();

    for source in sources {
        debug!(target: TARGET_WEB_REQUEST, "Loading feed {} from {}", source.id, source.url);
        match fetch_source(&client, source).await {
            Ok(entries) => {
                let normalized = normalize_entries(&entries, source);
                info!(target: TARGET_WEB_REQUEST, "Fetched {}: {} entries, {} usable", source.name, entries.len(), normalized.len());
                articles.extend(normalized);
            }
            Err(err) => {
                error!(target: TARGET_WEB_REQUEST, "Skipping {}: {:#}", source.name, err);
            }
        }
    }

    info!(target: TARGET_WEB_REQUEST, "Fetched {} articles from {} sources", articles.len(), sources.len());
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str, url: &str) -> FeedSource {
        FeedSource {
            id: id.to_string(),
            name: id.to_string(),
            url: url.to_string(),
            category: "programming".to_string(),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_fails_without_retrying() {
        let client = create_http_client().unwrap();
        let err = fetch_source(&client, &source("ftp_feed", "ftp://example.com/feed.xml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[tokio::test]
    async fn test_failing_sources_are_skipped() {
        let sources = vec![
            source("ftp_feed", "ftp://example.com/feed.xml"),
            source("broken", "not a url"),
        ];
        let articles = fetch_articles(&sources).await.unwrap();
        assert!(articles.is_empty());
    }
}
