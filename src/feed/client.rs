//! HTTP client creation and request handling for feeds.

use anyhow::{anyhow, Result};
use reqwest::header;
use tokio::time::timeout;
use tracing::debug;

use super::types::REQUEST_TIMEOUT;
use crate::TARGET_WEB_REQUEST;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub fn create_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .gzip(true)
        .redirect(reqwest::redirect::Policy::default())
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))
}

/// A fetched feed body with the headers needed to decode it.
pub struct FetchedBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
}

/// One request attempt, bounded by `REQUEST_TIMEOUT`.
pub async fn fetch_once(client: &reqwest::Client, url: &str) -> Result<FetchedBody> {
    debug!(target: TARGET_WEB_REQUEST, "Requesting {}", url);

    let response = timeout(
        REQUEST_TIMEOUT,
        client
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/feed+json, application/json, application/rss+xml, application/atom+xml, application/xml, text/xml, */*;q=0.9")
            .send(),
    )
    .await
    .map_err(|_| anyhow!("Request timed out after {} seconds", REQUEST_TIMEOUT.as_secs()))??;

    if !response.status().is_success() {
        return Err(anyhow!("Non-success status {} from {}", response.status(), url));
    }

    let header_value = |name: header::HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(|s| s.to_lowercase())
    };
    let content_type = header_value(header::CONTENT_TYPE);
    let content_encoding = header_value(header::CONTENT_ENCODING);

    let bytes = timeout(REQUEST_TIMEOUT, response.bytes())
        .await
        .map_err(|_| anyhow!("Reading body from {} timed out", url))??;

    Ok(FetchedBody {
        bytes: bytes.to_vec(),
        content_type,
        content_encoding,
    })
}
