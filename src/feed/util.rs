//! Utility functions for feed processing.

use std::io::Read;
use tracing::debug;

use crate::TARGET_WEB_REQUEST;

/// Helper function to validate a URL
pub fn is_valid_url(url: &str) -> bool {
    if let Ok(parsed) = url::Url::parse(url) {
        parsed.scheme() == "http" || parsed.scheme() == "https"
    } else {
        false
    }
}

/// Root markers a feed document may start with, in search order.
const FEED_MARKERS: [&str; 3] = ["<?xml", "<rss", "<feed"];

/// HTML entities seen in the configured feeds that XML parsers reject.
const HTML_ENTITIES: [(&str, &str); 5] = [
    ("&nbsp;", "&#160;"),
    ("&mdash;", "&#8212;"),
    ("&rsquo;", "&#8217;"),
    ("&ldquo;", "&#8220;"),
    ("&rdquo;", "&#8221;"),
];

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Best-effort repair of a feed that failed to parse: drop leading junk,
/// map stray HTML entities, strip characters XML forbids and make sure an
/// XML declaration is present.
pub fn cleanup_xml(xml: &str) -> String {
    let body = xml.trim().trim_start_matches('\u{FEFF}');
    let start = FEED_MARKERS
        .iter()
        .find_map(|marker| body.find(marker))
        .unwrap_or(0);

    let mut cleaned: String = body[start..].chars().filter(|&c| is_xml_char(c)).collect();
    for (entity, numeric) in HTML_ENTITIES {
        cleaned = cleaned.replace(entity, numeric);
    }

    if cleaned.starts_with("<?xml") {
        cleaned
    } else {
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", cleaned)
    }
}

/// Decode a response body according to its content encoding, falling back
/// to sniffing gzip/zlib/deflate and finally the raw bytes.
pub fn decompress_body(bytes: &[u8], content_encoding: Option<&str>, feed_url: &str) -> Vec<u8> {
    // Already-decoded markup or JSON
    let first = bytes.iter().copied().find(|b| !b.is_ascii_whitespace());
    if matches!(first, Some(b'<') | Some(b'{') | Some(0xEF)) {
        return bytes.to_vec();
    }

    if content_encoding == Some("br") {
        let mut decoded = Vec::new();
        let mut reader = brotli::Decompressor::new(bytes, 4096);
        if reader.read_to_end(&mut decoded).is_ok() && !decoded.is_empty() {
            debug!(target: TARGET_WEB_REQUEST, "Decompressed brotli content from {}", feed_url);
            return decoded;
        }
    }

    let mut decoded = Vec::new();
    if flate2::read::GzDecoder::new(bytes).read_to_end(&mut decoded).is_ok() && !decoded.is_empty() {
        debug!(target: TARGET_WEB_REQUEST, "Decompressed gzip content from {}", feed_url);
        return decoded;
    }

    let mut decoded = Vec::new();
    if flate2::read::ZlibDecoder::new(bytes).read_to_end(&mut decoded).is_ok() && !decoded.is_empty() {
        debug!(target: TARGET_WEB_REQUEST, "Decompressed zlib content from {}", feed_url);
        return decoded;
    }

    let mut decoded = Vec::new();
    if flate2::read::DeflateDecoder::new(bytes).read_to_end(&mut decoded).is_ok() && !decoded.is_empty() {
        debug!(target: TARGET_WEB_REQUEST, "Decompressed deflate content from {}", feed_url);
        return decoded;
    }

    bytes.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://hnrss.org/frontpage"));
        assert!(!is_valid_url("ftp://example.com/feed"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn test_cleanup_xml() {
        let cleaned = cleanup_xml("  junk<rss><item>a&nbsp;b</item></rss>");
        assert!(cleaned.starts_with("<?xml"));
        assert!(cleaned.contains("<rss><item>a&#160;b</item></rss>"));
        assert!(!cleaned.contains("junk"));

        let declared = cleanup_xml("<?xml version=\"1.0\"?><feed>a &mdash; b\u{0001}</feed>");
        assert_eq!(declared, "<?xml version=\"1.0\"?><feed>a &#8212; b</feed>");
    }

    #[test]
    fn test_decompress_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"<rss></rss>").unwrap();
        let compressed = encoder.finish().unwrap();
        assert_eq!(decompress_body(&compressed, Some("gzip"), "test"), b"<rss></rss>");
    }
}
