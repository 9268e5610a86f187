//! Feed processing: fetching, parsing and normalizing entries into articles.

mod client;
pub mod dates;
mod fetcher;
pub mod normalizer;
mod parser;
mod types;
mod util;

pub use self::dates::parse_date;
pub use self::fetcher::{fetch_articles, fetch_source};
pub use self::normalizer::{normalize_entries, normalize_entry};
pub use self::parser::parse_feed;
pub use self::types::*;
pub use self::util::{cleanup_xml, is_valid_url};
