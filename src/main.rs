use anyhow::{bail, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use daily_digest::digest::build_digest;
use daily_digest::environment::get_env_var_as_vec;
use daily_digest::feed::fetch_articles;
use daily_digest::logging::configure_logging;
use daily_digest::profile::{JsonFileStore, PreferenceTracker};
use daily_digest::{EngineConfig, TARGET_DIGEST};

/// Fetch the configured feeds and print today's personalized digest as JSON.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of articles in the digest (overrides the configured value)
    #[arg(short, long)]
    total: Option<usize>,

    /// Only fetch these source ids (also read from DIGEST_SOURCES, comma separated)
    #[arg(short, long)]
    source: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();
    let cli = Cli::parse();

    let mut config = EngineConfig::load()?;
    if let Some(total) = cli.total {
        config.articles_per_day = total;
    }

    let mut wanted = cli.source;
    if wanted.is_empty() {
        wanted = get_env_var_as_vec("DIGEST_SOURCES", ',');
    }
    let sources: Vec<_> = if wanted.is_empty() {
        config.feeds.clone()
    } else {
        for id in &wanted {
            if config.feed(id).is_none() {
                warn!(target: TARGET_DIGEST, "Unknown source id {}, ignoring", id);
            }
        }
        config
            .feeds
            .iter()
            .filter(|f| wanted.contains(&f.id))
            .cloned()
            .collect()
    };
    if sources.is_empty() {
        bail!("No feed sources to fetch");
    }

    let tracker = PreferenceTracker::open(config.clone(), JsonFileStore::from_env())?;

    let articles = fetch_articles(&sources).await?;
    if articles.is_empty() {
        warn!(target: TARGET_DIGEST, "No articles fetched, the digest will be empty");
    }

    let digest = build_digest(&config, tracker.profile(), articles, Utc::now());
    info!(target: TARGET_DIGEST, "Digest ready with {} articles", digest.article_count());

    println!("{}", serde_json::to_string_pretty(&digest)?);
    Ok(())
}
