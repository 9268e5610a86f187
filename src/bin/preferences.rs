use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use daily_digest::config::DEFAULT_ARCHIVE_DAYS;
use daily_digest::logging::configure_logging;
use daily_digest::profile::{ClickRequest, JsonFileStore, PreferenceTracker};
use daily_digest::EngineConfig;

#[derive(Parser)]
#[command(author, version, about = "Manage the reading preference profile", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a click on a digest article
    Click {
        /// Category of the article (programming, ai, product)
        category: String,

        /// Article title
        title: String,

        /// Article URL
        url: String,

        /// AI score of the article
        #[arg(default_value = "0")]
        ai_score: f64,

        /// Topic tags
        topics: Vec<String>,

        /// Source the article came from
        #[arg(short, long, default_value = "bestblogs")]
        source: String,
    },

    /// Move clicks older than DAYS days into an archive file
    Archive {
        #[arg(default_value_t = DEFAULT_ARCHIVE_DAYS)]
        days: i64,

        /// Only list the clicks that would be archived
        #[arg(long)]
        dry_run: bool,
    },

    /// Show profile statistics
    Stats,

    /// List recorded clicks in a date range
    Query {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start_date: NaiveDate,

        /// Last day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Only show this category
        #[arg(long)]
        category: Option<String>,

        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Show category weights, top topics and today's ratio
    Analyze {
        /// Include source preferences
        #[arg(long)]
        detailed: bool,
    },
}

fn main() -> Result<()> {
    configure_logging();
    let cli = Cli::parse();

    let config = EngineConfig::load()?;
    let mut tracker = PreferenceTracker::open(config, JsonFileStore::from_env())
        .context("Failed to open preference profile")?;

    match cli.command {
        Commands::Click {
            category,
            title,
            url,
            ai_score,
            topics,
            source,
        } => {
            let record = tracker.record_click(ClickRequest {
                category,
                title,
                url,
                ai_score,
                topics,
                source,
            })?;
            println!("Recorded click: {}", record.article_title);
            println!("  category: {}", record.category);
            if !record.topics.is_empty() {
                println!("  topics: {}", record.topics.join(", "));
            }
            println!("  ai score: {}", record.ai_score);
        }

        Commands::Archive { days, dry_run } => {
            if dry_run {
                let pending = tracker.preview_archive(days, Utc::now())?;
                println!("Would archive {} clicks older than {} days", pending.len(), days);
                for click in pending.iter().take(10) {
                    let title: String = click.article_title.chars().take(50).collect();
                    println!("  - {}: {}", click.timestamp.to_rfc3339(), title);
                }
                if pending.len() > 10 {
                    println!("  ... and {} more", pending.len() - 10);
                }
            } else {
                let outcome = tracker.archive(days)?;
                match outcome.location {
                    Some(location) => println!(
                        "Archived {} clicks to {} ({} remain)",
                        outcome.archived, location, outcome.retained
                    ),
                    None => println!("No clicks older than {} days to archive", days),
                }
            }
        }

        Commands::Stats => {
            let stats = tracker.stats();
            println!("Total clicks: {}", stats.total_clicks);
            println!("Clicks in the last 30 days: {}", stats.recent_clicks_30_days);
            println!("Topics clicked: {}", stats.total_topics);
            println!("Active sources: {}", stats.active_sources);
        }

        Commands::Query {
            start_date,
            end_date,
            category,
            limit,
        } => {
            let end_date = end_date.unwrap_or_else(|| Utc::now().date_naive());
            let clicks =
                tracker
                    .profile()
                    .clicks_between(start_date, end_date, category.as_deref(), limit);

            println!("Clicks from {} to {}: {}\n", start_date, end_date, clicks.len());
            for (idx, click) in clicks.iter().enumerate() {
                println!("{}. [{}] {}", idx + 1, click.timestamp.to_rfc3339(), click.article_title);
                println!(
                    "   category: {} | topics: {} | source: {}",
                    click.category,
                    click.topics.join(", "),
                    click.source
                );
                println!("   ai score: {}\n", click.ai_score);
            }
        }

        Commands::Analyze { detailed } => {
            let analysis = tracker.analyze();
            print!("{}", analysis.summary(tracker.config(), detailed));
        }
    }

    Ok(())
}
