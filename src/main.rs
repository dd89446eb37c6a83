use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use arxiv_skeeter::bluesky::BlueskyClient;
use arxiv_skeeter::bot::Bot;
use arxiv_skeeter::config::Config;
use arxiv_skeeter::rss::FeedClient;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        subject = %config.arxiv_subject,
        feed_url = %config.feed_url(),
        archive = %config.archive_path.display(),
        "Starting arxiv-skeeter"
    );

    let feed = FeedClient::new(&config)?;
    let publisher = BlueskyClient::new(&config)?;
    let bot = Bot::new(&config, feed, publisher);

    let summary = bot.run_once().await?;

    info!(
        fetched = summary.fetched,
        published = summary.published,
        placeholder = summary.placeholder_posted,
        archive_size = summary.archive_size,
        persisted = summary.persisted,
        "Run complete"
    );

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,arxiv_skeeter=debug"));

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
