//! review-bot
//!
//! Handles a single pull request or comment event:
//!
//! ```text
//! review-bot <event.json> [config.toml]
//! ```
//!
//! The event file holds one JSON-encoded `Event`. Without an explicit
//! config path the config file is looked up in the usual places. The
//! GitHub host is taken from `GITHUB_HOST` (github.com when unset), and the
//! bot account's token from `REVIEW_BOT_TOKEN` or the other sources
//! `TokenResolver` knows.

use anyhow::{Context, Result};
use review_client::{create_client, TokenResolver};
use review_config::{find_config_file, load_config};
use review_engine::{Event, ReviewBot};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod logger;

const USAGE: &str = "usage: review-bot <event.json> [config.toml]";

fn read_event(path: &Path) -> Result<Event> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to decode event file {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let event_path = args.next().context(USAGE)?;

    let config_path = match args.next() {
        Some(path) => path,
        None => find_config_file().context("No review-bot config file found")?,
    };
    let config = load_config(&config_path)?;
    let event = read_event(&event_path)?;

    let host = std::env::var("GITHUB_HOST").ok();
    let client = Arc::new(create_client(&TokenResolver::new(), host.as_deref()).await?);
    let bot = ReviewBot::new(client.clone(), client);

    log::info!("Handling event from {}", event_path.display());
    if let Err(e) = bot.dispatch(&event, &config).await {
        log::error!("Failed to handle event: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
