//! # econwatch
//!
//! Economic calendar alerts for Discord. Scrapes the MarketWatch calendar
//! once a day, keeps a JSON snapshot, and posts a 30-minute and a 1-minute
//! warning ahead of every event group, editing the final warning in place
//! with the published results.
//!
//! Usage:
//!   econwatch run                 # schedule alerts and run the daily loop
//!   econwatch scrape              # one-shot scrape + save, then exit
//!   econwatch --config path run   # custom config file

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use econwatch_channels::DiscordChannel;
use econwatch_core::{EconConfig, EventSource};
use econwatch_notifier::cron::CronSchedule;
use econwatch_notifier::Notifier;
use econwatch_source::{CalendarScraper, CalendarSource, EventStore};

#[derive(Parser)]
#[command(name = "econwatch", version, about = "Economic calendar alerts for Discord")]
struct Cli {
    /// Path to config file (default: ~/.econwatch/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Schedule alerts from the stored snapshot and run the daily scrape loop
    Run,
    /// Scrape the calendar once, save the snapshot, and exit
    Scrape,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "econwatch=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => EconConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EconConfig::load().context("loading config")?,
    };

    let source = Arc::new(CalendarSource::new(
        CalendarScraper::new(config.source.clone()),
        EventStore::new(&config.store.resolved_dir()),
    ));

    match cli.command.unwrap_or(Command::Run) {
        Command::Scrape => scrape_once(source.as_ref()).await,
        Command::Run => run(config, source).await,
    }
}

/// Manual rescrape: fetch, save on a non-empty result, print a summary.
async fn scrape_once(source: &CalendarSource) -> Result<()> {
    let events = source.fetch_events().await?;
    if events.is_empty() {
        tracing::warn!("Scrape returned no events, snapshot left untouched");
        return Ok(());
    }
    source.save_events(&events).await?;
    tracing::info!("Saved {} events to the snapshot", events.len());
    Ok(())
}

async fn run(config: EconConfig, source: Arc<CalendarSource>) -> Result<()> {
    let sink = Arc::new(DiscordChannel::new(config.discord.clone()));
    let notifier = Arc::new(Notifier::new(
        config.notifier.clone(),
        source.clone(),
        sink,
    ));

    // Alerts for whatever is already in the snapshot.
    notifier.run_scheduling().await;

    let schedule = CronSchedule::parse(&config.notifier.daily_scrape_cron)
        .context("invalid notifier.daily_scrape_cron")?;
    tracing::info!(
        "Daily scrape loop started ({})",
        config.notifier.daily_scrape_cron
    );

    loop {
        let now = chrono::Utc::now();
        let Some(next) = schedule.next_after(now) else {
            anyhow::bail!("cron schedule yielded no next run");
        };
        let delay = (next - now).to_std().unwrap_or_default();
        tracing::info!("Next scrape at {next} (in {:.0}s)", delay.as_secs_f64());
        tokio::time::sleep(delay).await;

        match source.fetch_events().await {
            Ok(events) if events.is_empty() => {
                tracing::warn!("Daily scrape returned no events, keeping previous schedule");
            }
            Ok(events) => match source.save_events(&events).await {
                Ok(()) => {
                    tracing::info!("Daily scrape saved {} events", events.len());
                    notifier.run_scheduling().await;
                }
                // a failed save must not reschedule from a stale snapshot
                Err(e) => tracing::error!("Failed to persist daily scrape: {e}"),
            },
            Err(e) => tracing::error!("Daily scrape failed: {e}"),
        }
    }
}
