/// Print the schedule the ticker would show, straight from the configured
/// spreadsheet and sports ticker.
///
/// Usage: schedule-preview [--now 2024-06-10T09:00] [--json]
///   --now   : Pretend it is this local time (default: now)
///   --json  : Print entries as JSON instead of a table

use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use clap::Parser;

use scs_tv::{
    config::Config,
    services::{
        clock, render,
        schedule::{self, ParsedDate},
    },
    AppState,
};

#[derive(Parser)]
#[command(name = "schedule-preview", about = "Preview the derived SCS TV schedule")]
struct Args {
    /// Local date or date-time to use as "now" (YYYY-MM-DD or YYYY-MM-DDTHH:MM)
    #[arg(long, value_parser = parse_now)]
    now: Option<NaiveDateTime>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn parse_now(text: &str) -> Result<NaiveDateTime, String> {
    match schedule::parse_date(text) {
        ParsedDate::Parsed { at, .. } => Ok(at),
        ParsedDate::Unparseable(_) => Err(format!("unrecognized date: {text}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let now = args.now.unwrap_or_else(|| Local::now().naive_local());

    let config = Config::from_env()?;
    let team_name = config.branding.team_name.clone();
    let state = AppState::new(config)?;

    if !state.sheets.is_configured() && !state.contentful.is_configured() {
        tracing::warn!("Neither Google Sheets nor Contentful is configured; the schedule will be empty");
    }

    let (tabs, ticker) = tokio::join!(state.sheets.all_tabs(), state.contentful.sports_ticker());
    let entries = schedule::derive_schedule(&tabs, ticker.as_ref(), now);
    tracing::info!("{} entries around {}", entries.len(), now.format("%Y-%m-%d %H:%M"));

    if args.json {
        let json = serde_json::to_string_pretty(&entries).context("Failed to encode schedule")?;
        println!("{json}");
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", render::NO_GAMES);
        return Ok(());
    }
    for entry in &entries {
        let detail = render::game_line(entry, &team_name)
            .or_else(|| entry.place.and_then(clock::place_text).map(|p| format!("Final: {p}")))
            .unwrap_or_default();
        println!(
            "{:<22} {:<24} {:<40} {}",
            clock::format_ticker_date(entry.starts_at, entry.all_day),
            entry.label,
            detail,
            entry.location.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
