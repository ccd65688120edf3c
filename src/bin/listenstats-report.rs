use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use listenstats::config::{Config, MAX_WINDOW_DAYS};
use listenstats::logging::init_logging;
use listenstats::report::StatsService;
use listenstats::source::ListenBrainzClient;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "listenstats-report")]
#[command(about = "Print a ListenBrainz listening report once and exit", long_about = None)]
struct Cli {
    /// Trailing window in days (defaults to HISTORY_WINDOW_DAYS)
    #[arg(
        long,
        global = true,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_WINDOW_DAYS))
    )]
    days: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the most played tracks
    Top {
        /// Number of tracks to list (defaults to REPORT_TOP_N)
        #[arg(long)]
        top: Option<usize>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show play counts for every track in the window
    Counts,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("warn");

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let client = ListenBrainzClient::from_config(&config.listenbrainz)?;
    let mut stats = StatsService::from_config(Arc::new(client), &config);
    if let Some(days) = cli.days {
        stats = stats.with_window_days(days);
    }

    match cli.command {
        Commands::Top { top, json } => {
            if let Some(top) = top {
                stats = stats.with_top_n(top);
            }
            let report = stats
                .report()
                .await
                .context("unable to retrieve listening history")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render_text());
            }
        }
        Commands::Counts => {
            let report = stats
                .with_top_n(usize::MAX)
                .report()
                .await
                .context("unable to retrieve listening history")?;

            if report.tracks.is_empty() {
                println!("No listens in the past {} days.", report.window_days);
            } else {
                println!("{:>6}  {:<35} {}", "Plays", "Artist", "Track");
                println!("{}", "-".repeat(80));
                for unit in &report.tracks {
                    println!("{:>6}  {:<35} {}", unit.count, unit.artist_name, unit.track_name);
                }
                println!("{}", "-".repeat(80));
                println!("{:>6}  total listens", report.total_listens);
            }
        }
    }

    Ok(())
}
