//! Pitchshift controller - bench runner and tools
//!
//! Runs the pitch-control loop against simulated devices, or offers the
//! interactive REPL and note lookup tools.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pitchshift_ctl::{bench, cli, AppConfig};

/// Pitch controller - encoder, note mapping and display loop
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Print the note number table
    #[arg(long)]
    note_table: bool,

    /// Print the nearest note for each frequency
    #[arg(long, num_args = 1.., value_name = "HZ", allow_negative_numbers = true)]
    convert: Vec<f32>,

    /// Interactive bench
    #[arg(long)]
    repl: bool,

    /// Stop the bench loop after this many polls
    #[arg(long)]
    polls: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    if args.note_table {
        cli::print_note_table();
        return Ok(());
    }

    if !args.convert.is_empty() {
        cli::print_conversions(&args.convert);
        return Ok(());
    }

    info!("Configuration file: {}", args.config);
    let config = AppConfig::load_or_default(&args.config).await?;

    if args.repl {
        return cli::run_repl(&config);
    }

    let summary = bench::run_bench(&config, args.polls, shutdown_signal()).await?;
    info!(
        polls = summary.polls,
        detents = summary.detents,
        ratio_pushes = summary.ratio_pushes,
        frequency_updates = summary.frequency_updates,
        frames = summary.frames,
        final_offset = summary.final_offset,
        "Bench loop finished"
    );

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
