#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Endless Assault headless under the autopilot.

mod config;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use endless_assault_core::Tuning;
use endless_assault_world::{query, World, DEFAULT_SEED};
use tracing_subscriber::EnvFilter;

use crate::session::SessionOptions;

/// Runs an autopiloted survival session and prints a summary.
#[derive(Debug, Parser)]
#[command(name = "endless-assault", version)]
struct Cli {
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,
    /// Seed for the terrain and the simulation random stream.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Frame length in milliseconds; longer frames are clamped by the world.
    #[arg(long = "dt-ms", default_value_t = 16)]
    dt_ms: u64,
    /// TOML file overriding tuning values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the effective tuning as TOML and exit.
    #[arg(long)]
    print_config: bool,
    /// Chunks of obstacles scattered in every direction around the spawn.
    #[arg(long, default_value_t = 3)]
    scatter_radius: i32,
    /// Log filter directive, overridden by `RUST_LOG`.
    #[arg(long, default_value = "info")]
    log: String,
}

/// Entry point for the Endless Assault command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log)?;

    let tuning = match &cli.config {
        Some(path) => config::load_tuning(path)?,
        None => Tuning::default(),
    };

    if cli.print_config {
        print!("{}", config::render_tuning(&tuning)?);
        return Ok(());
    }

    println!("{}", query::welcome_banner(&World::new()));
    let options = SessionOptions {
        seed: cli.seed,
        ticks: cli.ticks,
        frame: Duration::from_millis(cli.dt_ms),
        scatter_radius: cli.scatter_radius,
    };
    let summary = session::run(tuning, &options)?;
    println!("{summary}");
    Ok(())
}

fn init_logging(directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .with_context(|| format!("invalid log filter `{directive}`"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
