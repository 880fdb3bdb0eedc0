#![doc = include_str!("../README.md")]

mod cli;

use clap::Parser;
use cli::commands::run;
use cli::config::{CliArgs, RunConfig};
use cli::telemetry::init_telemetry;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    init_telemetry()?;

    let output = run(config).await?;
    println!("{output}");
    Ok(())
}
