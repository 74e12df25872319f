//! CLI for the seqchain demo
//!
//! Runs the sample chain (a pending step, a dependent step with a handler and
//! a `foreach` step) and prints the guaranteed result as JSON.

pub mod demo;

use clap::Parser;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// seqchain - sequential async chains with guaranteed results
#[derive(Debug, Parser)]
#[command(name = "seqchain")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Force the given step (1-3) to fail
    #[arg(long, value_name = "N")]
    pub fail_step: Option<usize>,

    /// Recover step 2 with a replacement value instead of the whole result set
    #[arg(long)]
    pub step_recovery: bool,

    /// Resolve failures with the default fallback instead of an explicit one
    #[arg(long)]
    pub use_default: bool,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging)?;

    info!(?cli, "Running demo chain");
    let output = demo::run(&cli, config.chain).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
