//! Credex CLI - Command-line interface for ISDA CDS analytics.
//!
//! # Usage
//!
//! ```bash
//! # Calibrate a credit curve to the quotes in a market file
//! credex calibrate --market market.json
//!
//! # Price the instruments in a market file
//! credex price --market market.json --price-type dirty
//!
//! # Convert an upfront quote to a quoted spread on a flat 3% yield curve
//! credex convert --maturity 5 --coupon 0.01 --puf 0.025 --rate 0.03
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`; `--verbose`
//! lowers the default level to `debug`.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod error;
mod input;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "credex_cds=debug,credex_cli=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let format = cli.format;

    match cli.command {
        Commands::Calibrate(args) => commands::calibrate::execute(args, format)?,
        Commands::Price(args) => commands::price::execute(args, format)?,
        Commands::Convert(args) => commands::convert::execute(args, format)?,
    }

    Ok(())
}
