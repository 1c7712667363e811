//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{CalibrateArgs, ConvertArgs, PriceArgs};

/// Credex - ISDA standard model CDS analytics CLI
#[derive(Parser)]
#[command(name = "credex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Log calibration progress at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Calibrate a credit curve to CDS quotes
    Calibrate(CalibrateArgs),

    /// Price CDS, CDS term structures and bonds
    Price(PriceArgs),

    /// Convert between points upfront, quoted spread and price
    Convert(ConvertArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// Minimal output (just the first row)
    Minimal,
}
