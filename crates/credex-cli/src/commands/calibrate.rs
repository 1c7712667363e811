//! Calibrate command implementation.
//!
//! Calibrates a credit curve to the quoted CDS of a market file and shows
//! each node with the quote it reprices.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use credex_cds::prelude::*;

use super::{apply_overrides, FormulaChoice, MethodChoice};
use crate::cli::OutputFormat;
use crate::input::MarketFile;
use crate::output::{display_bps, display_value, print_header, print_output};

/// Arguments for the calibrate command.
#[derive(Args, Debug)]
pub struct CalibrateArgs {
    /// Path to the JSON market file
    #[arg(short, long, env = "CREDEX_MARKET")]
    pub market: PathBuf,

    /// Calibration method, overriding the market file
    #[arg(long, value_enum)]
    pub method: Option<MethodChoice>,

    /// Accrual-on-default formula, overriding the market file
    #[arg(long, value_enum)]
    pub formula: Option<FormulaChoice>,
}

/// One calibrated node.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct NodeRow {
    #[tabled(rename = "Maturity")]
    pub maturity: f64,
    #[tabled(rename = "Quote")]
    pub quote: String,
    #[tabled(rename = "Knot", display_with = "display_value")]
    pub knot_time: f64,
    #[tabled(rename = "Hazard", display_with = "display_value")]
    pub hazard_rate: f64,
    #[tabled(rename = "Survival", display_with = "display_value")]
    pub survival_probability: f64,
    #[tabled(rename = "Par Spread", display_with = "display_bps")]
    pub par_spread: f64,
    #[tabled(rename = "Residual", display_with = "display_value")]
    pub residual: f64,
}

/// Executes the calibrate command.
pub fn execute(args: CalibrateArgs, format: OutputFormat) -> Result<()> {
    let mut file = MarketFile::load(&args.market)?;
    file.config = apply_overrides(file.config, args.method, args.formula);
    let market = file.market()?;
    let cc = market.calibrate()?;

    let pricer = market.config.pricer();
    let converter = market.config.quote_converter();
    let yc = &market.yield_curve;

    let mut rows = Vec::with_capacity(market.cds.len());
    for (i, (cds, quote)) in market.cds.iter().zip(&market.quotes).enumerate() {
        let (premium, puf) = converter.premium_and_puf(cds, quote, yc)?;
        let residual = pricer.points_upfront(cds, yc, &cc, premium)? - puf;
        rows.push(NodeRow {
            maturity: file.cds[i].terms.maturity,
            quote: quote.name().to_string(),
            knot_time: cc.times()[i],
            hazard_rate: cc.zero_rates()[i],
            survival_probability: cc.survival_probability(cc.times()[i]),
            par_spread: pricer.par_spread(cds, yc, &cc)?,
            residual,
        });
    }

    print_header(
        &format!(
            "Credit curve ({} calibration, {} accrual on default)",
            market.config.calibration_method, market.config.accrual_formula
        ),
        format,
    );
    print_output(&rows, format)
}
