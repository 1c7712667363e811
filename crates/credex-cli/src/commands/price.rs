//! Price command implementation.
//!
//! Prices every instrument of a market file off its yield curve and either
//! the given credit curve or one calibrated to the quoted CDS.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use credex_cds::prelude::*;

use super::{apply_overrides, FormulaChoice, MethodChoice, PriceTypeChoice};
use crate::cli::OutputFormat;
use crate::input::MarketFile;
use crate::output::{display_optional, display_value, print_header, print_output};

/// Arguments for the price command.
#[derive(Args, Debug)]
pub struct PriceArgs {
    /// Path to the JSON market file
    #[arg(short, long, env = "CREDEX_MARKET")]
    pub market: PathBuf,

    /// Clean or dirty values
    #[arg(long, value_enum, default_value = "clean")]
    pub price_type: PriceTypeChoice,

    /// Calibration method, overriding the market file
    #[arg(long, value_enum)]
    pub method: Option<MethodChoice>,

    /// Accrual-on-default formula, overriding the market file
    #[arg(long, value_enum)]
    pub formula: Option<FormulaChoice>,
}

/// One priced value.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PriceRow {
    #[tabled(rename = "Instrument")]
    pub instrument: String,
    #[tabled(rename = "Maturity")]
    pub maturity: f64,
    #[tabled(rename = "PV", display_with = "display_value")]
    pub present_value: f64,
    #[tabled(rename = "RPV01", display_with = "display_optional")]
    pub risky_annuity: Option<f64>,
    #[tabled(rename = "Par Spread", display_with = "display_optional")]
    pub par_spread: Option<f64>,
}

/// Evaluates a measure that some instruments do not define.
fn optional_measure(result: CdsResult<Vec<f64>>, len: usize) -> CdsResult<Vec<Option<f64>>> {
    match result {
        Ok(values) => Ok(values.into_iter().map(Some).collect()),
        Err(CdsError::UnsupportedMeasure { .. }) => Ok(vec![None; len]),
        Err(e) => Err(e),
    }
}

/// Executes the price command.
pub fn execute(args: PriceArgs, format: OutputFormat) -> Result<()> {
    let mut file = MarketFile::load(&args.market)?;
    file.config = apply_overrides(file.config, args.method, args.formula);
    let market = file.market()?;
    let cc = market.credit_curve(file.credit_curve.as_ref())?;
    let yc = &market.yield_curve;
    let pricer = market.config.instrument_pricer();
    let price_type = PriceType::from(args.price_type);

    let mut rows = Vec::new();
    for (i, input) in file.instruments.iter().enumerate() {
        let instrument = input.to_instrument()?;
        let n = instrument.num_values();
        let pv = pricer.present_value(&instrument, yc, &cc, price_type)?;
        let annuity = optional_measure(pricer.risky_annuity(&instrument, yc, &cc, price_type), n)?;
        let spreads = optional_measure(pricer.par_spread(&instrument, yc, &cc), n)?;
        debug!(index = i, kind = instrument.kind(), values = n, "priced instrument");

        for (k, maturity) in input.maturities().into_iter().enumerate() {
            rows.push(PriceRow {
                instrument: input.label(i),
                maturity,
                present_value: pv[k],
                risky_annuity: annuity[k],
                par_spread: spreads[k],
            });
        }
    }

    print_header(&format!("Instruments ({price_type:?})"), format);
    print_output(&rows, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_measure() {
        let unsupported = Err(CdsError::UnsupportedMeasure {
            measure: "risky annuity",
            instrument: "bond",
        });
        assert_eq!(optional_measure(unsupported, 2).unwrap(), vec![None, None]);
        assert_eq!(optional_measure(Ok(vec![0.5]), 1).unwrap(), vec![Some(0.5)]);
        assert!(optional_measure(Err(CdsError::expired(-1.0)), 1).is_err());
    }
}
