//! Convert command implementation.
//!
//! Converts one CDS quote between points upfront, quoted spread and clean
//! price, on a flat yield curve or the yield curve of a market file.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Args};
use tracing::debug;

use credex_cds::prelude::*;

use super::FormulaChoice;
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::input::MarketFile;
use crate::output::{print_header, print_output, KeyValue};

/// Arguments for the convert command.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("quote").required(true).args(["puf", "quoted_spread", "price"])))]
#[command(group(ArgGroup::new("curve").required(true).args(["rate", "market"])))]
pub struct ConvertArgs {
    /// Maturity in years from today
    #[arg(long, allow_hyphen_values = true)]
    pub maturity: f64,

    /// Start of the first accrual period in years (negative if in the past)
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    pub accrual_start: f64,

    /// Standard running coupon, e.g. 0.01 for 100bp
    #[arg(short, long)]
    pub coupon: f64,

    /// Recovery rate
    #[arg(long, default_value = "0.4")]
    pub recovery: f64,

    /// Points upfront as a fraction of notional
    #[arg(long, allow_hyphen_values = true)]
    pub puf: Option<f64>,

    /// Quoted spread, e.g. 0.015 for 150bp
    #[arg(long)]
    pub quoted_spread: Option<f64>,

    /// Clean price as a fraction of par
    #[arg(long)]
    pub price: Option<f64>,

    /// Flat continuously compounded yield curve rate
    #[arg(short, long, allow_hyphen_values = true)]
    pub rate: Option<f64>,

    /// Take the yield curve from a market file instead
    #[arg(short, long)]
    pub market: Option<PathBuf>,

    /// Accrual-on-default formula
    #[arg(long, value_enum)]
    pub formula: Option<FormulaChoice>,
}

impl ConvertArgs {
    fn yield_curve(&self) -> Result<IsdaYieldCurve> {
        match (&self.market, self.rate) {
            (Some(path), _) => Ok(MarketFile::load(path)?.yield_curve.yield_curve()?),
            (None, Some(rate)) => Ok(IsdaYieldCurve::flat(rate)?),
            (None, None) => Err(CliError::MissingInput("--rate or --market".into()).into()),
        }
    }

    fn quote(&self) -> Result<CdsQuoteConvention> {
        let coupon = self.coupon;
        if !coupon.is_finite() || coupon < 0.0 {
            return Err(CliError::InvalidArgument(format!("coupon must be non-negative, got {coupon}")).into());
        }
        if let Some(puf) = self.puf {
            Ok(CdsQuoteConvention::PointsUpFront { coupon, puf })
        } else if let Some(quoted_spread) = self.quoted_spread {
            Ok(CdsQuoteConvention::QuotedSpread {
                coupon,
                quoted_spread,
            })
        } else if let Some(price) = self.price {
            Ok(CdsQuoteConvention::PointsUpFront {
                coupon,
                puf: MarketQuoteConverter::price_to_puf(price),
            })
        } else {
            Err(CliError::MissingInput("--puf, --quoted-spread or --price".into()).into())
        }
    }
}

/// Executes the convert command.
pub fn execute(args: ConvertArgs, format: OutputFormat) -> Result<()> {
    let yc = args.yield_curve()?;
    let quote = args.quote()?;
    let cds = CdsTerms::new(args.accrual_start, args.maturity)
        .with_recovery_rate(args.recovery)
        .to_analytic()?;
    let formula: AccrualOnDefaultFormula = args.formula.map(Into::into).unwrap_or_default();
    let converter = MarketQuoteConverter::new(AnalyticCdsPricer::new(formula));

    let (premium, puf) = converter.premium_and_puf(&cds, &quote, &yc)?;
    let quoted_spread = converter.puf_to_quoted_spread(&cds, premium, puf, &yc)?;
    debug!(premium, puf, quoted_spread, "converted quote");

    let rows = vec![
        KeyValue::from_bps("Coupon", premium),
        KeyValue::from_percent("Points Upfront", puf),
        KeyValue::from_bps("Quoted Spread", quoted_spread),
        KeyValue::from_percent("Clean Price", MarketQuoteConverter::puf_to_price(puf)),
        KeyValue::new("Accrued Fraction", format!("{:.8}", cds.accrued_yf())),
        KeyValue::from_percent("Accrued Premium", cds.accrued_premium(premium)),
    ];

    print_header(&format!("{} quote, {:.2}y", quote.name(), args.maturity), format);
    print_output(&rows, format)
}

