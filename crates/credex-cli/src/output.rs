//! Output formatting utilities.

use colored::Colorize;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::cli::OutputFormat;

/// Formats and prints output based on the specified format.
pub fn print_output<T: Serialize + Tabled>(data: &[T], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_table(data),
        OutputFormat::Json => print_json(data),
        OutputFormat::Csv => print_csv(data),
        OutputFormat::Minimal => print_minimal(data),
    }
}

/// Prints data as a formatted table.
fn print_table<T: Tabled>(data: &[T]) -> anyhow::Result<()> {
    if data.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let table = Table::new(data)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .to_string();

    println!("{table}");
    Ok(())
}

/// Prints data as JSON.
fn print_json<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Prints data as CSV.
fn print_csv<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for item in data {
        wtr.serialize(item)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Prints minimal output (first value only).
fn print_minimal<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    if let Some(first) = data.first() {
        println!("{}", serde_json::to_string(first)?);
    }
    Ok(())
}

/// Formats a rate as basis points.
pub fn format_bps(value: f64) -> String {
    format!("{:.4} bps", value * 10_000.0)
}

/// Formats a fraction of notional as a percentage.
pub fn format_percent(value: f64) -> String {
    format!("{:.6}%", value * 100.0)
}

/// Tabled display helper for plain numbers.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn display_value(value: &f64) -> String {
    format!("{value:.8}")
}

/// Tabled display helper for rates in basis points.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn display_bps(value: &f64) -> String {
    format_bps(*value)
}

/// Tabled display helper for optional values.
#[allow(clippy::ref_option)]
pub fn display_optional(value: &Option<f64>) -> String {
    value.as_ref().map_or_else(|| "n/a".to_string(), display_value)
}

/// Prints a header for a section when the output is a table.
pub fn print_header(title: &str, format: OutputFormat) {
    if format == OutputFormat::Table {
        println!("\n{}", title.bold().underline());
    }
}

/// A key-value pair for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct KeyValue {
    #[tabled(rename = "Metric")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    /// Creates a new key-value pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a key-value pair formatted as basis points.
    pub fn from_bps(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, format_bps(value))
    }

    /// Creates a key-value pair formatted as a percentage.
    pub fn from_percent(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, format_percent(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting() {
        assert_eq!(format_bps(0.0125), "125.0000 bps");
        assert_eq!(format_percent(0.025), "2.500000%");
        assert_eq!(display_optional(&None), "n/a");
        assert_eq!(display_optional(&Some(0.5)), "0.50000000");
        assert_eq!(display_bps(&0.0001), "1.0000 bps");
        assert_eq!(KeyValue::from_bps("spread", 0.01).value, "100.0000 bps");
    }
}
