//! End-to-end tests of the `credex` binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::NamedTempFile;

const MARKET: &str = r#"{
    "config": { "calibration_method": "simple" },
    "yield_curve": { "times": [1.0, 3.0, 5.0, 10.0], "rates": [0.02, 0.022, 0.025, 0.03] },
    "cds": [
        { "terms": { "accrual_start": -0.1, "maturity": 1.0 },
          "quote": { "type": "par_spread", "spread": 0.005 } },
        { "terms": { "accrual_start": -0.1, "maturity": 3.0 },
          "quote": { "type": "quoted_spread", "coupon": 0.01, "quoted_spread": 0.008 } },
        { "terms": { "accrual_start": -0.1, "maturity": 5.0 },
          "quote": { "type": "points_up_front", "coupon": 0.01, "puf": 0.01 } }
    ],
    "instruments": [
        { "type": "cds", "terms": { "accrual_start": 0.0, "maturity": 2.0 }, "spread": 0.01 },
        { "type": "cds_term_structure",
          "terms": { "accrual_start": -0.1, "maturity_reference": 0.15, "maturity_indices": [4, 8] },
          "spreads": [0.01, 0.01] },
        { "type": "fixed_rate_bond", "maturity": 4.0, "coupon": 0.05, "recovery_rate": 0.4 }
    ]
}"#;

fn market_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn credex() -> Command {
    let mut cmd = Command::cargo_bin("credex").unwrap();
    cmd.env_remove("CREDEX_MARKET").env_remove("RUST_LOG");
    cmd
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

// =============================================================================
// CALIBRATE
// =============================================================================

#[test]
fn calibrate_reprices_every_quote() {
    let file = market_file(MARKET);
    let rows = json_output(credex().args(["--format", "json", "calibrate", "--market"]).arg(file.path()));
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);

    for row in rows {
        assert!(row["residual"].as_f64().unwrap().abs() < 1e-8);
        assert!(row["hazard_rate"].as_f64().unwrap() > 0.0);
    }
    let par_1y = rows[0]["par_spread"].as_f64().unwrap();
    assert!((par_1y - 0.005).abs() < 1e-9);
}

#[test]
fn calibrate_methods_agree() {
    let file = market_file(MARKET);
    let simple = json_output(
        credex()
            .args(["--format", "json", "calibrate", "--method", "simple", "--market"])
            .arg(file.path()),
    );
    let fast = json_output(
        credex()
            .args(["--format", "json", "calibrate", "--method", "fast", "--market"])
            .arg(file.path()),
    );
    for (a, b) in simple.as_array().unwrap().iter().zip(fast.as_array().unwrap()) {
        let (a, b) = (a["hazard_rate"].as_f64().unwrap(), b["hazard_rate"].as_f64().unwrap());
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn calibrate_table_output() {
    let file = market_file(MARKET);
    credex()
        .args(["calibrate", "--market"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Hazard"))
        .stdout(predicate::str::contains("bps"));
}

#[test]
fn calibrate_without_quotes_fails() {
    let file = market_file(r#"{"yield_curve": {"times": [1.0], "rates": [0.02]}}"#);
    credex()
        .args(["calibrate", "--market"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no quoted CDS"));
}

#[test]
fn missing_market_file_fails() {
    credex()
        .args(["calibrate", "--market", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.json"));
}

// =============================================================================
// PRICE
// =============================================================================

#[test]
fn price_lists_every_value() {
    let file = market_file(MARKET);
    let rows = json_output(credex().args(["--format", "json", "price", "--market"]).arg(file.path()));
    let rows = rows.as_array().unwrap();

    // one cds, two term-structure maturities, one bond
    assert_eq!(rows.len(), 4);
    assert!(rows[0]["risky_annuity"].as_f64().unwrap() > 0.0);
    assert!(rows[3]["risky_annuity"].is_null());
    assert!(rows[3]["par_spread"].is_null());

    let bond_price = rows[3]["present_value"].as_f64().unwrap();
    assert!(bond_price > 0.9 && bond_price < 1.2);
}

#[test]
fn dirty_prices_differ_only_by_accrued() {
    let file = market_file(MARKET);
    let clean = json_output(credex().args(["--format", "json", "price", "--market"]).arg(file.path()));
    let dirty = json_output(
        credex()
            .args(["--format", "json", "price", "--price-type", "dirty", "--market"])
            .arg(file.path()),
    );
    // the first cds starts accruing today
    let (c, d) = (clean[0]["present_value"].as_f64().unwrap(), dirty[0]["present_value"].as_f64().unwrap());
    assert!((c - d).abs() < 1e-3);
    assert!((clean[1]["present_value"].as_f64().unwrap() - dirty[1]["present_value"].as_f64().unwrap()).abs() > 0.0);
}

#[test]
fn price_with_given_credit_curve() {
    let market = r#"{
        "yield_curve": { "times": [5.0], "rates": [0.03] },
        "credit_curve": { "times": [5.0], "rates": [0.02] },
        "instruments": [
            { "type": "cds", "terms": { "accrual_start": 0.0, "maturity": 5.0 }, "spread": 0.01 }
        ]
    }"#;
    let file = market_file(market);
    let rows = json_output(credex().args(["--format", "json", "price", "--market"]).arg(file.path()));
    let par = rows[0]["par_spread"].as_f64().unwrap();
    assert!((par - 0.012).abs() < 1e-4);
}

// =============================================================================
// CONVERT
// =============================================================================

fn convert_values(args: &[&str]) -> Vec<String> {
    let rows = json_output(credex().args(["--format", "json", "convert"]).args(args));
    rows.as_array()
        .unwrap()
        .iter()
        .map(|row| row["value"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn convert_round_trips_between_quotes() {
    let from_puf = convert_values(&["--maturity", "5", "--coupon", "0.01", "--puf", "0.02", "--rate", "0.03"]);
    assert_eq!(from_puf[1], "2.000000%");
    assert_eq!(from_puf[3], "98.000000%");

    let spread_bps: f64 = from_puf[2].trim_end_matches(" bps").parse().unwrap();
    assert!(spread_bps > 100.0);

    let spread = format!("{}", spread_bps / 10_000.0);
    let from_spread = convert_values(&["--maturity", "5", "--coupon", "0.01", "--quoted-spread", &spread, "--rate", "0.03"]);
    let puf: f64 = from_spread[1].trim_end_matches('%').parse().unwrap();
    assert!((puf - 2.0).abs() < 1e-4);
}

#[test]
fn convert_from_price() {
    let values = convert_values(&["--maturity", "3", "--coupon", "0.05", "--price", "1.01", "--rate", "0.02"]);
    assert_eq!(values[1], "-1.000000%");
    let spread_bps: f64 = values[2].trim_end_matches(" bps").parse().unwrap();
    assert!(spread_bps < 500.0);
}

#[test]
fn convert_requires_one_quote() {
    credex()
        .args(["convert", "--maturity", "5", "--coupon", "0.01", "--rate", "0.03"])
        .assert()
        .failure();
    credex()
        .args(["convert", "--maturity", "5", "--coupon", "0.01", "--rate", "0.03", "--puf", "0.01", "--price", "0.99"])
        .assert()
        .failure();
}

#[test]
fn convert_rejects_expired_contract() {
    credex()
        .args(["convert", "--maturity", "-1", "--coupon", "0.01", "--puf", "0.0", "--rate", "0.03"])
        .assert()
        .failure();
}
