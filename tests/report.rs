//! E2E tests for the report, income, lots and compare commands

use std::process::Command;

/// Full report over a generic export, table output
#[test]
fn report_table_output() {
    let output = Command::new("cargo")
        .args(["run", "--", "report", "-t", "tests/data/generic.csv"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    // Verify the command succeeded
    assert!(output.status.success(), "Command failed: {:?}", output);

    // Verify key elements are present in output
    assert!(stdout.contains("CAPITAL GAINS REPORT"));
    assert!(stdout.contains("FIFO"));
    assert!(stdout.contains("BTC"));
    assert!(stdout.contains("ETH"));
    assert!(stdout.contains("SUMMARY"));
    assert!(stdout.contains("Net Gain/Loss"));
}

/// Report filtered to one year only shows that year's disposals
#[test]
fn report_filter_by_year() {
    let output = Command::new("cargo")
        .args([
            "run",
            "--",
            "report",
            "-t",
            "tests/data/generic.csv",
            "--year",
            "2025",
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("CAPITAL GAINS REPORT (2025"));
    // 2024 acquisitions fall outside the filter, so the 2025 sells
    // find no inventory and are clamped away.
    assert!(stdout.contains("(no disposals)"));
}

/// Report CSV output carries Form 8949-style columns
#[test]
fn report_csv_output() {
    let output = Command::new("cargo")
        .args([
            "run",
            "--",
            "report",
            "-t",
            "tests/data/generic.csv",
            "--format",
            "csv",
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("date_acquired"));
    assert!(stdout.contains("date_sold"));
    assert!(stdout.contains("gain_loss"));
    assert!(stdout.contains("Long-term"));
}

/// Report JSON output is machine-readable
#[test]
fn report_json_output() {
    let output = Command::new("cargo")
        .args([
            "run",
            "--",
            "report",
            "-t",
            "tests/data/generic.csv",
            "--format",
            "json",
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("\"disposals\""));
    assert!(stdout.contains("\"summary\""));
    assert!(stdout.contains("\"method\": \"fifo\""));
}

/// HIFO method selection changes the report header
#[test]
fn report_hifo_method() {
    let output = Command::new("cargo")
        .args([
            "run",
            "--",
            "report",
            "-t",
            "tests/data/generic.csv",
            "--method",
            "hifo",
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("HIFO"));
}

/// Coinbase export format is auto-detected from the header row
#[test]
fn report_coinbase_autodetect() {
    let output = Command::new("cargo")
        .args(["run", "--", "report", "-t", "tests/data/coinbase.csv"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("BTC"));
    assert!(stdout.contains("Short"));
    assert!(stdout.contains("Income Events:       1"));
}

/// Income command groups events by kind
#[test]
fn income_report() {
    let output = Command::new("cargo")
        .args(["run", "--", "income", "-t", "tests/data/generic.csv"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("ORDINARY INCOME REPORT"));
    assert!(stdout.contains("staking"));
    assert!(stdout.contains("Total Income"));
    // 0.1 ETH at $3000
    assert!(stdout.contains("$300.00"));
}

/// Lots command shows remaining inventory after disposals
#[test]
fn lots_inventory() {
    let output = Command::new("cargo")
        .args(["run", "--", "lots", "-t", "tests/data/generic.csv"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("OPEN LOT INVENTORY"));
    assert!(stdout.contains("BTC"));
    assert!(stdout.contains("ETH"));
}

/// Lots command filtered to one asset
#[test]
fn lots_filter_by_asset() {
    let output = Command::new("cargo")
        .args([
            "run",
            "--",
            "lots",
            "-t",
            "tests/data/generic.csv",
            "--asset",
            "btc",
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("BTC"));
    assert!(!stdout.contains("ETH"));
}

/// Compare command shows all three methods
#[test]
fn compare_methods_table() {
    let output = Command::new("cargo")
        .args(["run", "--", "compare", "-t", "tests/data/generic.csv"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("COST BASIS METHOD COMPARISON"));
    assert!(stdout.contains("FIFO"));
    assert!(stdout.contains("LIFO"));
    assert!(stdout.contains("HIFO"));
    assert!(stdout.contains("Lowest realized gain"));
}

/// Missing input file fails with a readable error
#[test]
fn missing_file_fails() {
    let output = Command::new("cargo")
        .args(["run", "--", "report", "-t", "tests/data/does_not_exist.csv"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot open transaction file"));
}
