//! Income command - ordinary income events (staking, airdrops, mining)
//! valued at receipt

use crate::cmd::{format_quantity, format_usd, load_transactions, write_output, OutputFormat};
use crate::parse::Exchange;
use crate::tax::{calculate_income, CalculatorOptions, IncomeEvent, IncomeReport};
use clap::Args;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct IncomeCommand {
    /// Transaction CSV file(s) to process
    #[arg(short, long, required = true, num_args = 1..)]
    transactions: Vec<PathBuf>,

    /// Only process transactions dated in this year
    #[arg(short, long)]
    year: Option<i32>,

    /// Exchange format for CSV parsing (auto-detected if not specified)
    #[arg(short, long, value_enum)]
    exchange: Option<Exchange>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl IncomeCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = load_transactions(&self.transactions, self.exchange, self.year)?;
        let report = calculate_income(&transactions, &CalculatorOptions::default());

        let content = match self.format {
            OutputFormat::Table => render_table(&report, self.year),
            OutputFormat::Csv => render_csv(&report)?,
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(&report)?;
                json.push('\n');
                json
            }
        };
        write_output(self.output.as_deref(), &content)
    }
}

#[derive(Debug, Tabled)]
struct IncomeRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Price/Unit")]
    price_per_unit: String,
    #[tabled(rename = "Fair Market Value")]
    fair_market_value: String,
}

impl From<&IncomeEvent> for IncomeRow {
    fn from(e: &IncomeEvent) -> Self {
        IncomeRow {
            date: e.date.format("%Y-%m-%d").to_string(),
            kind: e.kind.to_string(),
            asset: e.asset.clone(),
            quantity: format_quantity(e.quantity),
            price_per_unit: format_usd(e.price_per_unit),
            fair_market_value: format_usd(e.fair_market_value),
        }
    }
}

fn render_table(report: &IncomeReport, year: Option<i32>) -> String {
    let mut out = String::new();
    let year_str = year.map_or("All Years".to_string(), |y| y.to_string());

    let _ = writeln!(out);
    let _ = writeln!(out, "ORDINARY INCOME REPORT ({year_str})");
    let _ = writeln!(out);

    if report.income_events.is_empty() {
        let _ = writeln!(out, "(no income events)");
        return out;
    }

    let rows: Vec<IncomeRow> = report.income_events.iter().map(IncomeRow::from).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    let _ = writeln!(out, "{table}");

    let _ = writeln!(out);
    let _ = writeln!(out, "BY KIND");
    for (kind, totals) in &report.by_kind {
        let _ = writeln!(
            out,
            "  {:<12} {} events, {}",
            kind.to_string(),
            totals.count,
            format_usd(totals.total_value)
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "  Total Income:        {}", format_usd(report.total_income));
    let _ = writeln!(out, "  Events:              {}", report.event_count);

    out
}

#[derive(Debug, Serialize)]
struct IncomeCsvRecord {
    date: String,
    kind: String,
    asset: String,
    quantity: String,
    price_per_unit: String,
    fair_market_value: String,
}

fn render_csv(report: &IncomeReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for event in &report.income_events {
        wtr.serialize(IncomeCsvRecord {
            date: event.date.format("%m/%d/%Y").to_string(),
            kind: event.kind.to_string(),
            asset: event.asset.clone(),
            quantity: format_quantity(event.quantity),
            price_per_unit: format!("{:.2}", event.price_per_unit),
            fair_market_value: format!("{:.2}", event.fair_market_value),
        })?;
    }
    let bytes = wtr.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::{TransactionRecord, TxKind};
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;

    fn sample_report() -> IncomeReport {
        let transactions = vec![
            TransactionRecord {
                datetime: NaiveDateTime::parse_from_str("2024-03-01 00:00:00", "%Y-%m-%d %H:%M:%S")
                    .unwrap(),
                kind: TxKind::Staking,
                asset: "ETH".to_string(),
                quantity: dec!(0.1),
                price: Some(dec!(3000)),
                fee: dec!(0),
            },
            TransactionRecord {
                datetime: NaiveDateTime::parse_from_str("2024-05-01 00:00:00", "%Y-%m-%d %H:%M:%S")
                    .unwrap(),
                kind: TxKind::Airdrop,
                asset: "DOT".to_string(),
                quantity: dec!(50),
                price: Some(dec!(8)),
                fee: dec!(0),
            },
        ];
        calculate_income(&transactions, &CalculatorOptions::default())
    }

    #[test]
    fn table_lists_events_and_totals() {
        let report = sample_report();
        let table = render_table(&report, Some(2024));
        assert!(table.contains("ORDINARY INCOME REPORT (2024)"));
        assert!(table.contains("staking"));
        assert!(table.contains("airdrop"));
        assert!(table.contains("$700.00"));
    }

    #[test]
    fn csv_has_fair_market_value_column() {
        let report = sample_report();
        let csv = render_csv(&report).unwrap();
        assert!(csv.lines().next().unwrap().contains("fair_market_value"));
        assert_eq!(csv.lines().count(), 3);
    }
}
