//! Compare command - run the same transaction stream under every cost
//! basis method side by side

use crate::basis::{CostBasisEngine, Method, Summary};
use crate::cmd::{format_usd, load_transactions, write_output, OutputFormat};
use crate::parse::Exchange;
use crate::tax::{calculate, CalculatorOptions, TransactionRecord};
use clap::Args;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CompareCommand {
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

impl CompareCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = load_transactions(&self.transactions, self.exchange, self.year)?;
        let comparison = compare_methods(&transactions);

        let content = match self.format {
            OutputFormat::Table => render_table(&comparison, self.year),
            OutputFormat::Csv => render_csv(&comparison)?,
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(&comparison)?;
                json.push('\n');
                json
            }
        };
        write_output(self.output.as_deref(), &content)
    }
}

#[derive(Debug, Serialize)]
pub struct MethodOutcome {
    pub method: Method,
    pub summary: Summary,
}

/// Replay the stream once per method, each on a fresh engine.
pub fn compare_methods(transactions: &[TransactionRecord]) -> Vec<MethodOutcome> {
    Method::ALL
        .into_iter()
        .map(|method| {
            let mut engine = CostBasisEngine::new(method);
            let report = calculate(transactions, &mut engine, &CalculatorOptions::default());
            MethodOutcome {
                method,
                summary: report.summary,
            }
        })
        .collect()
}

#[derive(Debug, Tabled)]
struct CompareRow {
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Proceeds")]
    proceeds: String,
    #[tabled(rename = "Cost Basis")]
    cost_basis: String,
    #[tabled(rename = "Net Gain/Loss")]
    net: String,
    #[tabled(rename = "Short-term Net")]
    short_term: String,
    #[tabled(rename = "Long-term Net")]
    long_term: String,
}

impl From<&MethodOutcome> for CompareRow {
    fn from(o: &MethodOutcome) -> Self {
        CompareRow {
            method: o.method.display().to_string(),
            proceeds: format_usd(o.summary.total_proceeds),
            cost_basis: format_usd(o.summary.total_cost_basis),
            net: format_usd(o.summary.total_gain_loss),
            short_term: format_usd(o.summary.short_term_net()),
            long_term: format_usd(o.summary.long_term_net()),
        }
    }
}

fn render_table(comparison: &[MethodOutcome], year: Option<i32>) -> String {
    let mut out = String::new();
    let year_str = year.map_or("All Years".to_string(), |y| y.to_string());

    let _ = writeln!(out);
    let _ = writeln!(out, "COST BASIS METHOD COMPARISON ({year_str})");
    let _ = writeln!(out);

    let rows: Vec<CompareRow> = comparison.iter().map(CompareRow::from).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    let _ = writeln!(out, "{table}");

    if let Some(best) = comparison.iter().min_by_key(|o| o.summary.total_gain_loss) {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Lowest realized gain: {} ({})",
            best.method,
            format_usd(best.summary.total_gain_loss)
        );
    }

    out
}

#[derive(Debug, Serialize)]
struct CompareCsvRecord {
    method: String,
    total_proceeds: String,
    total_cost_basis: String,
    net_gain_loss: String,
    short_term_net: String,
    long_term_net: String,
}

fn render_csv(comparison: &[MethodOutcome]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for outcome in comparison {
        wtr.serialize(CompareCsvRecord {
            method: outcome.method.display().to_string(),
            total_proceeds: format!("{:.2}", outcome.summary.total_proceeds),
            total_cost_basis: format!("{:.2}", outcome.summary.total_cost_basis),
            net_gain_loss: format!("{:.2}", outcome.summary.total_gain_loss),
            short_term_net: format!("{:.2}", outcome.summary.short_term_net()),
            long_term_net: format!("{:.2}", outcome.summary.long_term_net()),
        })?;
    }
    let bytes = wtr.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}
