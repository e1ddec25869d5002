//! Report command - full capital gains calculation over transaction CSVs

use crate::basis::{CostBasisEngine, Method};
use crate::cmd::{
    format_quantity, format_usd, load_transactions, write_output, MethodArg, OutputFormat,
};
use crate::parse::Exchange;
use crate::tax::{calculate, CalculatorOptions, DisposalRecord, TaxReport};
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ReportCommand {
    /// Transaction CSV file(s) to process
    #[arg(short, long, required = true, num_args = 1..)]
    transactions: Vec<PathBuf>,

    /// Only process transactions dated in this year
    #[arg(short, long)]
    year: Option<i32>,

    /// Cost basis method
    #[arg(short, long, value_enum, default_value_t = MethodArg::Fifo)]
    method: MethodArg,

    /// Exchange format for CSV parsing (auto-detected if not specified)
    #[arg(short, long, value_enum)]
    exchange: Option<Exchange>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include remaining lot inventory in the report
    #[arg(long)]
    show_lots: bool,
}

impl ReportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = load_transactions(&self.transactions, self.exchange, self.year)?;
        let method: Method = self.method.into();
        let mut engine = CostBasisEngine::new(method);
        let report = calculate(&transactions, &mut engine, &CalculatorOptions::default());

        let content = match self.format {
            OutputFormat::Table => render_table(&report, &engine, self.year, self.show_lots),
            OutputFormat::Csv => render_csv(&report)?,
            OutputFormat::Json => render_json(&report, &engine, self.show_lots)?,
        };
        write_output(self.output.as_deref(), &content)
    }
}

#[derive(Debug, Tabled)]
struct DisposalRow {
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Acquired")]
    acquired: String,
    #[tabled(rename = "Sold")]
    sold: String,
    #[tabled(rename = "Proceeds")]
    proceeds: String,
    #[tabled(rename = "Cost Basis")]
    cost_basis: String,
    #[tabled(rename = "Gain/Loss")]
    gain_loss: String,
    #[tabled(rename = "Term")]
    term: String,
    #[tabled(rename = "Lot")]
    lot_id: u64,
}

impl From<&DisposalRecord> for DisposalRow {
    fn from(d: &DisposalRecord) -> Self {
        DisposalRow {
            asset: d.asset.clone(),
            quantity: format_quantity(d.quantity),
            acquired: d.date_acquired.format("%Y-%m-%d").to_string(),
            sold: d.date_sold.format("%Y-%m-%d").to_string(),
            proceeds: format_usd(d.proceeds),
            cost_basis: format_usd(d.cost_basis),
            gain_loss: format_usd(d.gain_loss),
            term: if d.is_long_term { "Long" } else { "Short" }.to_string(),
            lot_id: d.lot_id,
        }
    }
}

fn render_table(
    report: &TaxReport,
    engine: &CostBasisEngine,
    year: Option<i32>,
    show_lots: bool,
) -> String {
    let mut out = String::new();
    let year_str = year.map_or("All Years".to_string(), |y| y.to_string());

    let _ = writeln!(out);
    let _ = writeln!(out, "CAPITAL GAINS REPORT ({year_str}, {})", report.method);
    let _ = writeln!(out);

    if report.disposals.is_empty() {
        let _ = writeln!(out, "(no disposals)");
    } else {
        let rows: Vec<DisposalRow> = report.disposals.iter().map(DisposalRow::from).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        let _ = writeln!(out, "{table}");
    }

    let s = &report.summary;
    let _ = writeln!(out);
    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "  Total Proceeds:      {}", format_usd(s.total_proceeds));
    let _ = writeln!(out, "  Total Cost Basis:    {}", format_usd(s.total_cost_basis));
    let _ = writeln!(out, "  Net Gain/Loss:       {}", format_usd(s.total_gain_loss));
    let _ = writeln!(out, "  Short-term Gains:    {}", format_usd(s.short_term_gain));
    let _ = writeln!(out, "  Short-term Losses:   {}", format_usd(s.short_term_loss));
    let _ = writeln!(out, "  Long-term Gains:     {}", format_usd(s.long_term_gain));
    let _ = writeln!(out, "  Long-term Losses:    {}", format_usd(s.long_term_loss));
    let _ = writeln!(out, "  Disposals:           {}", s.disposal_count);
    let _ = writeln!(out, "  Income Events:       {}", report.income_count);
    if report.skipped_count > 0 {
        let _ = writeln!(out, "  Skipped Rows:        {}", report.skipped_count);
    }

    if show_lots {
        let _ = writeln!(out);
        let _ = writeln!(out, "REMAINING LOT INVENTORY");
        let inventory = engine.ledger().inventory();
        if inventory.is_empty() {
            let _ = writeln!(out, "  (empty)");
        }
        for (asset, lots) in inventory {
            let _ = writeln!(out, "  {asset}:");
            for lot in lots {
                let _ = writeln!(
                    out,
                    "    Lot #{}: {} @ {} (acquired {})",
                    lot.lot_id,
                    format_quantity(lot.remaining),
                    format_usd(lot.cost_basis_per_unit),
                    lot.acquired_at.format("%Y-%m-%d")
                );
            }
        }
    }

    out
}

/// Form 8949-style CSV record.
#[derive(Debug, Serialize)]
struct DisposalCsvRecord {
    description: String,
    date_acquired: String,
    date_sold: String,
    proceeds: String,
    cost_basis: String,
    gain_loss: String,
    term: String,
    holding_days: i64,
    lot_id: u64,
}

impl From<&DisposalRecord> for DisposalCsvRecord {
    fn from(d: &DisposalRecord) -> Self {
        DisposalCsvRecord {
            description: format!("{} {}", format_quantity(d.quantity), d.asset),
            date_acquired: d.date_acquired.format("%m/%d/%Y").to_string(),
            date_sold: d.date_sold.format("%m/%d/%Y").to_string(),
            proceeds: format!("{:.2}", d.proceeds),
            cost_basis: format!("{:.2}", d.cost_basis),
            gain_loss: format!("{:.2}", d.gain_loss),
            term: if d.is_long_term { "Long-term" } else { "Short-term" }.to_string(),
            holding_days: d.holding_days,
            lot_id: d.lot_id,
        }
    }
}

fn render_csv(report: &TaxReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for disposal in &report.disposals {
        let record: DisposalCsvRecord = disposal.into();
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a TaxReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    lots: Option<BTreeMap<String, Vec<crate::basis::LotSnapshot>>>,
}

fn render_json(
    report: &TaxReport,
    engine: &CostBasisEngine,
    show_lots: bool,
) -> anyhow::Result<String> {
    let output = JsonReport {
        report,
        lots: show_lots.then(|| engine.ledger().inventory()),
    };
    let mut content = serde_json::to_string_pretty(&output)?;
    content.push('\n');
    Ok(content)
}
