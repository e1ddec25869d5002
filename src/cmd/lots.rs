//! Lots command - remaining acquisition-lot inventory after replaying
//! a transaction stream

use crate::basis::{CostBasisEngine, LotSnapshot};
use crate::cmd::{
    format_quantity, format_usd, load_transactions, write_output, MethodArg, OutputFormat,
};
use crate::parse::Exchange;
use crate::tax::{calculate, CalculatorOptions};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct LotsCommand {
    /// Transaction CSV file(s) to process
    #[arg(short, long, required = true, num_args = 1..)]
    transactions: Vec<PathBuf>,

    /// Cost basis method (affects which lots were consumed)
    #[arg(short, long, value_enum, default_value_t = MethodArg::Fifo)]
    method: MethodArg,

    /// Exchange format for CSV parsing (auto-detected if not specified)
    #[arg(short, long, value_enum)]
    exchange: Option<Exchange>,

    /// Only show lots for this asset
    #[arg(short, long)]
    asset: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl LotsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = load_transactions(&self.transactions, self.exchange, None)?;
        let mut engine = CostBasisEngine::new(self.method.into());
        calculate(&transactions, &mut engine, &CalculatorOptions::default());

        let mut inventory = engine.ledger().inventory();
        if let Some(asset) = &self.asset {
            let wanted = asset.to_uppercase();
            inventory.retain(|a, _| *a == wanted);
        }

        let content = match self.format {
            OutputFormat::Table => render_table(&inventory),
            OutputFormat::Csv => render_csv(&inventory)?,
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(&inventory)?;
                json.push('\n');
                json
            }
        };
        write_output(self.output.as_deref(), &content)
    }
}

type Inventory = std::collections::BTreeMap<String, Vec<LotSnapshot>>;

#[derive(Debug, Tabled)]
struct LotRow {
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Lot")]
    lot_id: u64,
    #[tabled(rename = "Acquired")]
    acquired: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Basis/Unit")]
    cost_basis_per_unit: String,
    #[tabled(rename = "Remaining Basis")]
    remaining_basis: String,
}

fn lot_row(asset: &str, lot: &LotSnapshot) -> LotRow {
    LotRow {
        asset: asset.to_string(),
        lot_id: lot.lot_id,
        acquired: lot.acquired_at.format("%Y-%m-%d").to_string(),
        remaining: format_quantity(lot.remaining),
        cost_basis_per_unit: format_usd(lot.cost_basis_per_unit),
        remaining_basis: format_usd(lot.remaining * lot.cost_basis_per_unit),
    }
}

fn render_table(inventory: &Inventory) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "OPEN LOT INVENTORY");
    let _ = writeln!(out);

    if inventory.is_empty() {
        let _ = writeln!(out, "(no open lots)");
        return out;
    }

    let rows: Vec<LotRow> = inventory
        .iter()
        .flat_map(|(asset, lots)| lots.iter().map(move |lot| lot_row(asset, lot)))
        .collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    let _ = writeln!(out, "{table}");

    let _ = writeln!(out);
    for (asset, lots) in inventory {
        let total: Decimal = lots.iter().map(|l| l.remaining).sum();
        let basis: Decimal = lots.iter().map(|l| l.remaining * l.cost_basis_per_unit).sum();
        let _ = writeln!(
            out,
            "  {asset}: {} across {} lot(s), basis {}",
            format_quantity(total),
            lots.len(),
            format_usd(basis)
        );
    }

    out
}

#[derive(Debug, Serialize)]
struct LotCsvRecord {
    asset: String,
    lot_id: u64,
    acquired: String,
    remaining: String,
    cost_basis_per_unit: String,
    remaining_basis: String,
}

fn render_csv(inventory: &Inventory) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for (asset, lots) in inventory {
        for lot in lots {
            wtr.serialize(LotCsvRecord {
                asset: asset.clone(),
                lot_id: lot.lot_id,
                acquired: lot.acquired_at.format("%Y-%m-%d").to_string(),
                remaining: format_quantity(lot.remaining),
                cost_basis_per_unit: format!("{:.2}", lot.cost_basis_per_unit),
                remaining_basis: format!("{:.2}", lot.remaining * lot.cost_basis_per_unit),
            })?;
        }
    }
    let bytes = wtr.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}
