pub mod compare;
pub mod income;
pub mod lots;
pub mod report;

use crate::basis::Method;
use crate::parse::{read_transactions_file, Exchange};
use crate::tax::TransactionRecord;
use chrono::Datelike;
use clap::ValueEnum;
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum MethodArg {
    #[default]
    Fifo,
    Lifo,
    Hifo,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Fifo => Method::Fifo,
            MethodArg::Lifo => Method::Lifo,
            MethodArg::Hifo => Method::Hifo,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// Load one or more transaction CSVs, merge them, and sort ascending
/// by datetime so the calculator's ordering contract holds. An
/// optional year keeps only transactions dated in that year.
pub fn load_transactions(
    files: &[PathBuf],
    exchange: Option<Exchange>,
    year: Option<i32>,
) -> anyhow::Result<Vec<TransactionRecord>> {
    let mut transactions = Vec::new();
    for file in files {
        let mut txs = read_transactions_file(file, exchange)?;
        log::debug!("loaded {} transactions from {}", txs.len(), file.display());
        transactions.append(&mut txs);
    }

    transactions.sort_by_key(|tx| tx.datetime);

    if let Some(year) = year {
        transactions.retain(|tx| tx.date().year() == year);
    }

    if transactions.is_empty() {
        anyhow::bail!("no transactions found in input files");
    }
    Ok(transactions)
}

/// Write rendered output to a file, or stdout when no path is given.
pub fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!("Report saved to {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

pub fn format_usd(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-${:.2}", -amount)
    } else {
        format!("${:.2}", amount)
    }
}

pub fn format_quantity(qty: Decimal) -> String {
    let s = format!("{:.8}", qty);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn usd_formatting() {
        assert_eq!(format_usd(dec!(45000)), "$45000.00");
        assert_eq!(format_usd(dec!(-1234.5)), "-$1234.50");
        assert_eq!(format_usd(dec!(0)), "$0.00");
    }

    #[test]
    fn quantity_formatting_trims_zeros() {
        assert_eq!(format_quantity(dec!(0.75000000)), "0.75");
        assert_eq!(format_quantity(dec!(2)), "2");
        assert_eq!(format_quantity(dec!(0.00000001)), "0.00000001");
    }
}
