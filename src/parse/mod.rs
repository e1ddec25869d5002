pub mod formats;

pub use formats::{detect_exchange, normalize_asset, normalize_kind, Exchange};

use crate::tax::TransactionRecord;
use chrono::{NaiveDate, NaiveDateTime};
use formats::{format_for, ExchangeFormat};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;
use std::str::FromStr;

/// Read a transaction CSV file, auto-detecting the exchange layout
/// from the header row unless one is given.
pub fn read_transactions_file(
    path: &Path,
    exchange: Option<Exchange>,
) -> anyhow::Result<Vec<TransactionRecord>> {
    let file = File::open(path)
        .map_err(|e| anyhow::anyhow!("cannot open transaction file {}: {e}", path.display()))?;
    read_transactions(BufReader::new(file), exchange)
}

/// Read transaction CSV from any reader. Malformed rows are logged and
/// dropped; a statement with a few bad rows still parses.
pub fn read_transactions<R: Read>(
    reader: R,
    exchange: Option<Exchange>,
) -> anyhow::Result<Vec<TransactionRecord>> {
    let mut buffer = Vec::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_end(&mut buffer)?;

    let delimiter = sniff_delimiter(&buffer);
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(buffer));

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.is_empty() {
        anyhow::bail!("no header row found in transaction csv");
    }

    let exchange = exchange.unwrap_or_else(|| {
        let detected = detect_exchange(&headers);
        log::debug!("detected exchange format: {detected:?}");
        detected
    });
    let format = format_for(exchange);

    let mut transactions = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let row_number = index + 2;
        let record = match record {
            Ok(r) => r,
            Err(err) => {
                log::warn!("row {row_number}: unreadable record: {err}");
                continue;
            }
        };
        match parse_row(&headers, &record, format) {
            Ok(Some(tx)) => transactions.push(tx),
            Ok(None) => {}
            Err(reason) => log::warn!("row {row_number}: skipped: {reason}"),
        }
    }

    Ok(transactions)
}

fn parse_row(
    headers: &[String],
    record: &csv::StringRecord,
    format: &ExchangeFormat,
) -> Result<Option<TransactionRecord>, String> {
    let date_str = column(headers, record, format.date_col);
    let type_str = column(headers, record, format.type_col);
    let asset_str = column(headers, record, format.asset_col);
    let quantity_str = column(headers, record, format.quantity_col);

    // Rows missing any required field (blank trailers, section
    // separators) are silently dropped.
    let (Some(date_str), Some(type_str), Some(asset_str), Some(quantity_str)) =
        (date_str, type_str, asset_str, quantity_str)
    else {
        return Ok(None);
    };

    let datetime =
        parse_datetime(date_str, format.date_format).ok_or_else(|| format!("bad date '{date_str}'"))?;
    let quantity =
        parse_decimal(quantity_str).ok_or_else(|| format!("bad quantity '{quantity_str}'"))?;
    if quantity.is_zero() {
        return Ok(None);
    }

    let price = format
        .price_col
        .and_then(|col| column(headers, record, col))
        .and_then(parse_decimal);
    let fee = format
        .fee_col
        .and_then(|col| column(headers, record, col))
        .and_then(parse_decimal)
        .unwrap_or(Decimal::ZERO);

    Ok(Some(TransactionRecord {
        datetime,
        kind: normalize_kind(type_str),
        asset: normalize_asset(asset_str),
        quantity: quantity.abs(),
        price,
        fee: fee.abs(),
    }))
}

/// Case-insensitive header lookup; empty cells count as missing.
fn column<'r>(headers: &[String], record: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
    let index = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))?;
    record.get(index).map(str::trim).filter(|v| !v.is_empty())
}

/// Count candidate delimiters on the header line and take the winner.
fn sniff_delimiter(buffer: &[u8]) -> u8 {
    let header_line = buffer
        .lines()
        .next()
        .and_then(Result::ok)
        .unwrap_or_default();
    [b',', b';', b'\t']
        .into_iter()
        .max_by_key(|&d| header_line.bytes().filter(|&b| b == d).count())
        .unwrap_or(b',')
}

fn parse_datetime(value: &str, preferred: Option<&str>) -> Option<NaiveDateTime> {
    if let Some(format) = preferred {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%dT%H:%M:%S%.fZ",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%m/%d/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
    ];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Parse a money/quantity cell, tolerating currency symbols, thousands
/// separators and parenthesised negatives.
fn parse_decimal(value: &str) -> Option<Decimal> {
    let mut clean: String = value
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if clean.starts_with('(') && clean.ends_with(')') {
        clean = format!("-{}", &clean[1..clean.len() - 1]);
    }
    Decimal::from_str(&clean).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::TxKind;
    use rust_decimal_macros::dec;

    fn parse(csv: &str, exchange: Option<Exchange>) -> Vec<TransactionRecord> {
        read_transactions(Cursor::new(csv.as_bytes().to_vec()), exchange).unwrap()
    }

    #[test]
    fn generic_format_round_trip() {
        let csv = "\
date,type,asset,quantity,price,fee
2024-01-15,buy,BTC,1.0,40000,10
2024-06-15,sell,btc,0.5,65000,5
";
        let txs = parse(csv, None);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].kind, TxKind::Buy);
        assert_eq!(txs[0].asset, "BTC");
        assert_eq!(txs[0].quantity, dec!(1.0));
        assert_eq!(txs[0].price, Some(dec!(40000)));
        assert_eq!(txs[0].fee, dec!(10));
        assert_eq!(txs[1].asset, "BTC");
        assert_eq!(txs[1].kind, TxKind::Sell);
    }

    #[test]
    fn coinbase_format_detected() {
        let csv = "\
Timestamp,Transaction Type,Asset,Quantity Transacted,Spot Price at Transaction,Fees and/or Spread
2024-01-15T10:30:00Z,Advanced Trade Buy,BTC,0.5,\"$42,000.00\",$12.50
";
        let txs = parse(csv, None);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].kind, TxKind::Buy);
        assert_eq!(txs[0].price, Some(dec!(42000.00)));
        assert_eq!(txs[0].fee, dec!(12.50));
    }

    #[test]
    fn kraken_symbols_normalized() {
        let csv = "\
time,type,asset,amount,fee
2024-01-15 10:30:00.0000,trade,XXBT,-0.25,0.001
";
        let txs = parse(csv, None);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].asset, "BTC");
        // Quantities are unsigned; direction comes from the kind.
        assert_eq!(txs[0].quantity, dec!(0.25));
        assert_eq!(txs[0].price, None);
    }

    #[test]
    fn semicolon_delimiter_sniffed() {
        let csv = "\
date;type;asset;quantity;price;fee
2024-01-15;buy;ETH;2;3000;1
";
        let txs = parse(csv, None);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].quantity, dec!(2));
    }

    #[test]
    fn parenthesised_negative_parsed() {
        assert_eq!(parse_decimal("(1,234.50)"), Some(dec!(-1234.50)));
        assert_eq!(parse_decimal("$40,000"), Some(dec!(40000)));
        assert_eq!(parse_decimal("n/a"), None);
    }

    #[test]
    fn date_only_rows_accepted() {
        let csv = "\
date,type,asset,quantity,price,fee
2024-01-15,buy,BTC,1.0,40000,0
";
        let txs = parse(csv, None);
        assert_eq!(
            txs[0].datetime,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn zero_quantity_rows_dropped() {
        let csv = "\
date,type,asset,quantity,price,fee
2024-01-15,buy,BTC,0,40000,0
2024-01-16,buy,BTC,1,40000,0
";
        let txs = parse(csv, None);
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn malformed_rows_dropped_not_fatal() {
        let csv = "\
date,type,asset,quantity,price,fee
not-a-date,buy,BTC,1,40000,0
2024-01-16,buy,BTC,one,40000,0
2024-01-17,buy,BTC,1,40000,0
";
        let txs = parse(csv, None);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].datetime.date(), NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
    }

    #[test]
    fn missing_cells_skip_row() {
        let csv = "\
date,type,asset,quantity,price,fee
2024-01-15,buy,BTC,1,40000,0
,,,,,
";
        let txs = parse(csv, None);
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn explicit_exchange_overrides_detection() {
        let csv = "\
date,type,asset,quantity,price,fee
2024-01-15,buy,BTC,1,40000,0
";
        let txs = parse(csv, Some(Exchange::Generic));
        assert_eq!(txs.len(), 1);
    }
}
