use crate::tax::TxKind;
use clap::ValueEnum;

/// Supported exchange export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Exchange {
    Coinbase,
    Binance,
    Kraken,
    Gemini,
    /// Plain date,type,asset,quantity,price,fee export
    Generic,
}

/// Column mapping for one exchange's CSV layout.
pub struct ExchangeFormat {
    pub exchange: Exchange,
    pub date_col: &'static str,
    pub type_col: &'static str,
    pub asset_col: &'static str,
    pub quantity_col: &'static str,
    pub price_col: Option<&'static str>,
    pub fee_col: Option<&'static str>,
    pub date_format: Option<&'static str>,
}

pub const FORMATS: &[ExchangeFormat] = &[
    ExchangeFormat {
        exchange: Exchange::Coinbase,
        date_col: "Timestamp",
        type_col: "Transaction Type",
        asset_col: "Asset",
        quantity_col: "Quantity Transacted",
        price_col: Some("Spot Price at Transaction"),
        fee_col: Some("Fees and/or Spread"),
        date_format: Some("%Y-%m-%dT%H:%M:%SZ"),
    },
    ExchangeFormat {
        exchange: Exchange::Binance,
        date_col: "Date(UTC)",
        type_col: "Operation",
        asset_col: "Coin",
        quantity_col: "Change",
        // Binance exports carry no spot price; rows without one are
        // counted as skipped downstream.
        price_col: None,
        fee_col: None,
        date_format: Some("%Y-%m-%d %H:%M:%S"),
    },
    ExchangeFormat {
        exchange: Exchange::Kraken,
        date_col: "time",
        type_col: "type",
        asset_col: "asset",
        quantity_col: "amount",
        price_col: None,
        fee_col: Some("fee"),
        date_format: Some("%Y-%m-%d %H:%M:%S%.f"),
    },
    ExchangeFormat {
        exchange: Exchange::Gemini,
        date_col: "Date",
        type_col: "Type",
        asset_col: "Symbol",
        quantity_col: "Amount",
        price_col: Some("Price"),
        fee_col: Some("Fee"),
        date_format: Some("%Y-%m-%d %H:%M:%S"),
    },
    ExchangeFormat {
        exchange: Exchange::Generic,
        date_col: "date",
        type_col: "type",
        asset_col: "asset",
        quantity_col: "quantity",
        price_col: Some("price"),
        fee_col: Some("fee"),
        date_format: None,
    },
];

pub fn format_for(exchange: Exchange) -> &'static ExchangeFormat {
    FORMATS
        .iter()
        .find(|f| f.exchange == exchange)
        .unwrap_or(&FORMATS[FORMATS.len() - 1])
}

/// Pick the exchange whose date column appears in the header row,
/// falling back to the generic layout.
pub fn detect_exchange(headers: &[String]) -> Exchange {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    for format in FORMATS {
        if format.exchange == Exchange::Generic {
            continue;
        }
        if lowered.contains(&format.date_col.to_lowercase()) {
            return format.exchange;
        }
    }
    Exchange::Generic
}

/// Map an exchange's transaction-type wording onto a normalized kind.
/// Falls back to substring matches for variants like
/// "Advanced Trade Buy", then to `Other`.
pub fn normalize_kind(raw: &str) -> TxKind {
    const MAPPING: &[(&str, TxKind)] = &[
        ("buy", TxKind::Buy),
        ("receive", TxKind::Receive),
        ("deposit", TxKind::TransferIn),
        ("advanced trade buy", TxKind::Buy),
        ("rewards income", TxKind::Staking),
        ("staking income", TxKind::Staking),
        ("coinbase earn", TxKind::Income),
        ("learning reward", TxKind::Income),
        ("sell", TxKind::Sell),
        ("send", TxKind::TransferOut),
        ("withdrawal", TxKind::TransferOut),
        ("advanced trade sell", TxKind::Sell),
        ("convert", TxKind::Convert),
        ("staking", TxKind::Staking),
        ("airdrop", TxKind::Airdrop),
        ("mining", TxKind::Mining),
        ("interest", TxKind::Interest),
        ("reward", TxKind::Staking),
        ("income", TxKind::Income),
        ("spend", TxKind::Spend),
        ("trade", TxKind::Trade),
        ("swap", TxKind::Trade),
        ("exchange", TxKind::Trade),
        ("transfer", TxKind::Transfer),
    ];

    let lowered = raw.trim().to_lowercase();
    if let Some((_, kind)) = MAPPING.iter().find(|(key, _)| *key == lowered) {
        return *kind;
    }
    if let Some((_, kind)) = MAPPING.iter().find(|(key, _)| lowered.contains(key)) {
        return *kind;
    }
    TxKind::Other
}

/// Normalize asset symbols, including Kraken's X/Z-prefixed codes.
pub fn normalize_asset(raw: &str) -> String {
    let mut asset = raw.trim().to_uppercase();

    match asset.as_str() {
        "XBT" | "XXBT" => return "BTC".to_string(),
        "XETH" => return "ETH".to_string(),
        "ZUSD" => return "USD".to_string(),
        _ => {}
    }

    if asset.len() == 4 && (asset.starts_with('X') || asset.starts_with('Z')) {
        asset = asset[1..].to_string();
    }
    asset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn detects_coinbase_from_headers() {
        let h = headers(&["Timestamp", "Transaction Type", "Asset", "Quantity Transacted"]);
        assert_eq!(detect_exchange(&h), Exchange::Coinbase);
    }

    #[test]
    fn detects_kraken_case_insensitive() {
        let h = headers(&["Time", "Type", "Asset", "Amount", "Fee"]);
        assert_eq!(detect_exchange(&h), Exchange::Kraken);
    }

    #[test]
    fn unknown_headers_fall_back_to_generic() {
        let h = headers(&["when", "what", "coin", "how_much"]);
        assert_eq!(detect_exchange(&h), Exchange::Generic);
    }

    #[test]
    fn kind_normalization_exact_and_partial() {
        assert_eq!(normalize_kind("Buy"), TxKind::Buy);
        assert_eq!(normalize_kind("Advanced Trade Sell"), TxKind::Sell);
        assert_eq!(normalize_kind("Rewards Income"), TxKind::Staking);
        assert_eq!(normalize_kind("Learning Reward"), TxKind::Income);
        assert_eq!(normalize_kind("withdrawal"), TxKind::TransferOut);
        assert_eq!(normalize_kind("Margin Trade"), TxKind::Trade);
        assert_eq!(normalize_kind("???"), TxKind::Other);
    }

    #[test]
    fn asset_normalization() {
        assert_eq!(normalize_asset("btc"), "BTC");
        assert_eq!(normalize_asset("XBT"), "BTC");
        assert_eq!(normalize_asset("XXBT"), "BTC");
        assert_eq!(normalize_asset("XETH"), "ETH");
        assert_eq!(normalize_asset("ZUSD"), "USD");
        assert_eq!(normalize_asset("XDOT"), "DOT");
        assert_eq!(normalize_asset("ATOM"), "ATOM");
    }
}
