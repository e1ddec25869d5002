use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Normalized transaction kind. Direction is implied by the kind;
/// quantities are always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Buy,
    Receive,
    Sell,
    Trade,
    Spend,
    Convert,
    Staking,
    Airdrop,
    Mining,
    Interest,
    Income,
    Transfer,
    TransferIn,
    TransferOut,
    Other,
}

impl TxKind {
    /// Kinds that create a new lot (buys plus everything taxed as
    /// income at receipt).
    pub fn is_acquisition(self) -> bool {
        matches!(self, TxKind::Buy | TxKind::Receive) || self.is_income()
    }

    /// Kinds that consume lots and realize gains.
    pub fn is_disposal(self) -> bool {
        matches!(
            self,
            TxKind::Sell | TxKind::Trade | TxKind::Spend | TxKind::Convert
        )
    }

    /// Kinds taxed as ordinary income at fair market value.
    pub fn is_income(self) -> bool {
        matches!(
            self,
            TxKind::Staking | TxKind::Airdrop | TxKind::Mining | TxKind::Interest | TxKind::Income
        )
    }

    /// Non-taxable movements between own wallets/accounts.
    pub fn is_transfer(self) -> bool {
        matches!(
            self,
            TxKind::Transfer | TxKind::TransferIn | TxKind::TransferOut
        )
    }

    pub fn display(&self) -> &'static str {
        match self {
            TxKind::Buy => "buy",
            TxKind::Receive => "receive",
            TxKind::Sell => "sell",
            TxKind::Trade => "trade",
            TxKind::Spend => "spend",
            TxKind::Convert => "convert",
            TxKind::Staking => "staking",
            TxKind::Airdrop => "airdrop",
            TxKind::Mining => "mining",
            TxKind::Interest => "interest",
            TxKind::Income => "income",
            TxKind::Transfer => "transfer",
            TxKind::TransferIn => "transfer_in",
            TxKind::TransferOut => "transfer_out",
            TxKind::Other => "other",
        }
    }
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// One normalized transaction from the ingestion layer. The stream fed
/// to the calculator must already be sorted ascending by datetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub datetime: NaiveDateTime,
    pub kind: TxKind,
    pub asset: String,
    pub quantity: Decimal,
    /// Unit price in USD at transaction time, when known.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub fee: Decimal,
}

impl TransactionRecord {
    pub fn date(&self) -> NaiveDate {
        self.datetime.date()
    }

    /// Price usable for valuation: present and non-zero.
    pub fn usable_price(&self) -> Option<Decimal> {
        self.price.filter(|p| !p.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn classification_predicates() {
        assert!(TxKind::Buy.is_acquisition());
        assert!(TxKind::Receive.is_acquisition());
        assert!(TxKind::Staking.is_acquisition());
        assert!(!TxKind::Sell.is_acquisition());

        assert!(TxKind::Sell.is_disposal());
        assert!(TxKind::Trade.is_disposal());
        assert!(TxKind::Spend.is_disposal());
        assert!(TxKind::Convert.is_disposal());
        assert!(!TxKind::Buy.is_disposal());

        assert!(TxKind::Staking.is_income());
        assert!(TxKind::Airdrop.is_income());
        assert!(TxKind::Mining.is_income());
        assert!(TxKind::Interest.is_income());
        assert!(TxKind::Income.is_income());
        assert!(!TxKind::Receive.is_income());

        assert!(TxKind::Transfer.is_transfer());
        assert!(TxKind::TransferIn.is_transfer());
        assert!(TxKind::TransferOut.is_transfer());
        assert!(!TxKind::Other.is_transfer());
        assert!(!TxKind::Other.is_acquisition());
        assert!(!TxKind::Other.is_disposal());
    }

    #[test]
    fn zero_price_not_usable() {
        let tx = TransactionRecord {
            datetime: NaiveDateTime::parse_from_str("2024-01-15 00:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            kind: TxKind::Buy,
            asset: "BTC".to_string(),
            quantity: dec!(1),
            price: Some(dec!(0)),
            fee: dec!(0),
        };
        assert_eq!(tx.usable_price(), None);
    }
}
