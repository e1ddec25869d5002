use crate::basis::{CostBasisEngine, DisposalResult, Method, Summary};
use crate::tax::transaction::{TransactionRecord, TxKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Classifier configuration. Assets in the exclusion set never produce
/// tax events (fiat and pegged stablecoins).
#[derive(Debug, Clone)]
pub struct CalculatorOptions {
    pub excluded_assets: HashSet<String>,
}

impl Default for CalculatorOptions {
    fn default() -> Self {
        CalculatorOptions {
            excluded_assets: ["USD", "USDC", "USDT", "DAI", "BUSD"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// One matched disposal portion, flattened for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisposalRecord {
    pub asset: String,
    pub quantity: Decimal,
    pub proceeds: Decimal,
    pub cost_basis: Decimal,
    pub gain_loss: Decimal,
    pub date_acquired: NaiveDate,
    pub date_sold: NaiveDate,
    pub is_long_term: bool,
    pub holding_days: i64,
    pub lot_id: u64,
}

impl From<&DisposalResult> for DisposalRecord {
    fn from(r: &DisposalResult) -> Self {
        DisposalRecord {
            asset: r.asset.clone(),
            quantity: r.quantity,
            proceeds: r.proceeds,
            cost_basis: r.cost_basis,
            gain_loss: r.gain_loss,
            date_acquired: r.acquired_at,
            date_sold: r.disposed_at,
            is_long_term: r.is_long_term,
            holding_days: r.holding_days(),
            lot_id: r.lot_id,
        }
    }
}

/// Ordinary income recognized at receipt fair market value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeEvent {
    pub date: NaiveDate,
    pub kind: TxKind,
    pub asset: String,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub fair_market_value: Decimal,
}

/// Full calculation output for one transaction stream.
#[derive(Debug, Serialize)]
pub struct TaxReport {
    pub disposals: Vec<DisposalRecord>,
    pub income_events: Vec<IncomeEvent>,
    pub summary: Summary,
    pub income_count: usize,
    pub skipped_count: usize,
    pub method: Method,
}

/// Per-kind income totals for the income-only view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncomeTotals {
    pub count: usize,
    pub total_value: Decimal,
}

#[derive(Debug, Serialize)]
pub struct IncomeReport {
    pub income_events: Vec<IncomeEvent>,
    pub by_kind: BTreeMap<TxKind, IncomeTotals>,
    pub total_income: Decimal,
    pub event_count: usize,
}

/// Run the tax event classifier over a chronological transaction
/// stream, driving the engine's ledger and matcher.
///
/// The stream must be pre-sorted ascending by datetime; this is a
/// single pass and does not re-sort. Data-quality problems (missing
/// price, unknown kind, disposal exceeding inventory) are absorbed
/// locally: skipped rows are counted and oversized disposals clamped
/// to the available quantity, so a large statement always processes to
/// completion.
pub fn calculate(
    transactions: &[TransactionRecord],
    engine: &mut CostBasisEngine,
    options: &CalculatorOptions,
) -> TaxReport {
    let mut disposals: Vec<DisposalRecord> = Vec::new();
    let mut income_events: Vec<IncomeEvent> = Vec::new();
    let mut skipped_count = 0usize;

    for tx in transactions {
        if options.excluded_assets.contains(&tx.asset) {
            continue;
        }
        if tx.kind.is_transfer() {
            continue;
        }

        if tx.kind.is_acquisition() {
            let Some(price) = tx.usable_price() else {
                log::warn!(
                    "missing price for {} of {} on {}, skipping lot creation",
                    tx.kind,
                    tx.asset,
                    tx.date()
                );
                skipped_count += 1;
                continue;
            };

            engine
                .ledger_mut()
                .add_lot(&tx.asset, tx.quantity, price, tx.date(), tx.fee);

            if tx.kind.is_income() {
                income_events.push(IncomeEvent {
                    date: tx.date(),
                    kind: tx.kind,
                    asset: tx.asset.clone(),
                    quantity: tx.quantity,
                    price_per_unit: price,
                    fair_market_value: tx.quantity * price,
                });
            }
        } else if tx.kind.is_disposal() {
            let Some(price) = tx.usable_price() else {
                log::warn!(
                    "missing price for {} of {} on {}, skipping disposal",
                    tx.kind,
                    tx.asset,
                    tx.date()
                );
                skipped_count += 1;
                continue;
            };

            // Lenient at ingestion: clamp to what the ledger holds
            // rather than failing the whole run.
            let available = engine.ledger().available(&tx.asset);
            let quantity = if tx.quantity > available {
                log::warn!(
                    "disposing {} {} but only {} available, clamping",
                    tx.quantity,
                    tx.asset,
                    available
                );
                available
            } else {
                tx.quantity
            };

            if quantity > Decimal::ZERO {
                // Cannot fail: quantity was clamped to available.
                match engine.dispose(&tx.asset, quantity, price, tx.date(), tx.fee) {
                    Ok(results) => disposals.extend(results.iter().map(DisposalRecord::from)),
                    Err(err) => {
                        log::error!("disposal failed after clamping: {err}");
                        skipped_count += 1;
                    }
                }
            }
        } else {
            log::warn!("skipping unknown transaction kind for {}", tx.asset);
            skipped_count += 1;
        }
    }

    let summary = engine.summary();
    TaxReport {
        income_count: income_events.len(),
        disposals,
        income_events,
        summary,
        skipped_count,
        method: engine.method(),
    }
}

/// Income-only view: fair market value of income-kind transactions
/// grouped per kind, independent of lot tracking.
pub fn calculate_income(
    transactions: &[TransactionRecord],
    options: &CalculatorOptions,
) -> IncomeReport {
    let mut income_events: Vec<IncomeEvent> = Vec::new();
    let mut by_kind: BTreeMap<TxKind, IncomeTotals> = BTreeMap::new();
    let mut total_income = Decimal::ZERO;

    for tx in transactions {
        if !tx.kind.is_income() || options.excluded_assets.contains(&tx.asset) {
            continue;
        }
        let Some(price) = tx.usable_price() else {
            log::warn!(
                "missing price for income event of {} on {}",
                tx.asset,
                tx.date()
            );
            continue;
        };

        let fair_market_value = tx.quantity * price;
        total_income += fair_market_value;

        let totals = by_kind.entry(tx.kind).or_default();
        totals.count += 1;
        totals.total_value += fair_market_value;

        income_events.push(IncomeEvent {
            date: tx.date(),
            kind: tx.kind,
            asset: tx.asset.clone(),
            quantity: tx.quantity,
            price_per_unit: price,
            fair_market_value,
        });
    }

    IncomeReport {
        event_count: income_events.len(),
        income_events,
        by_kind,
        total_income,
    }
}
