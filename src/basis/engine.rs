use crate::basis::ledger::LotLedger;
use crate::basis::lot::Lot;
use crate::basis::method::Method;
use crate::basis::summary::Summary;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;

/// Holding periods of at least this many days are long-term.
pub const LONG_TERM_DAYS: i64 = 365;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BasisError {
    #[error("cannot dispose {requested} {asset}: only {available} available")]
    InsufficientInventory {
        asset: String,
        requested: Decimal,
        available: Decimal,
    },
}

/// Gain/loss for the portion of a disposal matched against one lot. A
/// disposal spanning several lots yields one result per lot touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisposalResult {
    pub asset: String,
    pub quantity: Decimal,
    pub proceeds: Decimal,
    pub cost_basis: Decimal,
    pub gain_loss: Decimal,
    pub acquired_at: NaiveDate,
    pub disposed_at: NaiveDate,
    pub is_long_term: bool,
    pub lot_id: u64,
}

impl DisposalResult {
    /// Calendar days between acquisition and disposal.
    pub fn holding_days(&self) -> i64 {
        (self.disposed_at - self.acquired_at).num_days()
    }
}

/// Tracks acquisition lots and matches disposals against them under a
/// single ordering policy fixed at construction.
#[derive(Debug)]
pub struct CostBasisEngine {
    method: Method,
    ledger: LotLedger,
    disposals: Vec<DisposalResult>,
}

impl CostBasisEngine {
    pub fn new(method: Method) -> Self {
        CostBasisEngine {
            method,
            ledger: LotLedger::new(),
            disposals: Vec::new(),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn ledger(&self) -> &LotLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut LotLedger {
        &mut self.ledger
    }

    /// All disposal results recorded so far, in emission order.
    pub fn disposals(&self) -> &[DisposalResult] {
        &self.disposals
    }

    /// Dispose of an asset, consuming lots in method order. Fails hard
    /// when the requested quantity exceeds the available inventory;
    /// callers that prefer leniency must clamp before calling.
    pub fn dispose(
        &mut self,
        asset: &str,
        quantity: Decimal,
        proceeds_per_unit: Decimal,
        disposed_at: NaiveDate,
        fees: Decimal,
    ) -> Result<Vec<DisposalResult>, BasisError> {
        let available = self.ledger.available(asset);
        if quantity > available {
            return Err(BasisError::InsufficientInventory {
                asset: asset.to_string(),
                requested: quantity,
                available,
            });
        }

        let method = self.method;
        let mut results = Vec::new();
        let mut remaining_to_dispose = quantity;

        let lots = match self.ledger.lots_mut(asset) {
            Some(lots) => lots,
            None => return Ok(results),
        };

        for index in ordered_lot_indices(lots, method) {
            if remaining_to_dispose.is_zero() {
                break;
            }
            let lot = &mut lots[index];
            // A lot can be emptied by an earlier iteration of this walk.
            if lot.remaining <= Decimal::ZERO {
                continue;
            }

            let take = remaining_to_dispose.min(lot.remaining);
            let cost_basis = take * lot.cost_basis_per_unit();
            // Disposal fee is allocated by share of the requested
            // quantity, not by the lot's size.
            let fee_portion = take / quantity * fees;
            let proceeds = take * proceeds_per_unit - fee_portion;
            let gain_loss = proceeds - cost_basis;
            let holding_days = (disposed_at - lot.acquired_at).num_days();
            let is_long_term = holding_days >= LONG_TERM_DAYS;

            lot.remaining -= take;
            remaining_to_dispose -= take;

            log::debug!(
                "lot #{} TAKE: {} {} basis={} proceeds={} ({})",
                lot.id,
                take,
                asset,
                cost_basis,
                proceeds,
                if is_long_term { "long-term" } else { "short-term" }
            );

            results.push(DisposalResult {
                asset: asset.to_string(),
                quantity: take,
                proceeds,
                cost_basis,
                gain_loss,
                acquired_at: lot.acquired_at,
                disposed_at,
                is_long_term,
                lot_id: lot.id,
            });
        }

        self.disposals.extend(results.iter().cloned());
        Ok(results)
    }

    /// Aggregate over every disposal result recorded by this engine.
    pub fn summary(&self) -> Summary {
        Summary::from_disposals(&self.disposals)
    }
}

/// Candidate lots with remaining quantity, ordered per the method with
/// deterministic tiebreaks.
fn ordered_lot_indices(lots: &[Lot], method: Method) -> Vec<usize> {
    let mut indices: Vec<usize> = lots
        .iter()
        .enumerate()
        .filter(|(_, lot)| lot.remaining > Decimal::ZERO)
        .map(|(i, _)| i)
        .collect();

    match method {
        Method::Fifo => indices.sort_by(|&a, &b| {
            lots[a]
                .acquired_at
                .cmp(&lots[b].acquired_at)
                .then(lots[a].id.cmp(&lots[b].id))
        }),
        Method::Lifo => indices.sort_by(|&a, &b| {
            lots[b]
                .acquired_at
                .cmp(&lots[a].acquired_at)
                .then(lots[b].id.cmp(&lots[a].id))
        }),
        Method::Hifo => indices.sort_by(|&a, &b| {
            compare_cost_basis(&lots[b], &lots[a])
                .then(lots[a].acquired_at.cmp(&lots[b].acquired_at))
                .then(lots[a].id.cmp(&lots[b].id))
        }),
    }

    indices
}

fn compare_cost_basis(a: &Lot, b: &Lot) -> Ordering {
    a.cost_basis_per_unit().cmp(&b.cost_basis_per_unit())
}
