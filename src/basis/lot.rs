use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// A discrete acquisition of an asset, tracked until fully consumed by
/// disposals. Lots are never deleted; a lot with `remaining` at zero is
/// kept for audit.
#[derive(Debug, Clone)]
pub struct Lot {
    pub id: u64,
    pub asset: String,
    pub quantity: Decimal,
    pub cost_per_unit: Decimal,
    pub acquired_at: NaiveDate,
    /// Invariant: 0 <= remaining <= quantity
    pub remaining: Decimal,
    pub fees: Decimal,
}

impl Lot {
    /// Total acquisition cost including fees.
    pub fn total_cost(&self) -> Decimal {
        self.quantity * self.cost_per_unit + self.fees
    }

    /// Cost basis per unit with acquisition fees baked in.
    pub fn cost_basis_per_unit(&self) -> Decimal {
        if self.quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.total_cost() / self.quantity
        }
    }
}

/// Immutable view of a lot for inventory reporting.
#[derive(Debug, Clone, Serialize)]
pub struct LotSnapshot {
    pub lot_id: u64,
    pub quantity: Decimal,
    pub remaining: Decimal,
    pub cost_per_unit: Decimal,
    pub cost_basis_per_unit: Decimal,
    pub acquired_at: NaiveDate,
    pub total_cost: Decimal,
}

impl From<&Lot> for LotSnapshot {
    fn from(lot: &Lot) -> Self {
        LotSnapshot {
            lot_id: lot.id,
            quantity: lot.quantity,
            remaining: lot.remaining,
            cost_per_unit: lot.cost_per_unit,
            cost_basis_per_unit: lot.cost_basis_per_unit(),
            acquired_at: lot.acquired_at,
            total_cost: lot.total_cost(),
        }
    }
}
