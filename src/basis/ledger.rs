use crate::basis::lot::{Lot, LotSnapshot};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Sole owner of acquisition lots, keyed by asset symbol with insertion
/// order preserved per asset. Inputs are assumed validated by the
/// caller; the ledger itself does not reject negative values.
#[derive(Debug, Default)]
pub struct LotLedger {
    lots: BTreeMap<String, Vec<Lot>>,
    next_lot_id: u64,
}

impl LotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an acquisition. Lot ids increase monotonically across all
    /// assets and are never reused.
    pub fn add_lot(
        &mut self,
        asset: &str,
        quantity: Decimal,
        cost_per_unit: Decimal,
        acquired_at: NaiveDate,
        fees: Decimal,
    ) -> LotSnapshot {
        self.next_lot_id += 1;
        let lot = Lot {
            id: self.next_lot_id,
            asset: asset.to_string(),
            quantity,
            cost_per_unit,
            acquired_at,
            remaining: quantity,
            fees,
        };
        log::debug!(
            "lot #{} ADD: {} {} @ {} (fees {})",
            lot.id,
            quantity,
            asset,
            cost_per_unit,
            fees
        );
        let snapshot = LotSnapshot::from(&lot);
        self.lots.entry(asset.to_string()).or_default().push(lot);
        snapshot
    }

    /// Unconsumed quantity across all lots of an asset.
    pub fn available(&self, asset: &str) -> Decimal {
        self.lots
            .get(asset)
            .map(|lots| lots.iter().map(|l| l.remaining).sum())
            .unwrap_or(Decimal::ZERO)
    }

    /// Lots with remaining quantity for one asset, insertion order.
    pub fn open_lots(&self, asset: &str) -> Vec<LotSnapshot> {
        self.lots
            .get(asset)
            .map(|lots| {
                lots.iter()
                    .filter(|l| l.remaining > Decimal::ZERO)
                    .map(LotSnapshot::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remaining inventory for every asset, filtered to open lots.
    pub fn inventory(&self) -> BTreeMap<String, Vec<LotSnapshot>> {
        self.lots
            .iter()
            .map(|(asset, _)| (asset.clone(), self.open_lots(asset)))
            .filter(|(_, lots)| !lots.is_empty())
            .collect()
    }

    pub(crate) fn lots_mut(&mut self, asset: &str) -> Option<&mut Vec<Lot>> {
        self.lots.get_mut(asset)
    }

    #[cfg(test)]
    pub(crate) fn lots(&self, asset: &str) -> &[Lot] {
        self.lots.get(asset).map(Vec::as_slice).unwrap_or(&[])
    }
}
