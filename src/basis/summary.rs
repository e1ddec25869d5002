use crate::basis::engine::DisposalResult;
use rust_decimal::Decimal;
use serde::Serialize;

/// Aggregate gains/losses over a set of disposal results. Gains and
/// losses are accumulated in separate buckets, never netted within one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_proceeds: Decimal,
    pub total_cost_basis: Decimal,
    pub total_gain_loss: Decimal,
    pub short_term_gain: Decimal,
    pub short_term_loss: Decimal,
    pub long_term_gain: Decimal,
    pub long_term_loss: Decimal,
    pub disposal_count: usize,
}

impl Summary {
    pub fn from_disposals(disposals: &[DisposalResult]) -> Self {
        let mut summary = Summary {
            disposal_count: disposals.len(),
            ..Default::default()
        };

        for d in disposals {
            summary.total_proceeds += d.proceeds;
            summary.total_cost_basis += d.cost_basis;
            summary.total_gain_loss += d.gain_loss;

            let bucket = match (d.is_long_term, d.gain_loss >= Decimal::ZERO) {
                (false, true) => &mut summary.short_term_gain,
                (false, false) => &mut summary.short_term_loss,
                (true, true) => &mut summary.long_term_gain,
                (true, false) => &mut summary.long_term_loss,
            };
            *bucket += d.gain_loss;
        }

        summary
    }

    /// Net short-term result (gains plus losses).
    pub fn short_term_net(&self) -> Decimal {
        self.short_term_gain + self.short_term_loss
    }

    /// Net long-term result (gains plus losses).
    pub fn long_term_net(&self) -> Decimal {
        self.long_term_gain + self.long_term_loss
    }
}
