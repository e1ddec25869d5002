pub mod engine;
pub mod ledger;
pub mod lot;
pub mod method;
pub mod summary;

// Flat public surface for the cost basis domain.
pub use engine::{BasisError, CostBasisEngine, DisposalResult};
pub use ledger::LotLedger;
pub use lot::{Lot, LotSnapshot};
pub use method::Method;
pub use summary::Summary;
