pub mod calculate;
pub mod transaction;

// Flat public surface for the tax domain.
pub use calculate::{
    calculate, calculate_income, CalculatorOptions, DisposalRecord, IncomeEvent, IncomeReport,
    IncomeTotals, TaxReport,
};
pub use transaction::{TransactionRecord, TxKind};
