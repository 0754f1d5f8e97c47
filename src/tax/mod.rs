// Mon Oct 19 2026 - Alex

pub mod amount;
pub mod audit;
pub mod ledger;
pub mod profile;
pub mod rules;

pub use amount::{Amount, LineFault};
pub use audit::{TaxAuditor, TaxFlag};
pub use ledger::TotalsLedger;
pub use profile::{InvoiceKey, RuleProfile};
pub use rules::{evaluate, TaxCheck, TaxOutcome, TotalSource};
