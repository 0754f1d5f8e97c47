// Mon Oct 19 2026 - Alex

pub mod engine;
pub mod error;
pub mod report;
pub mod state;

pub use crate::finding::{Finding, FindingKind};
pub use crate::tax::{InvoiceKey, RuleProfile};
pub use engine::ValidationEngine;
pub use error::ValidationError;
pub use report::ValidationResult;
pub use state::{DuplicateEntry, InvoiceGroup, InvoiceStats, InvoiceTracker, OpenItem};
