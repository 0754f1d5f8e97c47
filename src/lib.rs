// Mon Oct 19 2026 - Alex

pub mod config;
pub mod diff;
pub mod finding;
pub mod layout;
pub mod reader;
pub mod tax;
pub mod ui;
pub mod utils;
pub mod validation;

pub use config::Config;
pub use diff::{ComparisonEngine, ComparisonOptions, ComparisonResult};
pub use finding::{Finding, FindingKind};
pub use layout::{TypedLayoutSet, TypedLayoutSetBuilder};
pub use reader::LineReader;
pub use validation::{ValidationEngine, ValidationResult};
