// Mon Oct 19 2026 - Alex

pub mod classify;
pub mod comparator;
pub mod error;
pub mod options;
pub mod report;

pub use classify::classify_line;
pub use comparator::{render, ComparisonEngine};
pub use error::ComparisonError;
pub use options::{ComparisonOptions, ProhibitedValueRule, Prohibition, RecordRemap};
pub use report::{ComparisonResult, Diff, TypeStats};
