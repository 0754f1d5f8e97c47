// Mon Oct 19 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Field '{0}' has invalid start position 0")]
    InvalidStart(String),
    #[error("Field '{0}' has invalid length 0")]
    InvalidLength(String),
    #[error("Duplicate field '{field}' in record type {record_type}")]
    DuplicateField { record_type: String, field: String },
    #[error("Overlap between '{first}' ({first_start}-{first_end}) and '{second}' ({second_start}-{second_end}) in record type {record_type}")]
    Overlap {
        record_type: String,
        first: String,
        first_start: usize,
        first_end: usize,
        second: String,
        second_start: usize,
        second_end: usize,
    },
    #[error("Unknown field kind '{kind}' for field '{field}'")]
    UnknownKind { field: String, kind: String },
    #[error("Layout has no fields")]
    Empty,
    #[error("Layout could not be resolved: {0}")]
    Unresolved(String),
}
