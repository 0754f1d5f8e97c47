// Mon Oct 19 2026 - Alex

use crate::layout::LayoutError;
use crate::reader::ReadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("Read error: {0}")]
    Read(#[from] ReadError),
    #[error("Invalid transaction pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
