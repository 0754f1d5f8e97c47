// Mon Oct 19 2026 - Alex

use crate::layout::LayoutError;
use crate::reader::ReadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComparisonError {
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("Cannot read {side} file: {source}")]
    Read {
        side: &'static str,
        #[source]
        source: ReadError,
    },
    #[error("Invalid record type remap '{0}', expected CAND=REF with two-character codes")]
    InvalidRemap(String),
}
