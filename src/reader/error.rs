// Mon Oct 19 2026 - Alex

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not decode input with any of: {tried}")]
    Undecodable { tried: String },
    #[error("No encodings configured")]
    NoEncodings,
}
