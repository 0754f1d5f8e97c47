// Mon Oct 19 2026 - Alex

pub mod encoding;
pub mod error;
pub mod line_reader;

pub use encoding::{default_encodings, TextEncoding};
pub use error::ReadError;
pub use line_reader::{pad_to, LineReader, Lines, SourceLine};
