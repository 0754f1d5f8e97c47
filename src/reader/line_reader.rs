// Mon Oct 19 2026 - Alex

use crate::layout::{line_record_type, TypedLayoutSet};
use crate::reader::encoding::TextEncoding;
use crate::reader::error::ReadError;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A physical line, numbered from 1, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

impl SourceLine {
    pub fn record_type(&self) -> Option<&str> {
        line_record_type(&self.text)
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Line source over one fixed-width file. The encoding is settled when the
/// reader is built; lines are decoded one at a time on each pass.
#[derive(Debug, Clone)]
pub struct LineReader {
    source: Source,
    encoding: TextEncoding,
}

impl LineReader {
    /// Picks the first encoding the whole file decodes under, scanning it
    /// line by line without holding it in memory.
    pub fn open<P: AsRef<Path>>(path: P, encodings: &[TextEncoding]) -> Result<Self, ReadError> {
        let source = Source::File(path.as_ref().to_path_buf());
        let encoding = detect(&source, encodings)?;
        log::debug!("Opened {} as {}", path.as_ref().display(), encoding);
        Ok(Self { source, encoding })
    }

    /// Tries each encoding in order and keeps the first that decodes.
    pub fn from_bytes(bytes: &[u8], encodings: &[TextEncoding]) -> Result<Self, ReadError> {
        let source = Source::Memory(bytes.to_vec());
        let encoding = detect(&source, encodings)?;
        Ok(Self { source, encoding })
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            source: Source::Memory(text.as_bytes().to_vec()),
            encoding: TextEncoding::Utf8,
        }
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Starts a fresh pass over the source.
    pub fn lines(&self) -> Result<Lines<'_>, ReadError> {
        Ok(Lines {
            input: open_source(&self.source)?,
            encoding: self.encoding,
            origin: origin(&self.source),
            number: 0,
            buf: Vec::new(),
            done: false,
        })
    }

    /// Lines right-padded with spaces to their record type's declared length.
    /// Longer lines, and lines too short to carry a type, are left untouched.
    pub fn padded<'a>(
        &'a self,
        layouts: &'a TypedLayoutSet,
    ) -> Result<impl Iterator<Item = Result<SourceLine, ReadError>> + 'a, ReadError> {
        Ok(self.lines()?.map(move |line| {
            line.map(|mut line| {
                if let Some(code) = line.record_type() {
                    let target = layouts.line_length(code);
                    pad_to(&mut line.text, target);
                }
                line
            })
        }))
    }

    /// Line number to raw text for the whole source. Holds every line, so
    /// only report rendering asks for it.
    pub fn raw_map(&self) -> Result<BTreeMap<usize, String>, ReadError> {
        self.lines()?.map(|line| line.map(|l| (l.number, l.text))).collect()
    }
}

/// Streaming iterator over decoded lines. Stops after the first error.
pub struct Lines<'a> {
    input: Box<dyn BufRead + 'a>,
    encoding: TextEncoding,
    origin: PathBuf,
    number: usize,
    buf: Vec<u8>,
    done: bool,
}

impl Iterator for Lines<'_> {
    type Item = Result<SourceLine, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.buf.clear();
        match self.input.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                self.number += 1;
                let bytes = strip_terminator(&self.buf);
                match self.encoding.decode(bytes) {
                    Some(text) => Some(Ok(SourceLine {
                        number: self.number,
                        text,
                    })),
                    None => {
                        self.done = true;
                        Some(Err(ReadError::Undecodable {
                            tried: format!("{} (line {})", self.encoding, self.number),
                        }))
                    }
                }
            }
            Err(source) => {
                self.done = true;
                Some(Err(ReadError::Io {
                    path: self.origin.clone(),
                    source,
                }))
            }
        }
    }
}

fn strip_terminator(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

fn origin(source: &Source) -> PathBuf {
    match source {
        Source::File(path) => path.clone(),
        Source::Memory(_) => PathBuf::from("<memory>"),
    }
}

fn open_source(source: &Source) -> Result<Box<dyn BufRead + '_>, ReadError> {
    match source {
        Source::File(path) => {
            let file = File::open(path).map_err(|source| ReadError::Io {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        Source::Memory(bytes) => Ok(Box::new(bytes.as_slice())),
    }
}

fn detect(source: &Source, encodings: &[TextEncoding]) -> Result<TextEncoding, ReadError> {
    if encodings.is_empty() {
        return Err(ReadError::NoEncodings);
    }
    for (i, encoding) in encodings.iter().enumerate() {
        if scan(open_source(source)?, *encoding).map_err(|e| ReadError::Io {
            path: origin(source),
            source: e,
        })? {
            if i > 0 {
                log::warn!("Input decoded with fallback encoding {}", encoding);
            }
            return Ok(*encoding);
        }
        log::debug!("Input is not valid {}", encoding);
    }
    Err(ReadError::Undecodable {
        tried: itertools::join(encodings.iter().map(|e| e.as_str()), ", "),
    })
}

/// True when every line decodes. `\n` never occurs inside a multi-byte
/// UTF-8 sequence, so splitting on it first is sound.
fn scan(mut input: Box<dyn BufRead + '_>, encoding: TextEncoding) -> std::io::Result<bool> {
    if encoding == TextEncoding::Latin1 {
        return Ok(true);
    }
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(true);
        }
        if !encoding.accepts(&buf) {
            return Ok(false);
        }
    }
}

/// Right-pads `text` with spaces up to `width` characters.
pub fn pad_to(text: &mut String, width: usize) {
    let current = text.chars().count();
    if current < width {
        text.extend(std::iter::repeat(' ').take(width - current));
    }
}
