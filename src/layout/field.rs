// Mon Oct 19 2026 - Alex

use crate::layout::error::LayoutError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value kind of a positional field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Integer,
    Date,
    Decimal,
}

impl FieldKind {
    /// Normalizes the spellings found in layout spreadsheets.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "TEXTO" | "TEXT" | "TXT" | "ALFA" | "CHAR" | "STRING" | "VARCHAR" | "VARCHAR2" => {
                Some(FieldKind::Text)
            }
            "NUMERO" | "NUM" | "INT" | "INTEGER" | "NUMBER" | "BIGINT" | "SMALLINT" => {
                Some(FieldKind::Integer)
            }
            "DECIMAL" | "DEC" | "VALOR" | "NUMERIC" | "FLOAT" | "DOUBLE" | "REAL" => {
                Some(FieldKind::Decimal)
            }
            "DATA" | "DATE" | "DT" | "DATETIME" | "TIMESTAMP" => Some(FieldKind::Date),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "TEXT",
            FieldKind::Integer => "INTEGER",
            FieldKind::Date => "DATE",
            FieldKind::Decimal => "DECIMAL",
        }
    }

    /// Format check for a non-blank trimmed value. Blank values always pass.
    pub fn accepts(&self, value: &str, format: Option<&str>) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return true;
        }
        match self {
            FieldKind::Text => true,
            FieldKind::Integer => value.chars().all(|c| c.is_ascii_digit()),
            FieldKind::Decimal => is_decimal(value),
            FieldKind::Date => is_date(value, format),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn is_decimal(value: &str) -> bool {
    let mut separators = 0;
    let mut digits = 0;
    for c in value.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' | ',' => separators += 1,
            _ => return false,
        }
    }
    digits > 0 && separators <= 1
}

fn is_date(value: &str, format: Option<&str>) -> bool {
    let pattern = format.unwrap_or("YYYYMMDD").trim();
    if value.len() != pattern.len() {
        return false;
    }
    let chrono_pattern = pattern
        .replace("YYYY", "%Y")
        .replace("MM", "%m")
        .replace("DD", "%d");
    match NaiveDate::parse_from_str(value, &chrono_pattern) {
        Ok(date) => {
            let year = chrono::Datelike::year(&date);
            (1900..=2100).contains(&year)
        }
        Err(_) => false,
    }
}

/// One positional field of a record type. Positions are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub start: usize,
    pub length: usize,
    pub kind: FieldKind,
    pub required: bool,
    pub format: Option<String>,
}

impl FieldSpec {
    pub fn new(name: &str, start: usize, length: usize, kind: FieldKind) -> Result<Self, LayoutError> {
        if start == 0 {
            return Err(LayoutError::InvalidStart(name.to_string()));
        }
        if length == 0 {
            return Err(LayoutError::InvalidLength(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            start,
            length,
            kind,
            required: false,
            format: None,
        })
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn end(&self) -> usize {
        self.start + self.length - 1
    }

    pub fn overlaps(&self, other: &FieldSpec) -> bool {
        self.start <= other.end() && other.start <= self.end()
    }

    /// Raw slice of `line` covered by this field. Never longer than `length`;
    /// missing trailing positions are simply absent.
    pub fn extract<'a>(&self, line: &'a str) -> &'a str {
        slice_chars(line, self.start - 1, self.length)
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.kind.accepts(value, self.format.as_deref())
    }
}

/// Character-position slice with an ASCII fast path.
pub fn slice_chars(line: &str, offset: usize, len: usize) -> &str {
    if line.is_ascii() {
        let start = offset.min(line.len());
        let end = offset.saturating_add(len).min(line.len());
        return &line[start..end];
    }
    let mut indices = line.char_indices().map(|(i, _)| i).chain(std::iter::once(line.len()));
    let start = indices.nth(offset);
    match start {
        None => "",
        Some(start) => {
            let end = if len == 0 {
                start
            } else {
                indices.nth(len - 1).unwrap_or(line.len())
            };
            &line[start..end]
        }
    }
}
