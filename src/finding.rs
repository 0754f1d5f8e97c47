// Mon Oct 19 2026 - Alex

use serde::{Serialize, Serializer};
use std::fmt;

/// Category of a finding. `tag()` gives the stable report code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FindingKind {
    ReadError,
    DuplicateRecordType,
    DuplicateInvoice,
    CalculationMismatch { tax: String },
    ZeroedValue { tax: String },
    TotalMismatch { total: String },
    HeaderCount,
    TrailerCount,
    FinancialItemWithTax,
    IncompleteItem,
    MissingRequired,
    SizeMismatch,
    NumericFormat,
    DateFormat,
    ProhibitedValue,
}

impl FindingKind {
    pub fn tag(&self) -> String {
        match self {
            FindingKind::ReadError => "READ_ERROR".to_string(),
            FindingKind::DuplicateRecordType => "DUPLICATE_RECORD_TYPE".to_string(),
            FindingKind::DuplicateInvoice => "DUPLICATE_INVOICE".to_string(),
            FindingKind::CalculationMismatch { tax } => format!("CALCULATION_ERROR_{}", tax),
            FindingKind::ZeroedValue { tax } => format!("ZEROED_VALUE_{}", tax),
            FindingKind::TotalMismatch { total } => format!("TOTAL_{}", total),
            FindingKind::HeaderCount => "HEADER_INVOICE_COUNT".to_string(),
            FindingKind::TrailerCount => "TRAILER_INVOICE_COUNT".to_string(),
            FindingKind::FinancialItemWithTax => "FINANCIAL_ITEM_WITH_TAX".to_string(),
            FindingKind::IncompleteItem => "INCOMPLETE_ITEM".to_string(),
            FindingKind::MissingRequired => "MISSING_REQUIRED".to_string(),
            FindingKind::SizeMismatch => "SIZE_MISMATCH".to_string(),
            FindingKind::NumericFormat => "INVALID_NUMBER".to_string(),
            FindingKind::DateFormat => "INVALID_DATE".to_string(),
            FindingKind::ProhibitedValue => "PROHIBITED_VALUE".to_string(),
        }
    }

    /// Calculation and totals findings, as opposed to structural ones.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            FindingKind::CalculationMismatch { .. }
                | FindingKind::ZeroedValue { .. }
                | FindingKind::TotalMismatch { .. }
        )
    }
}

impl Serialize for FindingKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag())
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// One reported problem, tied to a 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub line: usize,
    pub field: String,
    pub observed: String,
    pub kind: FindingKind,
    pub description: String,
    pub expected: Option<String>,
}

impl Finding {
    pub fn new(line: usize, field: &str, observed: &str, kind: FindingKind, description: String) -> Self {
        Self {
            line,
            field: field.to_string(),
            observed: observed.to_string(),
            kind,
            description,
            expected: None,
        }
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn tag(&self) -> String {
        self.kind.tag()
    }

    pub fn read_error(line: usize, description: String) -> Self {
        Self::new(line, "", "", FindingKind::ReadError, description)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ln {:06} [{}]", self.line, self.tag())?;
        if !self.field.is_empty() {
            write!(f, " {}", self.field)?;
        }
        write!(f, ": {}", self.description)?;
        if let Some(expected) = &self.expected {
            write!(f, " (expected {})", expected)?;
        }
        Ok(())
    }
}
