// Mon Oct 19 2026 - Alex

use crate::layout::field::slice_chars;
use crate::tax::rules::{TaxCheck, TotalSource};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record-type codes and rule tables for one interchange format.
/// Defaults describe the NFCOM layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleProfile {
    pub header_type: String,
    pub invoice_type: String,
    pub item_type: String,
    pub financial_marker_type: String,
    pub totals_type: String,
    pub transaction_type: String,
    pub trailer_type: String,
    pub repeat_allowed: Vec<String>,
    /// 1-based start and length of the fatura number on the invoice record.
    pub fatura_position: (usize, usize),
    pub nf_position: (usize, usize),
    pub tax_checks: Vec<TaxCheck>,
    pub total_sources: Vec<TotalSource>,
    pub item_taxes: Vec<String>,
    pub header_count_fields: Vec<String>,
    pub trailer_count_fields: Vec<String>,
    pub transaction_pattern: String,
}

impl Default for RuleProfile {
    fn default() -> Self {
        Self::nfcom()
    }
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl RuleProfile {
    pub fn nfcom() -> Self {
        Self {
            header_type: "00".into(),
            invoice_type: "01".into(),
            item_type: "20".into(),
            financial_marker_type: "36".into(),
            totals_type: "56".into(),
            transaction_type: "90".into(),
            trailer_type: "99".into(),
            repeat_allowed: codes(&["00", "99", "20", "22", "36", "38", "40", "42", "44"]),
            fatura_position: (3, 13),
            nf_position: (24, 9),
            tax_checks: vec![
                TaxCheck::new("38", "PIS", "NFE38-PIS-VLR-BC", "NFE38-PIS-ALIQ", "NFE38-PIS-VLR"),
                TaxCheck::new("40", "COFINS", "NFE40-COFINS-VLR-BC", "NFE40-COFINS-ALIQ", "NFE40-COFINS-VLR"),
                TaxCheck::new("42", "FUST", "NFE42-FUST-VLR-BC", "NFE42-FUST-ALIQ", "NFE42-FUST-VLR"),
                TaxCheck::new("44", "FUNTEL", "NFE44-FUNTEL-VLR-BC", "NFE44-FUNTEL-ALIQ", "NFE44-FUNTEL-VLR"),
                TaxCheck::new("30", "ICMS", "NFE30-ICM90-VLR-BC", "NFE30-ICM90-ALIQ", "NFE30-ICM90-VLR"),
                TaxCheck::new("22", "ICMS", "NFE22-ICM00-VLR-BC", "NFE22-ICM00-ALIQ", "NFE22-ICM00-VLR"),
                TaxCheck::new("22", "FCP", "NFE22-ICM00-VLR-BC", "NFE22-ICM00-ALIQ-FCP", "NFE22-ICM00-VLR-FCP"),
            ],
            total_sources: vec![
                TotalSource::new("NFE56-TOT-VLR-PIS", "38", "NFE38-PIS-VLR"),
                TotalSource::new("NFE56-TOT-VLR-COFINS", "40", "NFE40-COFINS-VLR"),
                TotalSource::new("NFE56-TOT-VLR-FUST", "42", "NFE42-FUST-VLR"),
                TotalSource::new("NFE56-TOT-VLR-FUNTEL", "44", "NFE44-FUNTEL-VLR"),
                TotalSource::new("NFE56-TOT-VLR-ICMS", "22", "NFE22-ICM00-VLR"),
                TotalSource::new("NFE56-TOT-VLR-FCP", "22", "NFE22-ICM00-VLR-FCP"),
                TotalSource::new("NFE56-TOT-VLR-BC", "22", "NFE22-ICM00-VLR-BC"),
            ],
            item_taxes: codes(&["22", "38", "40", "42", "44"]),
            header_count_fields: codes(&["NFE00-QTD-NF", "NFE00-TOT-NF", "NFE00-QTD-NOTAS"]),
            trailer_count_fields: codes(&["NFE99-QTDE-DOC-NFCOM"]),
            transaction_pattern: r"\b\d{10,18}FTC\b".into(),
        }
    }

    pub fn repeat_allowed(&self, record_type: &str) -> bool {
        self.repeat_allowed.iter().any(|c| c == record_type)
    }

    pub fn is_item_tax(&self, record_type: &str) -> bool {
        self.item_taxes.iter().any(|c| c == record_type)
    }

    /// Header and trailer records are framing, not content.
    pub fn is_framing(&self, record_type: &str) -> bool {
        record_type == self.header_type || record_type == self.trailer_type
    }

    pub fn checks_for<'a>(&'a self, record_type: &'a str) -> impl Iterator<Item = &'a TaxCheck> + 'a {
        self.tax_checks.iter().filter(move |c| c.record_type == record_type)
    }

    pub fn sources_for<'a>(&'a self, record_type: &'a str) -> impl Iterator<Item = &'a TotalSource> + 'a {
        self.total_sources.iter().filter(move |s| s.record_type == record_type)
    }

    /// Ordered, de-duplicated total field names.
    pub fn total_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for source in &self.total_sources {
            if !fields.contains(&source.total_field.as_str()) {
                fields.push(&source.total_field);
            }
        }
        fields
    }

    /// Invoice identity of an invoice record. Blank parts become `"0"`.
    pub fn invoice_key(&self, text: &str) -> InvoiceKey {
        let part = |(start, len): (usize, usize)| {
            let value = slice_chars(text, start.saturating_sub(1), len).trim();
            if value.is_empty() {
                "0".to_string()
            } else {
                value.to_string()
            }
        };
        InvoiceKey {
            fatura: part(self.fatura_position),
            nf: part(self.nf_position),
        }
    }
}

/// (fatura, NF) pair identifying an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvoiceKey {
    pub fatura: String,
    pub nf: String,
}

impl InvoiceKey {
    pub fn new(fatura: &str, nf: &str) -> Self {
        Self {
            fatura: fatura.to_string(),
            nf: nf.to_string(),
        }
    }
}

impl fmt::Display for InvoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fatura {} | NF {}", self.fatura, self.nf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_key_positions() {
        let mut line = String::from("01");
        line.push_str("0000000001111");
        line.push_str(&" ".repeat(8));
        line.push_str("000001234");
        let key = RuleProfile::nfcom().invoice_key(&line);
        assert_eq!(key, InvoiceKey::new("0000000001111", "000001234"));
        assert_eq!(key.to_string(), "Fatura 0000000001111 | NF 000001234");
    }

    #[test]
    fn test_blank_invoice_parts_default_to_zero() {
        let key = RuleProfile::nfcom().invoice_key("01");
        assert_eq!(key, InvoiceKey::new("0", "0"));
    }

    #[test]
    fn test_tables() {
        let profile = RuleProfile::default();
        assert_eq!(profile.checks_for("22").count(), 2);
        assert_eq!(profile.sources_for("22").count(), 3);
        assert!(profile.repeat_allowed("38"));
        assert!(!profile.repeat_allowed("01"));
        assert!(profile.is_framing("99"));
        assert_eq!(profile.total_fields().len(), 7);
    }
}
