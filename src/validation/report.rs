// Mon Oct 19 2026 - Alex

use crate::finding::Finding;
use crate::tax::InvoiceKey;
use crate::validation::state::{InvoiceGroup, InvoiceStats};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of one validation pass.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub total_lines: usize,
    pub valid_lines: usize,
    pub lines_with_finding: usize,
    pub findings: Vec<Finding>,
    pub success_rate: f64,
    /// The finding cap stopped the scan early.
    pub truncated: bool,
    pub stats: InvoiceStats,
    pub groups: Vec<InvoiceGroup>,
    pub line_owner: BTreeMap<usize, InvoiceKey>,
}

impl ValidationResult {
    pub fn read_failure(finding: Finding) -> Self {
        Self {
            total_lines: 0,
            valid_lines: 0,
            lines_with_finding: 1,
            findings: vec![finding],
            success_rate: 0.0,
            truncated: false,
            stats: InvoiceStats::default(),
            groups: Vec::new(),
            line_owner: BTreeMap::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Invoice that owns a line, if the line came after an invoice record.
    pub fn owner_of(&self, line: usize) -> Option<&InvoiceKey> {
        self.line_owner.get(&line)
    }

    /// Finding count per tag, in first-seen order.
    pub fn counts_by_tag(&self) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for finding in &self.findings {
            *counts.entry(finding.tag()).or_insert(0) += 1;
        }
        counts
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn format_report(&self) -> String {
        let mut output = String::new();
        let title = "Validation Report";
        output.push_str(&format!("{}\n{}\n\n", title, "=".repeat(title.len())));

        output.push_str("Summary\n-------\n");
        output.push_str(&format!("  Lines:              {}\n", self.total_lines));
        output.push_str(&format!("  Valid lines:        {}\n", self.valid_lines));
        output.push_str(&format!("  Lines with finding: {}\n", self.lines_with_finding));
        output.push_str(&format!("  Success rate:       {:.2}%\n", self.success_rate));
        if self.truncated {
            output.push_str("  (scan stopped at the finding cap)\n");
        }

        output.push_str("\nInvoices\n--------\n");
        output.push_str(&format!("  Invoice records:    {}\n", self.stats.invoices));
        output.push_str(&format!("  Distinct faturas:   {}\n", self.stats.distinct_faturas));
        output.push_str(&format!("  Unique pairs:       {}\n", self.stats.unique_pairs));
        output.push_str(&format!("  Duplicates:         {}\n", self.stats.duplicates.len()));

        if !self.findings.is_empty() {
            output.push_str("\nBy kind\n-------\n");
            for (tag, count) in self.counts_by_tag() {
                output.push_str(&format!("  {:<28} {}\n", tag, count));
            }

            output.push_str("\nFindings\n--------\n");
            for finding in &self.findings {
                output.push_str(&format!("  {}\n", finding));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::FindingKind;

    fn sample() -> ValidationResult {
        let mut result = ValidationResult::read_failure(Finding::read_error(1, "boom".into()));
        result.findings.push(Finding::new(3, "F", "x", FindingKind::IncompleteItem, "missing".into()));
        result.findings.push(Finding::new(5, "F", "y", FindingKind::IncompleteItem, "missing".into()));
        result
    }

    #[test]
    fn test_counts_by_tag() {
        let counts = sample().counts_by_tag();
        assert_eq!(counts["READ_ERROR"], 1);
        assert_eq!(counts["INCOMPLETE_ITEM"], 2);
    }

    #[test]
    fn test_format_report_lists_findings() {
        let text = sample().format_report();
        assert!(text.contains("Success rate:       0.00%"));
        assert!(text.contains("ln 000003 [INCOMPLETE_ITEM] F: missing"));
    }

    #[test]
    fn test_json() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"total_lines\": 0"));
        assert!(json.contains("INCOMPLETE_ITEM"));
    }
}
