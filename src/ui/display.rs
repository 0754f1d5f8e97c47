// Mon Oct 19 2026 - Alex

use crate::diff::ComparisonResult;
use crate::finding::Finding;
use crate::utils::{pluralize, truncate_string};
use crate::validation::ValidationResult;
use colored::*;
use std::collections::BTreeMap;

const MAX_LINE_PREVIEW: usize = 120;

pub struct DisplayRenderer {
    max_items: usize,
}

impl DisplayRenderer {
    pub fn new(max_items: usize) -> Self {
        Self { max_items }
    }

    fn finding_line(&self, finding: &Finding) -> String {
        let tag = finding.tag();
        let tag = if finding.kind.is_arithmetic() {
            tag.yellow()
        } else {
            tag.red()
        };
        let mut text = format!("  ln {:06} [{}] {}", finding.line, tag, finding.description);
        if let Some(expected) = &finding.expected {
            text.push_str(&format!(" {}", format!("(expected {})", expected).dimmed()));
        }
        text
    }

    /// Prints the summary plus the first findings, each followed by the raw
    /// line it points at.
    pub fn print_validation(&self, result: &ValidationResult, raw: &BTreeMap<usize, String>) {
        println!("{}", "Validation".cyan().bold());
        println!("  Lines:        {}", result.total_lines);
        println!("  Valid:        {}", result.valid_lines.to_string().green());
        println!("  With finding: {}", result.lines_with_finding.to_string().red());
        let rate = format!("{:.2}%", result.success_rate);
        println!(
            "  Success rate: {}",
            if result.is_clean() { rate.green() } else { rate.yellow() }
        );
        println!(
            "  Invoices:     {} ({} unique, {} duplicate)",
            result.stats.invoices,
            result.stats.unique_pairs,
            result.stats.duplicates.len()
        );
        if result.truncated {
            println!("  {}", "Scan stopped at the finding cap".yellow());
        }

        if result.is_clean() {
            println!("{}", "No findings".green());
            return;
        }

        println!();
        for (tag, count) in result.counts_by_tag() {
            println!("  {:<28} {}", tag, count);
        }

        println!();
        for finding in result.findings.iter().take(self.max_items) {
            println!("{}", self.finding_line(finding));
            if let Some(owner) = result.owner_of(finding.line) {
                println!("    {}", owner.to_string().dimmed());
            }
            if let Some(text) = raw.get(&finding.line) {
                println!("    {}", truncate_string(text, MAX_LINE_PREVIEW).dimmed());
            }
        }
        if result.findings.len() > self.max_items {
            let rest = result.findings.len() - self.max_items;
            println!("  ... and {} more", pluralize(rest, "finding", "findings"));
        }
    }

    pub fn print_comparison(&self, result: &ComparisonResult) {
        println!("{}", "Comparison".cyan().bold());
        println!("  Compared:         {}", result.total_compared);
        println!("  Identical:        {}", result.identical.to_string().green());
        println!("  With differences: {}", result.with_differences.to_string().red());
        println!("  Calculations:     {}", result.calculation_findings);
        println!("  Identity rate:    {:.2}%", result.identity_rate);

        if result.is_identical() {
            println!("{}", "Files are structurally identical".green());
            return;
        }

        for diff in result.diffs.iter().take(self.max_items) {
            println!();
            println!(
                "{} {} (type {} / reference {})",
                "Line".bold(),
                diff.line,
                diff.record_type,
                diff.reference_type
            );
            println!("  REF:  {}", truncate_string(&diff.reference_render, MAX_LINE_PREVIEW));
            println!("  CAND: {}", truncate_string(&diff.candidate_render, MAX_LINE_PREVIEW));
            for finding in diff.findings() {
                println!("{}", self.finding_line(finding));
            }
        }
        if result.diffs.len() > self.max_items {
            let rest = result.diffs.len() - self.max_items;
            println!("\n  ... and {} more", pluralize(rest, "line", "lines"));
        }
    }
}
