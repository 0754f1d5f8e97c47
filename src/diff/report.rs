// Mon Oct 19 2026 - Alex

use crate::finding::Finding;
use crate::tax::Amount;
use indexmap::IndexMap;
use serde::Serialize;

/// One candidate line with something to report.
#[derive(Debug, Clone, Serialize)]
pub struct Diff {
    pub line: usize,
    pub record_type: String,
    /// Record type the reference side was looked up under.
    pub reference_type: String,
    pub reference_render: String,
    pub candidate_render: String,
    /// Structural differences against the reference exemplar.
    pub differences: Vec<Finding>,
    /// Calculation and totals findings on the candidate stream.
    pub calculations: Vec<Finding>,
    pub totals_snapshot: Option<IndexMap<String, Amount>>,
}

impl Diff {
    pub fn is_structural(&self) -> bool {
        !self.differences.is_empty()
    }

    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.differences.iter().chain(self.calculations.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeStats {
    pub compared: usize,
    pub with_differences: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub total_compared: usize,
    pub with_differences: usize,
    pub identical: usize,
    pub diffs: Vec<Diff>,
    /// Share of compared lines without structural differences.
    pub identity_rate: f64,
    pub calculation_findings: usize,
    pub per_type: IndexMap<String, TypeStats>,
}

impl ComparisonResult {
    pub fn is_identical(&self) -> bool {
        self.diffs.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn format_report(&self) -> String {
        let mut output = String::new();
        let title = "Structural Comparison Report";
        output.push_str(&format!("{}\n{}\n\n", title, "=".repeat(title.len())));

        output.push_str("Summary\n-------\n");
        output.push_str(&format!("  Lines compared:       {}\n", self.total_compared));
        output.push_str(&format!("  Identical:            {}\n", self.identical));
        output.push_str(&format!("  With differences:     {}\n", self.with_differences));
        output.push_str(&format!("  Calculation findings: {}\n", self.calculation_findings));
        output.push_str(&format!("  Identity rate:        {:.2}%\n", self.identity_rate));

        if !self.per_type.is_empty() {
            output.push_str("\nBy record type\n--------------\n");
            for (record_type, stats) in &self.per_type {
                output.push_str(&format!(
                    "  {}: {} compared, {} with differences\n",
                    record_type, stats.compared, stats.with_differences
                ));
            }
        }

        for diff in &self.diffs {
            output.push_str(&format!("\nLine {} (type {}", diff.line, diff.record_type));
            if diff.reference_type != diff.record_type {
                output.push_str(&format!(" vs reference {}", diff.reference_type));
            }
            output.push_str(")\n");
            output.push_str(&format!("  REF:  {}\n", diff.reference_render));
            output.push_str(&format!("  CAND: {}\n", diff.candidate_render));
            for finding in diff.findings() {
                output.push_str(&format!("  - [{}] {}\n", finding.tag(), finding.description));
            }
            if let Some(snapshot) = &diff.totals_snapshot {
                let totals = itertools::join(snapshot.iter().map(|(k, v)| format!("{}={}", k, v)), ", ");
                output.push_str(&format!("  Accumulated: {}\n", totals));
            }
        }

        output
    }
}
