// Mon Oct 19 2026 - Alex

use crate::tax::amount::Amount;
use indexmap::IndexMap;

const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Clone, Default)]
struct Accumulator {
    sum: Amount,
    contributors: Vec<usize>,
    examples: Vec<String>,
}

/// Per-invoice running sums for each total field.
#[derive(Debug, Clone, Default)]
pub struct TotalsLedger {
    totals: IndexMap<String, Accumulator>,
}

impl TotalsLedger {
    pub fn new<'a, I: IntoIterator<Item = &'a str>>(total_fields: I) -> Self {
        Self {
            totals: total_fields
                .into_iter()
                .map(|f| (f.to_string(), Accumulator::default()))
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        for acc in self.totals.values_mut() {
            *acc = Accumulator::default();
        }
    }

    /// Adds a positive contribution. `example` renders the audit line and is
    /// only called for the first few contributors.
    pub fn add<F: FnOnce() -> String>(&mut self, total_field: &str, line: usize, amount: Amount, example: F) -> bool {
        if !amount.is_positive() {
            return false;
        }
        let acc = self.totals.entry(total_field.to_string()).or_default();
        acc.sum += amount;
        acc.contributors.push(line);
        if acc.examples.len() < MAX_EXAMPLES {
            acc.examples.push(example());
        }
        true
    }

    pub fn value(&self, total_field: &str) -> Amount {
        self.totals.get(total_field).map(|a| a.sum).unwrap_or_default()
    }

    pub fn contributors(&self, total_field: &str) -> &[usize] {
        self.totals
            .get(total_field)
            .map(|a| a.contributors.as_slice())
            .unwrap_or(&[])
    }

    /// `"ex1; ex2; ex3 (+N items)"`, or empty when nothing contributed.
    pub fn audit_trail(&self, total_field: &str) -> String {
        let Some(acc) = self.totals.get(total_field) else {
            return String::new();
        };
        if acc.examples.is_empty() {
            return String::new();
        }
        let mut trail = acc.examples.join("; ");
        let rest = acc.contributors.len().saturating_sub(acc.examples.len());
        if rest > 0 {
            trail.push_str(&format!(" (+{} items)", rest));
        }
        trail
    }

    pub fn snapshot(&self) -> IndexMap<String, Amount> {
        self.totals.iter().map(|(k, a)| (k.clone(), a.sum)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_positive_amounts_count() {
        let mut ledger = TotalsLedger::new(["T-PIS"]);
        assert!(!ledger.add("T-PIS", 3, Amount::ZERO, || "x".into()));
        assert!(ledger.add("T-PIS", 4, Amount::from_hundredths(115), || "x".into()));
        assert_eq!(ledger.value("T-PIS").hundredths(), 115);
        assert_eq!(ledger.contributors("T-PIS"), &[4]);
    }

    #[test]
    fn test_audit_trail_caps_examples() {
        let mut ledger = TotalsLedger::new(["T-BC"]);
        for line in 1..=5 {
            ledger.add("T-BC", line, Amount::from_hundredths(100), || format!("ln {:06}", line));
        }
        assert_eq!(
            ledger.audit_trail("T-BC"),
            "ln 000001; ln 000002; ln 000003 (+2 items)"
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut ledger = TotalsLedger::new(["T-BC"]);
        ledger.add("T-BC", 1, Amount::from_hundredths(100), String::new);
        ledger.reset();
        assert!(ledger.value("T-BC").is_zero());
        assert!(ledger.contributors("T-BC").is_empty());
        assert_eq!(ledger.audit_trail("T-BC"), "");
        assert_eq!(ledger.snapshot().len(), 1);
    }
}
