// Mon Oct 19 2026 - Alex

use crate::finding::{Finding, FindingKind};
use crate::layout::Layout;
use crate::tax::amount::{Amount, LineFault};
use crate::tax::ledger::TotalsLedger;
use crate::tax::profile::{InvoiceKey, RuleProfile};
use crate::tax::rules::{evaluate, total_suffix, TaxCheck, TaxOutcome};

/// A tax check that failed on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxFlag {
    pub check: TaxCheck,
    pub outcome: TaxOutcome,
}

impl TaxFlag {
    pub fn to_finding(&self, line: usize, invoice: Option<&InvoiceKey>) -> Finding {
        let who = identify(line, invoice);
        let tax = self.check.tax.clone();
        let observed = self.outcome.declared().to_string();
        match self.outcome {
            TaxOutcome::ZeroedValue { base, rate, expected } => Finding::new(
                line,
                &self.check.value_field,
                &observed,
                FindingKind::ZeroedValue { tax },
                format!(
                    "{} ({}): BC={} × Rate={}% = Expected={} | Found=0,00 (value zeroed)",
                    self.check.tax, who, base, rate, expected
                ),
            )
            .with_expected(expected.to_string()),
            TaxOutcome::Mismatch { base, rate, declared, expected } => Finding::new(
                line,
                &self.check.value_field,
                &observed,
                FindingKind::CalculationMismatch { tax },
                format!(
                    "{} ({}): BC={} × Rate={}% = Calculated={} | Declared={} | Difference={}",
                    self.check.tax,
                    who,
                    base,
                    rate,
                    expected,
                    declared,
                    declared - expected
                ),
            )
            .with_expected(expected.to_string()),
        }
    }
}

fn identify(line: usize, invoice: Option<&InvoiceKey>) -> String {
    match invoice {
        Some(key) => key.to_string(),
        None => format!("Line {}", line),
    }
}

/// Tax calculation checks and per-invoice totals reconciliation over a
/// stream of records.
pub struct TaxAuditor<'a> {
    profile: &'a RuleProfile,
    ledger: TotalsLedger,
}

impl<'a> TaxAuditor<'a> {
    pub fn new(profile: &'a RuleProfile) -> Self {
        Self {
            profile,
            ledger: TotalsLedger::new(profile.total_fields()),
        }
    }

    pub fn begin_invoice(&mut self) {
        self.ledger.reset();
    }

    pub fn ledger(&self) -> &TotalsLedger {
        &self.ledger
    }

    /// Runs every tax check configured for `record_type` on one line.
    pub fn check(&self, record_type: &str, text: &str, layout: &Layout) -> Result<Vec<TaxFlag>, LineFault> {
        let mut flags = Vec::new();
        for check in self.profile.checks_for(record_type) {
            let base = layout.value(text, &check.base_field);
            let rate = layout.value(text, &check.rate_field);
            let value = layout.value(text, &check.value_field);
            if let Some(outcome) = evaluate(base, rate, value)? {
                log::trace!("{} on type {}: {:?}", check.tax, record_type, outcome);
                flags.push(TaxFlag {
                    check: check.clone(),
                    outcome,
                });
            }
        }
        Ok(flags)
    }

    /// Adds this line's contributions to the running totals and returns the
    /// total fields it fed. A value that failed its check contributes the
    /// corrected amount instead.
    pub fn accumulate(
        &mut self,
        line: usize,
        record_type: &str,
        text: &str,
        layout: &Layout,
        flags: &[TaxFlag],
    ) -> Result<Vec<String>, LineFault> {
        let profile = self.profile;
        let mut fed = Vec::new();
        for source in profile.sources_for(record_type) {
            let corrected = flags
                .iter()
                .find(|f| f.check.value_field == source.source_field)
                .map(|f| f.outcome.expected());
            let amount = match corrected {
                Some(amount) => amount,
                None => Amount::from_digits(layout.value(text, &source.source_field))?,
            };
            let added = self.ledger.add(&source.total_field, line, amount, || {
                audit_example(profile, line, text, layout, &source.source_field)
            });
            if added {
                fed.push(source.total_field.clone());
            }
        }
        Ok(fed)
    }

    /// Compares the declared totals on a totals record with the running sums.
    /// Totals the layout does not carry are skipped.
    pub fn reconcile(
        &self,
        line: usize,
        text: &str,
        layout: &Layout,
        invoice: Option<&InvoiceKey>,
    ) -> Result<Vec<Finding>, LineFault> {
        let mut findings = Vec::new();
        for total_field in self.profile.total_fields() {
            if !layout.has_field(total_field) {
                continue;
            }
            let declared = Amount::from_digits(layout.value(text, total_field))?;
            let calculated = self.ledger.value(total_field);
            if declared == calculated {
                continue;
            }

            let suffix = total_suffix(total_field);
            let mut description = format!(
                "Total {} mismatch: Declared={} | Calculated={} | Difference={}",
                suffix,
                declared,
                calculated,
                declared - calculated
            );
            if let Some(key) = invoice {
                description.push_str(&format!(" | {}", key));
            }
            let trail = self.ledger.audit_trail(total_field);
            if !trail.is_empty() {
                description.push_str(&format!(" | Calculation: {}", trail));
            }

            findings.push(
                Finding::new(
                    line,
                    total_field,
                    &declared.to_string(),
                    FindingKind::TotalMismatch {
                        total: suffix.to_string(),
                    },
                    description,
                )
                .with_expected(calculated.to_string()),
            );
        }
        Ok(findings)
    }
}

/// One audit line for a contributing record, rendered from its declared digits.
fn audit_example(profile: &RuleProfile, line: usize, text: &str, layout: &Layout, source_field: &str) -> String {
    let digits = |field: &str| Amount::from_digits(layout.value(text, field)).unwrap_or_default();

    if let Some(check) = profile.tax_checks.iter().find(|c| c.value_field == source_field) {
        return format!(
            "ln {:06}: BC={} × ALIQ={}% → VAL={}",
            line,
            digits(&check.base_field),
            digits(&check.rate_field),
            digits(&check.value_field)
        );
    }
    if profile.tax_checks.iter().any(|c| c.base_field == source_field) {
        return format!("ln {:06}: BC={}", line, digits(source_field));
    }
    format!("ln {:06}", line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FieldKind, FieldSpec};

    fn layout_22() -> Layout {
        let f = |name: &str, start: usize, len: usize| FieldSpec::new(name, start, len, FieldKind::Integer).unwrap();
        Layout::new(
            "22",
            Some("22"),
            vec![
                f("NFE22-ICM00-VLR-BC", 3, 10),
                f("NFE22-ICM00-ALIQ", 13, 6),
                f("NFE22-ICM00-VLR", 19, 10),
                f("NFE22-ICM00-ALIQ-FCP", 29, 6),
                f("NFE22-ICM00-VLR-FCP", 35, 10),
            ],
        )
        .unwrap()
    }

    fn layout_56() -> Layout {
        let f = |name: &str, start: usize, len: usize| FieldSpec::new(name, start, len, FieldKind::Integer).unwrap();
        Layout::new(
            "56",
            Some("56"),
            vec![
                f("NFE56-TOT-VLR-ICMS", 3, 10),
                f("NFE56-TOT-VLR-FCP", 13, 10),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_zeroed_fcp_is_flagged_and_corrected_in_totals() {
        let profile = RuleProfile::nfcom();
        let mut auditor = TaxAuditor::new(&profile);
        let layout = layout_22();
        let line = "220000050000001200000000600000020000000000000";

        let flags = auditor.check("22", line, &layout).unwrap();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].check.tax, "FCP");
        let finding = flags[0].to_finding(2, None);
        assert_eq!(finding.tag(), "ZEROED_VALUE_FCP");
        assert_eq!(finding.expected.as_deref(), Some("10,00"));
        assert_eq!(finding.observed, "0,00");

        let fed = auditor.accumulate(2, "22", line, &layout, &flags).unwrap();
        assert_eq!(fed.len(), 3);
        assert_eq!(auditor.ledger().value("NFE56-TOT-VLR-FCP").hundredths(), 1000);
        assert_eq!(auditor.ledger().value("NFE56-TOT-VLR-ICMS").hundredths(), 6000);

        let totals = "5600000060000000000000";
        let findings = auditor.reconcile(3, totals, &layout_56(), None).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].tag(), "TOTAL_FCP");
        assert!(findings[0].description.contains("ln 000002: BC=500,00 × ALIQ=2,00% → VAL=0,00"));
    }

    #[test]
    fn test_begin_invoice_resets_totals() {
        let profile = RuleProfile::nfcom();
        let mut auditor = TaxAuditor::new(&profile);
        let layout = layout_22();
        let line = "220000050000001200000000600000000000000000000";
        auditor.accumulate(2, "22", line, &layout, &[]).unwrap();
        assert!(auditor.ledger().value("NFE56-TOT-VLR-BC").is_positive());
        auditor.begin_invoice();
        assert!(auditor.ledger().value("NFE56-TOT-VLR-BC").is_zero());
    }
}
