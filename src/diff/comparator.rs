// Mon Oct 19 2026 - Alex

use crate::config::Config;
use crate::diff::classify::classify_line;
use crate::diff::error::ComparisonError;
use crate::diff::options::ComparisonOptions;
use crate::diff::report::{ComparisonResult, Diff, TypeStats};
use crate::finding::Finding;
use crate::layout::{Layout, LayoutError, TypedLayoutSet};
use crate::reader::{default_encodings, LineReader, ReadError, TextEncoding};
use crate::tax::{InvoiceKey, LineFault, RuleProfile, TaxAuditor};
use crate::utils::{percentage_or_full, scoped_timer};
use indexmap::IndexMap;
use std::path::Path;

/// Aligns a candidate file with a reference file by record type and reports
/// structural and arithmetic differences on the candidate.
pub struct ComparisonEngine {
    layouts: TypedLayoutSet,
    profile: RuleProfile,
    options: ComparisonOptions,
    encodings: Vec<TextEncoding>,
}

impl ComparisonEngine {
    pub fn new(
        layouts: TypedLayoutSet,
        profile: RuleProfile,
        options: ComparisonOptions,
    ) -> Result<Self, ComparisonError> {
        if layouts.is_empty() {
            return Err(LayoutError::Empty.into());
        }
        options.validate()?;
        Ok(Self {
            layouts,
            profile,
            options,
            encodings: default_encodings(),
        })
    }

    pub fn from_config(layouts: TypedLayoutSet, config: &Config) -> Result<Self, ComparisonError> {
        Ok(Self::new(layouts, config.rules.clone(), config.comparison.clone())?
            .with_encodings(config.encodings.clone()))
    }

    pub fn with_encodings(mut self, encodings: Vec<TextEncoding>) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn options(&self) -> &ComparisonOptions {
        &self.options
    }

    pub fn compare_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        reference: P,
        candidate: Q,
    ) -> Result<ComparisonResult, ComparisonError> {
        let reference = LineReader::open(reference, &self.encodings).map_err(reference_side)?;
        let candidate = LineReader::open(candidate, &self.encodings).map_err(candidate_side)?;
        self.compare_readers(&reference, &candidate)
    }

    /// First padded occurrence of each content record type in the reference.
    /// Only these lines are kept; the rest of the reference is streamed past.
    fn exemplars(&self, reference: &LineReader) -> Result<IndexMap<String, String>, ComparisonError> {
        let mut exemplars = IndexMap::new();
        for line in reference.padded(&self.layouts).map_err(reference_side)? {
            let line = line.map_err(reference_side)?;
            if line.is_blank() {
                continue;
            }
            let Some(record_type) = line.record_type() else {
                continue;
            };
            if self.profile.is_framing(record_type) || self.options.is_excluded(record_type) {
                continue;
            }
            if !exemplars.contains_key(record_type) {
                exemplars.insert(record_type.to_string(), line.text);
            }
        }
        log::debug!("Reference exemplars for {} record type(s)", exemplars.len());
        Ok(exemplars)
    }

    pub fn compare_readers(
        &self,
        reference: &LineReader,
        candidate: &LineReader,
    ) -> Result<ComparisonResult, ComparisonError> {
        let _timer = scoped_timer("comparison pass");
        let exemplars = self.exemplars(reference)?;
        let mut auditor = TaxAuditor::new(&self.profile);
        let mut invoice: Option<InvoiceKey> = None;

        let mut total_compared = 0;
        let mut with_differences = 0;
        let mut calculation_findings = 0;
        let mut diffs = Vec::new();
        let mut per_type: IndexMap<String, TypeStats> = IndexMap::new();

        for line in candidate.padded(&self.layouts).map_err(candidate_side)? {
            let line = line.map_err(candidate_side)?;
            if line.is_blank() {
                continue;
            }
            let Some(record_type) = line.record_type().map(str::to_string) else {
                continue;
            };
            if self.options.is_excluded(&record_type) {
                log::trace!("Line {}: type {} excluded", line.number, record_type);
                continue;
            }

            if record_type == self.profile.invoice_type {
                auditor.begin_invoice();
                invoice = Some(self.profile.invoice_key(&line.text));
            }

            let layout = self.layouts.layout_for(&record_type);
            let mut snapshot = None;
            let calculations = match layout {
                Some(layout) => {
                    if record_type == self.profile.totals_type {
                        snapshot = Some(auditor.ledger().snapshot());
                    }
                    audit_line(
                        &mut auditor,
                        &self.profile.totals_type,
                        line.number,
                        &record_type,
                        &line.text,
                        layout,
                        invoice.as_ref(),
                    )
                    .unwrap_or_else(|fault| {
                        vec![Finding::read_error(
                            line.number,
                            format!("Failed to process line {}: {}", line.number, fault),
                        )]
                    })
                }
                None => Vec::new(),
            };
            calculation_findings += calculations.len();

            if self.profile.is_framing(&record_type) {
                continue;
            }

            let reference_type = self.options.remap.reference_for(&record_type).to_string();
            let reference_text = match exemplars.get(&reference_type) {
                Some(text) => text.as_str(),
                None => {
                    log::debug!(
                        "Line {}: no reference record of type {}, comparing against blank",
                        line.number,
                        reference_type
                    );
                    ""
                }
            };

            let differences = match layout {
                Some(layout) => classify_line(line.number, layout, reference_text, &line.text, &self.options),
                None => Vec::new(),
            };

            total_compared += 1;
            let stats = per_type.entry(record_type.clone()).or_default();
            stats.compared += 1;
            if !differences.is_empty() {
                with_differences += 1;
                stats.with_differences += 1;
            }

            if differences.is_empty() && calculations.is_empty() {
                continue;
            }
            let (reference_render, candidate_render) = match layout {
                Some(layout) => (render(layout, reference_text), render(layout, &line.text)),
                None => (String::new(), line.text.clone()),
            };
            diffs.push(Diff {
                line: line.number,
                record_type,
                reference_type,
                reference_render,
                candidate_render,
                differences,
                calculations,
                totals_snapshot: snapshot,
            });
        }

        let identical = total_compared - with_differences;
        log::info!(
            "Compared {} line(s): {} with differences, {} calculation finding(s)",
            total_compared,
            with_differences,
            calculation_findings
        );

        Ok(ComparisonResult {
            total_compared,
            with_differences,
            identical,
            identity_rate: percentage_or_full(identical, total_compared),
            calculation_findings,
            diffs,
            per_type,
        })
    }
}

fn reference_side(source: ReadError) -> ComparisonError {
    ComparisonError::Read { side: "reference", source }
}

fn candidate_side(source: ReadError) -> ComparisonError {
    ComparisonError::Read { side: "candidate", source }
}

/// Tax checks, accumulation and, on a totals record, reconciliation.
fn audit_line(
    auditor: &mut TaxAuditor<'_>,
    totals_type: &str,
    line: usize,
    record_type: &str,
    text: &str,
    layout: &Layout,
    invoice: Option<&InvoiceKey>,
) -> Result<Vec<Finding>, LineFault> {
    let flags = auditor.check(record_type, text, layout)?;
    auditor.accumulate(line, record_type, text, layout, &flags)?;
    let mut findings: Vec<Finding> = flags.iter().map(|f| f.to_finding(line, invoice)).collect();
    if record_type == totals_type {
        findings.extend(auditor.reconcile(line, text, layout, invoice)?);
    }
    Ok(findings)
}

/// Field values of a line joined with `" | "`.
pub fn render(layout: &Layout, text: &str) -> String {
    itertools::join(layout.fields.iter().map(|f| f.extract(text)), " | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::FindingKind;
    use crate::layout::{FieldKind, FieldSpec};

    fn f(name: &str, start: usize, len: usize, kind: FieldKind) -> FieldSpec {
        FieldSpec::new(name, start, len, kind).unwrap()
    }

    fn layouts() -> TypedLayoutSet {
        TypedLayoutSet::partition(
            "nfcom",
            vec![
                f("NFE01-NUM-FATURA", 3, 13, FieldKind::Text),
                f("NFE01-NUM-NF", 24, 9, FieldKind::Integer),
                f("NFE22-ICM00-VLR-BC", 3, 10, FieldKind::Integer),
                f("NFE22-ICM00-ALIQ", 13, 6, FieldKind::Integer),
                f("NFE22-ICM00-VLR", 19, 10, FieldKind::Integer),
                f("NFE22-ICM00-ALIQ-FCP", 29, 6, FieldKind::Integer),
                f("NFE22-ICM00-VLR-FCP", 35, 10, FieldKind::Integer),
                f("NFE50-NOME", 3, 6, FieldKind::Text).required(true),
                f("NFE50-DT", 9, 8, FieldKind::Date),
                f("NFE51-NOME", 3, 6, FieldKind::Text),
                f("NFE51-DT", 9, 8, FieldKind::Date),
                f("NFE56-TOT-VLR-ICMS", 3, 10, FieldKind::Integer),
                f("NFE56-TOT-VLR-FCP", 13, 10, FieldKind::Integer),
            ],
        )
        .unwrap()
    }

    /// Blank line of `width` with `values` written at 1-based positions.
    fn record(record_type: &str, width: usize, values: &[(usize, &str)]) -> String {
        let mut chars: Vec<char> = format!("{:<width$}", record_type, width = width).chars().collect();
        for (start, value) in values {
            for (i, c) in value.chars().enumerate() {
                chars[start - 1 + i] = c;
            }
        }
        chars.into_iter().collect()
    }

    fn invoice() -> String {
        record("01", 32, &[(3, "0000000001111"), (24, "000001234")])
    }

    fn engine(options: ComparisonOptions) -> ComparisonEngine {
        ComparisonEngine::new(layouts(), RuleProfile::nfcom(), options).unwrap()
    }

    fn compare(engine: &ComparisonEngine, reference: &[String], candidate: &[String]) -> ComparisonResult {
        engine
            .compare_readers(
                &LineReader::from_text(&reference.join("\n")),
                &LineReader::from_text(&candidate.join("\n")),
            )
            .unwrap()
    }

    #[test]
    fn test_self_comparison_is_identical() {
        let lines = vec![
            "00HEADER".to_string(),
            invoice(),
            record("22", 44, &[(3, "0000050000"), (13, "001200"), (19, "0000006000"), (29, "000000"), (35, "0000000000")]),
            record("50", 16, &[(3, "ABC"), (9, "20240131")]),
            record("56", 22, &[(3, "0000006000"), (13, "0000000000")]),
            "99TRAILER".to_string(),
        ];
        let result = compare(&engine(ComparisonOptions::new()), &lines, &lines);
        assert_eq!(result.identity_rate, 100.0);
        assert_eq!(result.total_compared, 4);
        assert!(result.is_identical(), "{:?}", result.diffs);
    }

    #[test]
    fn test_self_comparison_ignores_values_both_sides_share() {
        let lines = vec![
            record("01", 32, &[(3, "0000000001111"), (24, "000000000")]),
            record("50", 16, &[(9, "20240131")]),
        ];
        let result = compare(&engine(ComparisonOptions::new()), &lines, &lines);
        assert_eq!(result.total_compared, 2);
        assert_eq!(result.with_differences, 0);
        assert_eq!(result.identity_rate, 100.0);
        assert!(result.is_identical(), "{:?}", result.diffs);
    }

    #[test]
    fn test_blank_required_field_is_reported_when_reference_has_it() {
        let reference = vec![record("50", 16, &[(3, "ABC"), (9, "20240131")])];
        let candidate = vec![record("50", 16, &[(9, "20240131")])];
        let result = compare(&engine(ComparisonOptions::new()), &reference, &candidate);
        assert_eq!(result.with_differences, 1);
        assert_eq!(result.diffs[0].differences[0].kind, FindingKind::MissingRequired);
        assert_eq!(result.diffs[0].differences[0].expected.as_deref(), Some("ABC"));
    }

    #[test]
    fn test_alignment_is_by_type_not_line_number() {
        let reference = vec![invoice(), record("50", 16, &[(3, "ABC"), (9, "20240131")])];
        let candidate = vec![
            invoice(),
            record("50", 16, &[(3, "XYZ"), (9, "20240229")]),
            record("50", 16, &[(3, "QRS"), (9, "2024-1-1")]),
        ];
        let result = compare(&engine(ComparisonOptions::new()), &reference, &candidate);
        assert_eq!(result.total_compared, 3);
        assert_eq!(result.with_differences, 1);
        assert_eq!(result.diffs.len(), 1);
        assert_eq!(result.diffs[0].line, 3);
        assert_eq!(result.diffs[0].differences[0].kind, FindingKind::DateFormat);
        assert_eq!(result.per_type["50"], TypeStats { compared: 2, with_differences: 1 });
        assert!((result.identity_rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_remap_uses_reference_type() {
        let reference = vec![record("50", 16, &[(3, "ABC"), (9, "20240131")])];
        let candidate = vec![record("51", 16, &[(3, "ABCDEF"), (9, "20240131")])];

        let plain = compare(&engine(ComparisonOptions::new()), &reference, &candidate);
        assert!(plain.is_identical());

        let remapped = compare(
            &engine(ComparisonOptions::new().with_remap("51", "50").unwrap()),
            &reference,
            &candidate,
        );
        assert_eq!(remapped.diffs.len(), 1);
        assert_eq!(remapped.diffs[0].reference_type, "50");
        assert_eq!(remapped.diffs[0].differences[0].kind, FindingKind::SizeMismatch);
        assert_eq!(remapped.diffs[0].reference_render, "ABC    | 20240131");
    }

    #[test]
    fn test_excluded_types_and_ignored_fields() {
        let reference = vec![record("50", 16, &[(3, "ABC"), (9, "20240131")])];
        let candidate = vec![
            record("50", 16, &[(3, "ABCDEF"), (9, "20240131")]),
            "77ONLY-IN-CANDIDATE".to_string(),
        ];
        let options = ComparisonOptions::new().exclude_type("77").ignore_field("NFE50-NOME");
        let result = compare(&engine(options), &reference, &candidate);
        assert_eq!(result.total_compared, 1);
        assert!(result.is_identical());
    }

    #[test]
    fn test_candidate_stream_calculations() {
        let lines = vec![
            invoice(),
            record("22", 44, &[(3, "0000050000"), (13, "001200"), (19, "0000006000"), (29, "000200"), (35, "0000000000")]),
            record("56", 22, &[(3, "0000006000"), (13, "0000000000")]),
        ];
        let result = compare(&engine(ComparisonOptions::new()), &lines, &lines);
        assert_eq!(result.identity_rate, 100.0);
        assert_eq!(result.calculation_findings, 2);
        assert_eq!(result.diffs.len(), 2);
        assert_eq!(result.diffs[0].calculations[0].tag(), "ZEROED_VALUE_FCP");
        assert_eq!(result.diffs[1].calculations[0].tag(), "TOTAL_FCP");
        let snapshot = result.diffs[1].totals_snapshot.as_ref().unwrap();
        assert_eq!(snapshot["NFE56-TOT-VLR-FCP"].hundredths(), 1000);
        assert!(result.format_report().contains("TOTAL_FCP"));
    }

    #[test]
    fn test_prohibited_invoice_number() {
        let reference = vec![invoice()];
        let candidate = vec![record("01", 32, &[(3, "0000000001111"), (24, "000000000")])];
        let result = compare(&engine(ComparisonOptions::new()), &reference, &candidate);
        assert_eq!(result.diffs.len(), 1);
        assert_eq!(result.diffs[0].differences[0].kind, FindingKind::ProhibitedValue);
    }

    #[test]
    fn test_unreadable_file_is_fatal() {
        let result = engine(ComparisonOptions::new()).compare_paths("/nonexistent/a.txt", "/nonexistent/b.txt");
        assert!(matches!(result, Err(ComparisonError::Read { side: "reference", .. })));
    }
}
