// Mon Oct 19 2026 - Alex

use crate::config::Config;
use crate::finding::{Finding, FindingKind};
use crate::layout::{Layout, TypedLayoutSet};
use crate::reader::{default_encodings, LineReader, ReadError, SourceLine, TextEncoding};
use crate::tax::{Amount, LineFault, RuleProfile, TaxAuditor};
use crate::utils::{percentage_or_full, scoped_timer};
use crate::validation::error::ValidationError;
use crate::validation::report::ValidationResult;
use crate::validation::state::{InvoiceTracker, OpenItem};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;

/// Single-pass, stateful checker for cross-record rules on one file.
pub struct ValidationEngine {
    layouts: TypedLayoutSet,
    profile: RuleProfile,
    transaction_id: Regex,
    encodings: Vec<TextEncoding>,
    max_findings: Option<usize>,
}

impl ValidationEngine {
    pub fn new(layouts: TypedLayoutSet, profile: RuleProfile) -> Result<Self, ValidationError> {
        if layouts.is_empty() {
            return Err(crate::layout::LayoutError::Empty.into());
        }
        let transaction_id = Regex::new(&profile.transaction_pattern).map_err(|source| {
            ValidationError::InvalidPattern {
                pattern: profile.transaction_pattern.clone(),
                source,
            }
        })?;
        Ok(Self {
            layouts,
            profile,
            transaction_id,
            encodings: default_encodings(),
            max_findings: None,
        })
    }

    pub fn from_config(layouts: TypedLayoutSet, config: &Config) -> Result<Self, ValidationError> {
        Ok(Self::new(layouts, config.rules.clone())?
            .with_encodings(config.encodings.clone())
            .with_max_findings(config.max_findings))
    }

    pub fn with_encodings(mut self, encodings: Vec<TextEncoding>) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn with_max_findings(mut self, max_findings: Option<usize>) -> Self {
        self.max_findings = max_findings;
        self
    }

    pub fn profile(&self) -> &RuleProfile {
        &self.profile
    }

    /// Validates a file. A file that cannot be read or decoded yields a
    /// result holding a single read error on line 1.
    pub fn validate_path<P: AsRef<Path>>(&self, path: P) -> ValidationResult {
        let path = path.as_ref();
        match LineReader::open(path, &self.encodings) {
            Ok(reader) => self.validate_reader(&reader),
            Err(e) => {
                log::error!("Cannot validate {}: {}", path.display(), e);
                read_failure(&e)
            }
        }
    }

    /// Streams the reader through one pass. A read failure part way through
    /// is as fatal as one at open time.
    pub fn validate_reader(&self, reader: &LineReader) -> ValidationResult {
        let lines = match reader.padded(&self.layouts) {
            Ok(lines) => lines,
            Err(e) => return read_failure(&e),
        };
        let mut failure = None;
        let result = self.validate_lines(lines.map_while(|line| match line {
            Ok(line) => Some(line),
            Err(e) => {
                failure = Some(e);
                None
            }
        }));
        match failure {
            Some(e) => read_failure(&e),
            None => result,
        }
    }

    pub fn validate_lines<I: IntoIterator<Item = SourceLine>>(&self, lines: I) -> ValidationResult {
        let _timer = scoped_timer("validation pass");
        let mut pass = Pass::new(self);

        for line in lines {
            if line.is_blank() {
                continue;
            }
            pass.total_lines += 1;
            pass.process(&line);

            if let Some(max) = self.max_findings {
                if pass.findings.len() >= max {
                    log::warn!("Finding cap of {} reached at line {}, stopping", max, line.number);
                    pass.truncated = true;
                    break;
                }
            }
        }

        pass.finish()
    }
}

/// Mutable state of one validation pass.
struct Pass<'e> {
    engine: &'e ValidationEngine,
    auditor: TaxAuditor<'e>,
    invoices: InvoiceTracker,
    item: Option<OpenItem>,
    previous: Option<(usize, String)>,
    header_counts: Vec<(String, u64)>,
    findings: Vec<Finding>,
    total_lines: usize,
    truncated: bool,
}

impl<'e> Pass<'e> {
    fn new(engine: &'e ValidationEngine) -> Self {
        Self {
            engine,
            auditor: TaxAuditor::new(&engine.profile),
            invoices: InvoiceTracker::new(),
            item: None,
            previous: None,
            header_counts: Vec::new(),
            findings: Vec::new(),
            total_lines: 0,
            truncated: false,
        }
    }

    fn process(&mut self, line: &SourceLine) {
        let Some(record_type) = line.record_type().map(str::to_string) else {
            return;
        };
        let engine = self.engine;
        let profile = &engine.profile;
        let layout = engine.layouts.layout_for(&record_type);

        if record_type == profile.header_type {
            if let Some(layout) = layout {
                self.capture_header(&line.text, layout);
            }
        }

        self.check_repeat(line.number, &record_type);
        self.track_item(line.number, &record_type);

        if record_type == profile.invoice_type {
            self.open_invoice(line);
        }
        self.invoices.register_line(line.number);

        if let Some(layout) = layout {
            if let Err(fault) = self.audit_taxes(line, &record_type, layout) {
                log::debug!("Line {}: {}", line.number, fault);
                self.findings.push(
                    Finding::read_error(line.number, format!("Failed to process line {}: {}", line.number, fault))
                        .with_expected("Readable line"),
                );
            }
        }

        if record_type == profile.transaction_type {
            if let Some(m) = engine.transaction_id.find(&line.text) {
                self.invoices.set_transaction_id(m.as_str());
            }
        }

        if record_type == profile.trailer_type {
            self.check_trailer(line, layout);
        }

        self.previous = Some((line.number, record_type));
    }

    fn check_repeat(&mut self, number: usize, record_type: &str) {
        let Some((prev_line, prev_type)) = &self.previous else {
            return;
        };
        if *prev_line + 1 != number || prev_type != record_type {
            return;
        }
        if self.engine.profile.repeat_allowed(record_type) {
            return;
        }
        self.findings.push(
            Finding::new(
                number,
                &format!("TYPE-{}", record_type),
                record_type,
                FindingKind::DuplicateRecordType,
                format!("Record type {} repeated consecutively (previous line: {})", record_type, prev_line),
            )
            .with_expected("Different record types in sequence"),
        );
    }

    fn open_invoice(&mut self, line: &SourceLine) {
        let key = self.engine.profile.invoice_key(&line.text);
        self.auditor.begin_invoice();
        self.item = None;
        log::trace!("Line {}: invoice {}", line.number, key);

        if self.invoices.open(line.number, key.clone()) {
            log::info!("Duplicate invoice {} at line {}", key, line.number);
            self.findings.push(
                Finding::new(
                    line.number,
                    "INVOICE",
                    &format!("Fatura: {}, NF: {}", key.fatura, key.nf),
                    FindingKind::DuplicateInvoice,
                    format!("Fatura {} + NF {} was already used earlier in the file", key.fatura, key.nf),
                )
                .with_expected("Unique fatura + NF combination"),
            );
        }
    }

    fn audit_taxes(&mut self, line: &SourceLine, record_type: &str, layout: &Layout) -> Result<(), LineFault> {
        let invoice = self.invoices.current().cloned();
        let flags = self.auditor.check(record_type, &line.text, layout)?;
        let fed = self.auditor.accumulate(line.number, record_type, &line.text, layout, &flags)?;
        for total in &fed {
            self.invoices.record_contribution(total, line.number);
        }
        self.findings
            .extend(flags.iter().map(|f| f.to_finding(line.number, invoice.as_ref())));

        if record_type == self.engine.profile.totals_type {
            let totals = self.auditor.reconcile(line.number, &line.text, layout, invoice.as_ref())?;
            self.findings.extend(totals);
        }
        Ok(())
    }

    fn capture_header(&mut self, text: &str, layout: &Layout) {
        for field in &self.engine.profile.header_count_fields {
            if !layout.has_field(field) {
                continue;
            }
            let value = layout.value(text, field);
            if value.is_empty() {
                continue;
            }
            if let Some(count) = digits_to_count(value) {
                self.header_counts.push((field.clone(), count));
            }
        }
    }

    fn check_trailer(&mut self, line: &SourceLine, layout: Option<&Layout>) {
        let actual = self.invoices.count() as u64;
        let declared = layout.and_then(|layout| {
            self.engine
                .profile
                .trailer_count_fields
                .iter()
                .filter(|f| layout.has_field(f))
                .find_map(|f| {
                    let value = layout.value(&line.text, f);
                    (!value.is_empty()).then(|| (f.clone(), value))
                })
        });

        let Some((field, value)) = declared else {
            log::warn!(
                "No invoice count field found on trailer line {} (looked for {}); {} invoice(s) seen",
                line.number,
                self.engine.profile.trailer_count_fields.join(", "),
                actual
            );
            return;
        };

        match digits_to_count(value) {
            Some(count) if count == actual => {}
            Some(count) => self.findings.push(
                Finding::new(
                    line.number,
                    &field,
                    &count.to_string(),
                    FindingKind::TrailerCount,
                    format!("Trailer declares {} invoice(s), file has {}", count, actual),
                )
                .with_expected(actual.to_string()),
            ),
            None => self.findings.push(Finding::read_error(
                line.number,
                format!("Trailer count '{}' is not a representable number", value),
            )),
        }
    }

    fn track_item(&mut self, number: usize, record_type: &str) {
        let Some(invoice) = self.invoices.current().cloned() else {
            return;
        };
        let engine = self.engine;
        let profile = &engine.profile;

        if record_type == profile.item_type {
            self.close_item(number, &invoice);
            self.item = Some(OpenItem::new(number));
            return;
        }

        let Some(item) = self.item.as_mut() else {
            return;
        };

        if record_type == profile.financial_marker_type {
            if !item.seen.is_empty() {
                let seen = itertools::join(&item.seen, ", ");
                self.findings.push(
                    Finding::new(
                        number,
                        &format!("TYPE-{}", record_type),
                        &seen,
                        FindingKind::FinancialItemWithTax,
                        format!(
                            "{}: financial item opened at line {} carries taxes ({})",
                            invoice, item.line, seen
                        ),
                    )
                    .with_expected("No taxes on a financial item"),
                );
            }
            item.financial = true;
            return;
        }

        if profile.is_item_tax(record_type) {
            item.seen.insert(record_type.to_string());
            return;
        }

        self.close_item(number, &invoice);
    }

    fn close_item(&mut self, number: usize, invoice: &crate::tax::InvoiceKey) {
        let Some(item) = self.item.take() else {
            return;
        };
        let expected = &self.engine.profile.item_taxes;
        let missing = item.missing(expected);
        if missing.is_empty() {
            return;
        }
        self.findings.push(
            Finding::new(
                number,
                &format!("TYPE-{}", self.engine.profile.item_type),
                &itertools::join(&item.seen, "|"),
                FindingKind::IncompleteItem,
                format!(
                    "{}: item opened at line {} is missing taxes: {}",
                    invoice,
                    item.line,
                    missing.join(", ")
                ),
            )
            .with_expected(expected.join(" -> ")),
        );
    }

    fn finish(mut self) -> ValidationResult {
        if !self.truncated {
            let actual = self.invoices.count() as u64;
            for (field, declared) in std::mem::take(&mut self.header_counts) {
                if declared != actual {
                    self.findings.push(
                        Finding::new(
                            1,
                            &field,
                            &declared.to_string(),
                            FindingKind::HeaderCount,
                            format!("Header declares {} invoice(s), file has {}", declared, actual),
                        )
                        .with_expected(actual.to_string()),
                    );
                }
            }
        }

        let lines_with_finding: BTreeSet<usize> = self.findings.iter().map(|f| f.line).collect();
        let lines_with_finding = lines_with_finding.len();
        let valid_lines = self.total_lines.saturating_sub(lines_with_finding);
        let stats = self.invoices.stats();
        let (groups, line_owner) = self.invoices.into_parts();

        log::info!(
            "Validated {} line(s): {} finding(s) on {} line(s), {} invoice(s)",
            self.total_lines,
            self.findings.len(),
            lines_with_finding,
            stats.invoices
        );

        ValidationResult {
            total_lines: self.total_lines,
            valid_lines,
            lines_with_finding,
            success_rate: percentage_or_full(valid_lines, self.total_lines),
            findings: self.findings,
            truncated: self.truncated,
            stats,
            groups,
            line_owner,
        }
    }
}

fn read_failure(error: &ReadError) -> ValidationResult {
    ValidationResult::read_failure(Finding::read_error(1, format!("Failed to read file: {}", error)))
}

fn digits_to_count(value: &str) -> Option<u64> {
    Amount::from_digits(value)
        .ok()
        .and_then(|a| u64::try_from(a.hundredths()).ok())
}
