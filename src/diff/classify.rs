// Mon Oct 19 2026 - Alex

use crate::diff::options::ComparisonOptions;
use crate::finding::{Finding, FindingKind};
use crate::layout::{FieldKind, FieldSpec, Layout};

/// Structural differences between a reference and a candidate line, field by
/// field over `layout`. A plain content change is not a difference.
pub fn classify_line(
    line: usize,
    layout: &Layout,
    reference: &str,
    candidate: &str,
    options: &ComparisonOptions,
) -> Vec<Finding> {
    layout
        .fields
        .iter()
        .filter(|field| !options.is_ignored(&field.name))
        .filter_map(|field| {
            classify_field(
                line,
                field,
                field.extract(reference).trim(),
                field.extract(candidate).trim(),
                options,
            )
        })
        .collect()
}

fn classify_field(
    line: usize,
    field: &FieldSpec,
    reference: &str,
    candidate: &str,
    options: &ComparisonOptions,
) -> Option<Finding> {
    if reference == candidate {
        return None;
    }

    if candidate.is_empty() {
        if field.required {
            let expected = if reference.is_empty() { "non-blank value" } else { reference };
            return Some(
                Finding::new(
                    line,
                    &field.name,
                    "",
                    FindingKind::MissingRequired,
                    format!("Required field '{}' is blank in the candidate file", field.name),
                )
                .with_expected(expected),
            );
        }
        return None;
    }

    if !reference.is_empty() && reference.chars().count() != candidate.chars().count() {
        return Some(
            Finding::new(
                line,
                &field.name,
                candidate,
                FindingKind::SizeMismatch,
                format!(
                    "Field '{}' has {} significant chars, reference has {}",
                    field.name,
                    candidate.chars().count(),
                    reference.chars().count()
                ),
            )
            .with_expected(reference),
        );
    }

    if !field.accepts(candidate) && field.accepts(reference) {
        let kind = match field.kind {
            FieldKind::Date => FindingKind::DateFormat,
            FieldKind::Integer | FieldKind::Decimal => FindingKind::NumericFormat,
            FieldKind::Text => return None,
        };
        let expected = match (field.kind, field.format.as_deref()) {
            (FieldKind::Date, Some(format)) => format!("date as {}", format),
            (FieldKind::Date, None) => "date as YYYYMMDD".to_string(),
            _ => format!("{} value", field.kind),
        };
        return Some(
            Finding::new(
                line,
                &field.name,
                candidate,
                kind,
                format!("Field '{}' is not a valid {}: '{}'", field.name, field.kind, candidate),
            )
            .with_expected(expected),
        );
    }

    options
        .prohibited
        .iter()
        .find(|rule| rule.field == field.name && rule.violated_by(candidate))
        .map(|rule| {
            Finding::new(
                line,
                &field.name,
                candidate,
                FindingKind::ProhibitedValue,
                rule.describe(),
            )
        })
}
