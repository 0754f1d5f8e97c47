// Mon Oct 19 2026 - Alex

use crate::tax::amount::{Amount, LineFault};
use serde::{Deserialize, Serialize};

/// `value == floor(base * rate / 10000)` on one record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCheck {
    pub record_type: String,
    pub tax: String,
    pub base_field: String,
    pub rate_field: String,
    pub value_field: String,
}

impl TaxCheck {
    pub fn new(record_type: &str, tax: &str, base: &str, rate: &str, value: &str) -> Self {
        Self {
            record_type: record_type.to_string(),
            tax: tax.to_string(),
            base_field: base.to_string(),
            rate_field: rate.to_string(),
            value_field: value.to_string(),
        }
    }
}

/// A field on one record type that feeds an invoice total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalSource {
    pub total_field: String,
    pub record_type: String,
    pub source_field: String,
}

impl TotalSource {
    pub fn new(total_field: &str, record_type: &str, source_field: &str) -> Self {
        Self {
            total_field: total_field.to_string(),
            record_type: record_type.to_string(),
            source_field: source_field.to_string(),
        }
    }
}

/// Last dash-separated segment of a total field (`NFE56-TOT-VLR-FCP` -> `FCP`).
pub fn total_suffix(total_field: &str) -> &str {
    total_field.rsplit('-').next().unwrap_or(total_field)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxOutcome {
    /// Base and rate are set, the value is zero but should not be.
    ZeroedValue { base: Amount, rate: Amount, expected: Amount },
    Mismatch { base: Amount, rate: Amount, declared: Amount, expected: Amount },
}

impl TaxOutcome {
    /// The value the line should have carried.
    pub fn expected(&self) -> Amount {
        match self {
            TaxOutcome::ZeroedValue { expected, .. } | TaxOutcome::Mismatch { expected, .. } => *expected,
        }
    }

    pub fn declared(&self) -> Amount {
        match self {
            TaxOutcome::ZeroedValue { .. } => Amount::ZERO,
            TaxOutcome::Mismatch { declared, .. } => *declared,
        }
    }
}

/// Checks one base/rate/value triple, given as trimmed field text.
///
/// A zero value under a positive base and rate is judged on raw digits and
/// ends the check whatever the outcome. Otherwise blank inputs skip the check
/// and an all-zero triple is accepted.
pub fn evaluate(base: &str, rate: &str, value: &str) -> Result<Option<TaxOutcome>, LineFault> {
    let raw_base = Amount::from_digits(base)?;
    let raw_rate = Amount::from_digits(rate)?;
    let raw_value = Amount::from_digits(value)?;

    if raw_base.is_positive() && raw_rate.is_positive() && raw_value.is_zero() {
        let expected = Amount::tax_on(raw_base, raw_rate)?;
        if expected.is_positive() {
            return Ok(Some(TaxOutcome::ZeroedValue {
                base: raw_base,
                rate: raw_rate,
                expected,
            }));
        }
        return Ok(None);
    }

    if base.is_empty() || rate.is_empty() || value.is_empty() {
        return Ok(None);
    }

    let base = Amount::parse(base)?;
    let rate = Amount::parse(rate)?;
    let declared = Amount::parse(value)?;
    if base.is_zero() && rate.is_zero() && declared.is_zero() {
        return Ok(None);
    }

    let expected = Amount::tax_on(base, rate)?;
    if declared != expected {
        return Ok(Some(TaxOutcome::Mismatch {
            base,
            rate,
            declared,
            expected,
        }));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_value_passes() {
        assert_eq!(evaluate("000000000017693", "000065", "000000000000115").unwrap(), None);
    }

    #[test]
    fn test_mismatch_reports_expected() {
        let outcome = evaluate("176,93", "0,65", "1,20").unwrap().unwrap();
        assert_eq!(outcome.expected().to_string(), "1,15");
        assert_eq!(outcome.declared().to_string(), "1,20");
        assert!(matches!(outcome, TaxOutcome::Mismatch { .. }));
    }

    #[test]
    fn test_zeroed_value_overrides_all_zero_rule() {
        let outcome = evaluate("17693", "65", "0").unwrap().unwrap();
        assert!(matches!(outcome, TaxOutcome::ZeroedValue { .. }));
        assert_eq!(outcome.expected().hundredths(), 115);
    }

    #[test]
    fn test_zeroed_with_zero_expected_is_fine() {
        assert_eq!(evaluate("1", "1", "0").unwrap(), None);
    }

    #[test]
    fn test_all_zero_and_blank_skip() {
        assert_eq!(evaluate("000", "000", "000").unwrap(), None);
        assert_eq!(evaluate("", "65", "115").unwrap(), None);
    }

    #[test]
    fn test_blank_value_with_base_and_rate_is_zeroed() {
        let outcome = evaluate("50000", "200", "").unwrap().unwrap();
        assert_eq!(outcome.expected().to_string(), "10,00");
    }

    #[test]
    fn test_total_suffix() {
        assert_eq!(total_suffix("NFE56-TOT-VLR-FCP"), "FCP");
        assert_eq!(total_suffix("TOTAL"), "TOTAL");
    }
}
