// Mon Oct 19 2026 - Alex

use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use thiserror::Error;

/// Recoverable problem with one line's content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineFault {
    #[error("Value '{0}' is too large to represent")]
    Overflow(String),
}

/// Fixed-point amount counted in hundredths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_hundredths(value: i128) -> Self {
        Amount(value)
    }

    pub fn hundredths(&self) -> i128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Every ASCII digit of `s`, in order, read as hundredths. Blank is zero.
    pub fn from_digits(s: &str) -> Result<Self, LineFault> {
        accumulate_digits(s.chars(), s).map(Amount)
    }

    /// Like `from_digits`, except an explicit `.` or `,` fixes the scale:
    /// digits before it are units and the next two characters are cents.
    pub fn parse(s: &str) -> Result<Self, LineFault> {
        let s = s.trim();
        let Some(pos) = s.find(['.', ',']) else {
            return Self::from_digits(s);
        };

        let units = accumulate_digits(s[..pos].chars(), s)?;
        let mut cents = 0i128;
        let mut taken = 0;
        for c in s[pos + 1..].chars().take(2) {
            taken += 1;
            if let Some(d) = c.to_digit(10) {
                cents = cents * 10 + d as i128;
            } else {
                cents *= 10;
            }
        }
        for _ in taken..2 {
            cents *= 10;
        }

        units
            .checked_mul(100)
            .and_then(|u| u.checked_add(cents))
            .map(Amount)
            .ok_or_else(|| LineFault::Overflow(s.to_string()))
    }

    /// `floor(base * rate / 10000)`, where `rate` is a percentage in hundredths.
    pub fn tax_on(base: Amount, rate: Amount) -> Result<Self, LineFault> {
        base.0
            .checked_mul(rate.0)
            .map(|p| Amount(p.div_euclid(10_000)))
            .ok_or_else(|| LineFault::Overflow(format!("{} x {}", base, rate)))
    }
}

fn accumulate_digits(chars: impl Iterator<Item = char>, source: &str) -> Result<i128, LineFault> {
    let mut value = 0i128;
    for c in chars {
        if let Some(d) = c.to_digit(10) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(d as i128))
                .ok_or_else(|| LineFault::Overflow(source.trim().to_string()))?;
        }
    }
    Ok(value)
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{},{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_digits_ignores_non_digits() {
        assert_eq!(Amount::from_digits("000000000017693").unwrap().hundredths(), 17693);
        assert_eq!(Amount::from_digits("176,93").unwrap().hundredths(), 17693);
        assert_eq!(Amount::from_digits("   ").unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_parse_with_separator_takes_two_places() {
        assert_eq!(Amount::parse("176.93").unwrap().hundredths(), 17693);
        assert_eq!(Amount::parse("0,65").unwrap().hundredths(), 65);
        assert_eq!(Amount::parse("12.5").unwrap().hundredths(), 1250);
        assert_eq!(Amount::parse("3.14159").unwrap().hundredths(), 314);
        assert_eq!(Amount::parse("7.").unwrap().hundredths(), 700);
    }

    #[test]
    fn test_parse_without_separator_is_scaled() {
        assert_eq!(Amount::parse("  00115 ").unwrap().hundredths(), 115);
    }

    #[test]
    fn test_tax_on_floors() {
        let base = Amount::parse("176,93").unwrap();
        let rate = Amount::parse("0,65").unwrap();
        let expected = Amount::tax_on(base, rate).unwrap();
        assert_eq!(expected.hundredths(), 115);
        assert_eq!(expected.to_string(), "1,15");
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_hundredths(1000).to_string(), "10,00");
        assert_eq!(Amount::from_hundredths(-5).to_string(), "-0,05");
        assert_eq!(Amount::ZERO.to_string(), "0,00");
    }

    #[test]
    fn test_overflow_is_fault() {
        let huge = "9".repeat(60);
        assert!(matches!(Amount::from_digits(&huge), Err(LineFault::Overflow(_))));
        assert!(Amount::parse(&format!("{}.00", huge)).is_err());
    }
}
