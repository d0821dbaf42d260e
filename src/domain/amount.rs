//! Currency amounts stored as integer cents.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::domain::AppError;

/// A USD amount with two decimal places of precision.
///
/// Stored as integer cents so arithmetic and comparisons are exact. Parses
/// from either a JSON number or a decimal string; values with more than two
/// fraction digits are rounded half away from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_cents(cents: i64) -> Self {
        Amount(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Value as a float for FHIR money fields.
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parse a decimal string such as "120", "120.5", or "120.50".
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidAmount(raw.to_string()));
        }

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (digits, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AppError::InvalidAmount(raw.to_string()));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AppError::InvalidAmount(raw.to_string()));
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| AppError::InvalidAmount(raw.to_string()))?
        };

        let mut cents = whole
            .checked_mul(100)
            .ok_or_else(|| AppError::InvalidAmount(raw.to_string()))?;
        let frac_digits: Vec<u32> = frac_part.chars().filter_map(|c| c.to_digit(10)).collect();
        cents += match frac_digits.len() {
            0 => 0,
            1 => (frac_digits[0] * 10) as i64,
            _ => {
                let base = (frac_digits[0] * 10 + frac_digits[1]) as i64;
                // Round half away from zero on the third digit.
                if frac_digits.get(2).is_some_and(|d| *d >= 5) { base + 1 } else { base }
            }
        };

        Ok(Amount(if negative { -cents } else { cents }))
    }

    /// Parse from a loosely-typed JSON value (number or decimal string).
    pub fn from_json(value: &serde_json::Value) -> Result<Self, AppError> {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i.checked_mul(100)
                        .map(Amount)
                        .ok_or_else(|| AppError::InvalidAmount(n.to_string()))
                } else if let Some(f) = n.as_f64() {
                    Amount::from_f64(f).ok_or_else(|| AppError::InvalidAmount(n.to_string()))
                } else {
                    Err(AppError::InvalidAmount(n.to_string()))
                }
            }
            serde_json::Value::String(s) => Amount::parse(s),
            other => Err(AppError::InvalidAmount(other.to_string())),
        }
    }

    fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Amount(cents as i64))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Amount::from_json(&value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_strings() {
        assert_eq!(Amount::parse("120").unwrap().cents(), 12000);
        assert_eq!(Amount::parse("120.5").unwrap().cents(), 12050);
        assert_eq!(Amount::parse("120.50").unwrap().cents(), 12050);
        assert_eq!(Amount::parse(".75").unwrap().cents(), 75);
    }

    #[test]
    fn rounds_extra_fraction_digits() {
        assert_eq!(Amount::parse("10.555").unwrap().cents(), 1056);
        assert_eq!(Amount::parse("10.554").unwrap().cents(), 1055);
        assert_eq!(Amount::parse("-10.555").unwrap().cents(), -1056);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Amount::parse("").is_err());
        assert!(Amount::parse("abc").is_err());
        assert!(Amount::parse("12,50").is_err());
        assert!(Amount::parse(".").is_err());
    }

    #[test]
    fn parses_json_numbers_and_strings() {
        assert_eq!(Amount::from_json(&serde_json::json!(250)).unwrap().cents(), 25000);
        assert_eq!(Amount::from_json(&serde_json::json!(99.99)).unwrap().cents(), 9999);
        assert_eq!(Amount::from_json(&serde_json::json!("42.10")).unwrap().cents(), 4210);
        assert!(Amount::from_json(&serde_json::json!(null)).is_err());
        assert!(Amount::from_json(&serde_json::json!([1])).is_err());
    }

    #[test]
    fn renders_two_decimal_places() {
        assert_eq!(Amount::from_cents(12000).to_string(), "120.00");
        assert_eq!(Amount::from_cents(5).to_string(), "0.05");
        assert_eq!(Amount::from_cents(-130).to_string(), "-1.30");
    }

    #[test]
    fn serializes_as_display_string() {
        let serialized = serde_json::to_value(Amount::from_cents(1999)).unwrap();
        assert_eq!(serialized, serde_json::json!("19.99"));
        let back: Amount = serde_json::from_value(serialized).unwrap();
        assert_eq!(back.cents(), 1999);
    }
}
