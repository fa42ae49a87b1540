use bigdecimal::BigDecimal;
use std::str::FromStr;

use crate::{PrismaObject, PrismaValue};

/// Width of a single digit group in decimal.js' internal representation.
const LOG_BASE: usize = 7;

/// The internal shape of a decimal.js instance: `d` holds base 10^7 digit groups, `e` is the
/// base 10 exponent of the most significant digit and `s` the sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalLike {
    pub digits: Vec<u64>,
    pub exponent: i64,
    pub sign: i64,
}

impl DecimalLike {
    pub fn from_object(obj: &PrismaObject) -> Option<DecimalLike> {
        let sign = integral(obj.get("s")?)?;
        let exponent = integral(obj.get("e")?)?;
        let digits = obj
            .get("d")?
            .as_list()?
            .iter()
            .map(|d| integral(d).and_then(|d| u64::try_from(d).ok()))
            .collect::<Option<Vec<_>>>()?;

        Some(DecimalLike { digits, exponent, sign })
    }

    pub fn to_big_decimal(&self) -> Option<BigDecimal> {
        let (first, rest) = self.digits.split_first()?;
        let mut coefficient = first.to_string();

        for group in rest {
            coefficient.push_str(&format!("{group:0width$}", width = LOG_BASE));
        }

        let exponent = self.exponent + 1 - coefficient.len() as i64;
        let sign = if self.sign < 0 { "-" } else { "" };

        BigDecimal::from_str(&format!("{sign}{coefficient}e{exponent}"))
            .ok()
            .map(|dec| dec.normalized())
    }
}

/// Canonical decimal rendering: no exponent, no trailing zeros.
pub fn stringify_decimal(decimal: &BigDecimal) -> String {
    decimal.normalized().to_string()
}

fn integral(value: &PrismaValue) -> Option<i64> {
    match value {
        PrismaValue::Int(i) => Some(*i),
        PrismaValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn decimal_like(value: serde_json::Value) -> Option<String> {
        PrismaValue::from(value)
            .as_decimal_like()
            .map(|dec| stringify_decimal(&dec))
    }

    #[test]
    fn reads_decimal_js_internals() {
        assert_eq!(
            decimal_like(json!({ "d": [12, 3456000], "e": 1, "s": 1 })).as_deref(),
            Some("12.3456")
        );
        assert_eq!(
            decimal_like(json!({ "d": [12, 3456789, 1233400], "e": 8, "s": 1 })).as_deref(),
            Some("123456789.12334")
        );
        assert_eq!(
            decimal_like(json!({ "d": [5], "e": -3, "s": -1 })).as_deref(),
            Some("-0.005")
        );
        assert_eq!(decimal_like(json!({ "d": [100], "e": 2, "s": 1 })).as_deref(), Some("100"));
    }

    #[test]
    fn rejects_objects_without_the_decimal_shape() {
        assert_eq!(decimal_like(json!({ "d": "12", "e": 1, "s": 1 })), None);
        assert_eq!(decimal_like(json!({ "d": [12], "e": 1 })), None);
        assert_eq!(decimal_like(json!({ "d": [], "e": 1, "s": 1 })), None);
    }
}
