//! Permissive numeric coercion for wire input.
//!
//! Bookkeeping entries are typed by hand, so numeric fields arrive as JSON
//! numbers, numeric strings, or junk. The policy lives here and nowhere else:
//!
//! - numbers and numeric strings (trimmed, optional sign, decimals, exponent)
//!   are taken as-is;
//! - `true`/`false` become 1/0;
//! - `null`, empty strings, arrays, objects and non-numeric strings become 0.
//!
//! Coercion never fails. Money is rounded half away from zero to minor units.

use serde_json::Value;

use crate::Money;

/// Extracts the textual numeric literal of a wire value, if it has one.
fn numeric_literal(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerces a wire value into a float (`quantity`, `rate` of goods, ...).
pub fn coerce_number(value: Option<&Value>) -> f64 {
    numeric_literal(value)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Coerces a wire value into an integer, truncating any fraction.
pub fn coerce_integer(value: Option<&Value>) -> i64 {
    coerce_number(value).trunc() as i64
}

/// Coerces a wire value into money, rounding to minor units.
pub fn coerce_amount(value: Option<&Value>) -> Money {
    numeric_literal(value)
        .and_then(|s| decimal_to_minor(&s))
        .map(Money::new)
        .unwrap_or(Money::ZERO)
}

/// Exact decimal → minor units conversion (`"12.345"` → `1235`).
///
/// Accepts `[+-]digits[.digits][(e|E)[+-]digits]`. Returns `None` for
/// anything else or when the result does not fit in an `i64`.
fn decimal_to_minor(literal: &str) -> Option<i64> {
    let (negative, rest) = match literal.as_bytes().first()? {
        b'-' => (true, &literal[1..]),
        b'+' => (false, &literal[1..]),
        _ => (false, literal),
    };

    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(pos) => (&rest[..pos], rest[pos + 1..].parse::<i32>().ok()?),
        None => (rest, 0),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let digits = format!("{int_part}{frac_part}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(0);
    }
    if digits.len() > 36 {
        return None;
    }
    let value: i128 = digits.parse().ok()?;

    // minor = value * 10^(exponent - frac_len + 2)
    let scale = i64::from(exponent) - frac_part.len() as i64 + 2;
    let minor: i128 = if scale >= 0 {
        let factor = 10i128.checked_pow(u32::try_from(scale).ok()?)?;
        value.checked_mul(factor)?
    } else {
        let shift = u32::try_from(-scale).ok()?;
        match 10i128.checked_pow(shift) {
            Some(divisor) => {
                let quotient = value / divisor;
                let remainder = value % divisor;
                if remainder * 2 >= divisor {
                    quotient + 1
                } else {
                    quotient
                }
            }
            None => 0,
        }
    };

    let minor = i64::try_from(minor).ok()?;
    Some(if negative { -minor } else { minor })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_and_numeric_strings_are_taken() {
        assert_eq!(coerce_amount(Some(&json!(1000))), Money::new(100_000));
        assert_eq!(coerce_amount(Some(&json!("1000"))), Money::new(100_000));
        assert_eq!(coerce_amount(Some(&json!(" 12.5 "))), Money::new(1250));
        assert_eq!(coerce_amount(Some(&json!(-3.25))), Money::new(-325));
        assert_eq!(coerce_amount(Some(&json!("1e3"))), Money::new(100_000));
        assert_eq!(coerce_amount(Some(&json!(".5"))), Money::new(50));
    }

    #[test]
    fn amounts_round_half_away_from_zero() {
        assert_eq!(coerce_amount(Some(&json!("1.005"))), Money::new(101));
        assert_eq!(coerce_amount(Some(&json!("1.004"))), Money::new(100));
        assert_eq!(coerce_amount(Some(&json!("-1.005"))), Money::new(-101));
        assert_eq!(coerce_amount(Some(&json!("1e-9"))), Money::ZERO);
    }

    #[test]
    fn invalid_or_missing_input_becomes_zero() {
        assert_eq!(coerce_amount(None), Money::ZERO);
        assert_eq!(coerce_amount(Some(&json!(null))), Money::ZERO);
        assert_eq!(coerce_amount(Some(&json!(""))), Money::ZERO);
        assert_eq!(coerce_amount(Some(&json!("abc"))), Money::ZERO);
        assert_eq!(coerce_amount(Some(&json!("1,000"))), Money::ZERO);
        assert_eq!(coerce_amount(Some(&json!([1, 2]))), Money::ZERO);
        assert_eq!(coerce_amount(Some(&json!({"v": 1}))), Money::ZERO);
        assert_eq!(coerce_amount(Some(&json!("1e999"))), Money::ZERO);
        assert_eq!(coerce_number(Some(&json!("NaN"))), 0.0);
        assert_eq!(coerce_number(Some(&json!("inf"))), 0.0);
    }

    #[test]
    fn booleans_become_one_or_zero() {
        assert_eq!(coerce_amount(Some(&json!(true))), Money::new(100));
        assert_eq!(coerce_number(Some(&json!(false))), 0.0);
    }

    #[test]
    fn integers_truncate() {
        assert_eq!(coerce_integer(Some(&json!("30"))), 30);
        assert_eq!(coerce_integer(Some(&json!(7.9))), 7);
        assert_eq!(coerce_integer(Some(&json!("x"))), 0);
    }

    #[test]
    fn floats_keep_fractions() {
        assert_eq!(coerce_number(Some(&json!("7652.5"))), 7652.5);
        assert_eq!(coerce_number(Some(&json!(12))), 12.0);
    }
}
