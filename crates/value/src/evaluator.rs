//! Comparison and arithmetic over values
//!
//! Keeps `Value` as pure data; the cross-kind rules live here. Numeric kinds
//! widen implicitly: integer-vs-numeric promotes the integer to decimal,
//! integer-vs-real promotes the integer to f64, numeric-vs-real goes through
//! f64.

use crate::error::{Error, Result};
use crate::types::Value;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Comparison operator applied by [`compare`] and by row filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Comparison {
    fn is_equality(self) -> bool {
        matches!(self, Comparison::Equal | Comparison::NotEqual)
    }
}

fn is_numeric(value: &Value) -> bool {
    matches!(
        value,
        Value::Integer(_) | Value::Real(_) | Value::Numeric(_)
    )
}

/// Compare two numeric values with implicit widening. `None` means the pair
/// has no defined order (a NaN was involved).
fn numeric_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Integer(a), Value::Numeric(b)) => Some(Decimal::from(*a).cmp(b)),
        (Value::Numeric(a), Value::Integer(b)) => Some(a.cmp(&Decimal::from(*b))),
        (Value::Numeric(a), Value::Numeric(b)) => Some(a.cmp(b)),
        (Value::Integer(a), Value::Real(b)) => (*a as f64).partial_cmp(b),
        (Value::Real(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Real(a), Value::Real(b)) => a.partial_cmp(b),
        (Value::Numeric(a), Value::Real(b)) => a.to_f64().and_then(|a| a.partial_cmp(b)),
        (Value::Real(a), Value::Numeric(b)) => b.to_f64().and_then(|b| a.partial_cmp(&b)),
        _ => None,
    }
}

/// Evaluate `left <comparison> right`.
///
/// Equality operators never fail: null equals only null, same-kind values
/// compare structurally, and mismatched kinds are simply unequal. Ordering
/// operators are defined only between numeric kinds; null on either side is
/// "no match" rather than an error.
pub fn compare(left: &Value, right: &Value, comparison: Comparison) -> Result<bool> {
    if comparison.is_equality() {
        let equal = if is_numeric(left) && is_numeric(right) {
            numeric_cmp(left, right) == Some(Ordering::Equal)
        } else {
            left == right
        };
        return Ok(match comparison {
            Comparison::Equal => equal,
            _ => !equal,
        });
    }

    if left.is_null() || right.is_null() {
        return Ok(false);
    }

    let order = match numeric_cmp(left, right) {
        Some(order) => order,
        None if is_numeric(left) && is_numeric(right) => return Ok(false), // NaN
        None => {
            return Err(Error::TypeMismatch {
                expected: format!("kind orderable against {}", left.kind()),
                found: right.kind().into(),
            });
        }
    };

    Ok(match comparison {
        Comparison::GreaterThan => order == Ordering::Greater,
        Comparison::GreaterThanOrEqual => order != Ordering::Less,
        Comparison::LessThan => order == Ordering::Less,
        Comparison::LessThanOrEqual => order != Ordering::Greater,
        Comparison::Equal | Comparison::NotEqual => unreachable!(),
    })
}

/// The total sort relation used by multi-key ordering.
///
/// Nulls sort before every non-null value. Numeric kinds widen as in
/// [`compare`]; text orders byte-lexicographically. Every other kind is
/// unordered and fails with [`Error::Incomparable`].
pub fn ordering(left: &Value, right: &Value) -> Result<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Ok(Ordering::Equal),
        (Value::Null, _) => Ok(Ordering::Less),
        (_, Value::Null) => Ok(Ordering::Greater),
        (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
        (a, b) if is_numeric(a) && is_numeric(b) => {
            // NaN has no order; pin it equal to keep the sort total.
            Ok(numeric_cmp(a, b).unwrap_or(Ordering::Equal))
        }
        (a, b) => Err(Error::Incomparable {
            left: a.kind().into(),
            right: b.kind().into(),
        }),
    }
}

/// Add two values.
///
/// Numeric kinds widen as in [`compare`] with checked integer and decimal
/// addition; text concatenates; summing with null yields the other operand.
/// Every other pairing is a type mismatch.
pub fn sum(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Null, other) | (other, Value::Null) => Ok(other.clone()),

        (Value::Integer(a), Value::Integer(b)) => a
            .checked_add(*b)
            .map(Value::Integer)
            .ok_or(Error::Overflow),
        (Value::Integer(a), Value::Numeric(b)) => Decimal::from(*a)
            .checked_add(*b)
            .map(Value::Numeric)
            .ok_or(Error::Overflow),
        (Value::Numeric(a), Value::Integer(b)) => a
            .checked_add(Decimal::from(*b))
            .map(Value::Numeric)
            .ok_or(Error::Overflow),
        (Value::Numeric(a), Value::Numeric(b)) => {
            a.checked_add(*b).map(Value::Numeric).ok_or(Error::Overflow)
        }
        (Value::Integer(a), Value::Real(b)) => Ok(Value::Real(*a as f64 + b)),
        (Value::Real(a), Value::Integer(b)) => Ok(Value::Real(a + *b as f64)),
        (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a + b)),
        (Value::Numeric(a), Value::Real(b)) => {
            let a = a.to_f64().ok_or(Error::Overflow)?;
            Ok(Value::Real(a + b))
        }
        (Value::Real(a), Value::Numeric(b)) => {
            let b = b.to_f64().ok_or(Error::Overflow)?;
            Ok(Value::Real(a + b))
        }

        (Value::Text(a), Value::Text(b)) => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::Text(joined))
        }

        (a, b) => Err(Error::TypeMismatch {
            expected: format!("kind summable with {}", a.kind()),
            found: b.kind().into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Value {
        Value::Numeric(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_equality_across_numeric_kinds() {
        // Promotion must be symmetric.
        assert!(compare(&Value::Integer(8), &dec("8"), Comparison::Equal).unwrap());
        assert!(compare(&dec("8"), &Value::Integer(8), Comparison::Equal).unwrap());
        assert!(compare(&Value::Integer(8), &Value::Real(8.0), Comparison::Equal).unwrap());
        assert!(compare(&dec("8.5"), &Value::Real(8.5), Comparison::Equal).unwrap());
        assert!(!compare(&Value::Integer(8), &dec("8.1"), Comparison::Equal).unwrap());
        assert!(compare(&Value::Integer(8), &dec("8.1"), Comparison::NotEqual).unwrap());
    }

    #[test]
    fn test_equality_mismatched_kinds() {
        // Mismatched non-numeric kinds are unequal, never an error.
        assert!(!compare(&Value::from("20"), &Value::Integer(20), Comparison::Equal).unwrap());
        assert!(compare(&Value::from("20"), &Value::Integer(20), Comparison::NotEqual).unwrap());
        assert!(
            !compare(&Value::Blob(vec![1, 2]), &Value::from("x"), Comparison::Equal).unwrap()
        );
    }

    #[test]
    fn test_null_comparisons() {
        assert!(compare(&Value::Null, &Value::Null, Comparison::Equal).unwrap());
        assert!(!compare(&Value::Null, &Value::Integer(0), Comparison::Equal).unwrap());
        assert!(compare(&Value::Null, &Value::Integer(0), Comparison::NotEqual).unwrap());
        // Null is incomparable under ordering operators: no match, no error.
        assert!(!compare(&Value::Null, &Value::Integer(0), Comparison::GreaterThan).unwrap());
        assert!(!compare(&Value::Integer(0), &Value::Null, Comparison::LessThan).unwrap());
    }

    #[test]
    fn test_ordering_comparisons() {
        assert!(compare(&Value::Real(15.5), &Value::Integer(10), Comparison::GreaterThan).unwrap());
        assert!(!compare(&Value::Integer(8), &Value::Integer(10), Comparison::GreaterThan).unwrap());
        assert!(compare(&dec("11.75"), &Value::Real(11.5), Comparison::GreaterThanOrEqual).unwrap());
        assert!(compare(&Value::Integer(9), &dec("9.5"), Comparison::LessThan).unwrap());
        assert!(compare(&Value::Integer(9), &Value::Integer(9), Comparison::LessThanOrEqual).unwrap());
    }

    #[test]
    fn test_ordering_comparison_requires_numeric() {
        assert!(compare(&Value::from("a"), &Value::from("b"), Comparison::GreaterThan).is_err());
        assert!(compare(&Value::from("a"), &Value::Integer(1), Comparison::LessThan).is_err());
        assert!(
            compare(
                &Value::Blob(vec![1]),
                &Value::Blob(vec![2]),
                Comparison::GreaterThan
            )
            .is_err()
        );
    }

    #[test]
    fn test_list_equality() {
        assert!(
            compare(
                &Value::from(vec![1i64, 2, 3]),
                &Value::from(vec![1i64, 2, 3]),
                Comparison::Equal
            )
            .unwrap()
        );
        assert!(
            !compare(
                &Value::from(vec![1i64, 2]),
                &Value::from(vec![1i64, 2, 3]),
                Comparison::Equal
            )
            .unwrap()
        );
    }

    #[test]
    fn test_sum_numeric_widening() {
        assert_eq!(
            sum(&Value::Integer(2), &Value::Integer(3)).unwrap(),
            Value::Integer(5)
        );
        assert_eq!(
            sum(&Value::Integer(2), &dec("3.5")).unwrap(),
            dec("5.5")
        );
        assert_eq!(
            sum(&Value::Integer(2), &Value::Real(3.5)).unwrap(),
            Value::Real(5.5)
        );
        assert_eq!(
            sum(&dec("1.5"), &Value::Real(2.0)).unwrap(),
            Value::Real(3.5)
        );
        assert_eq!(
            sum(&Value::Real(15.5), &Value::Real(8.0)).unwrap(),
            Value::Real(23.5)
        );
    }

    #[test]
    fn test_sum_null_identity() {
        let x = Value::Real(1.25);
        assert_eq!(sum(&Value::Null, &x).unwrap(), x);
        assert_eq!(sum(&x, &Value::Null).unwrap(), x);
        assert_eq!(sum(&Value::Null, &Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_sum_text_concatenates() {
        assert_eq!(
            sum(&Value::from("foo"), &Value::from("bar")).unwrap(),
            Value::from("foobar")
        );
    }

    #[test]
    fn test_sum_invalid_kinds() {
        assert!(sum(&Value::Blob(vec![1]), &Value::Blob(vec![2])).is_err());
        assert!(sum(&Value::from("a"), &Value::Integer(1)).is_err());
        assert!(sum(&Value::from(vec![1i64]), &Value::from(vec![2i64])).is_err());
    }

    #[test]
    fn test_sum_integer_overflow() {
        assert_eq!(
            sum(&Value::Integer(i64::MAX), &Value::Integer(1)).unwrap_err(),
            Error::Overflow
        );
    }

    #[test]
    fn test_sort_ordering() {
        assert_eq!(
            ordering(&Value::Null, &Value::Integer(-100)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            ordering(&Value::Integer(3), &Value::Real(2.5)).unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            ordering(&Value::from("record 2"), &Value::from("xyz")).unwrap(),
            Ordering::Less
        );
        assert!(ordering(&Value::Blob(vec![1]), &Value::Blob(vec![2])).is_err());
        assert!(ordering(&Value::from("a"), &Value::Integer(1)).is_err());
    }
}
