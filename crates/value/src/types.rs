//! The typed value union and its column metadata enums

use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element affinity of a column. For list columns this is the element kind;
/// the packed blob itself is stored under blob affinity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Text,
    Blob,
    Real,
    Numeric,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
            ColumnType::Real => "REAL",
            ColumnType::Numeric => "NUMERIC",
        };
        write!(f, "{}", name)
    }
}

/// Cardinality of a column: one value per cell, or a packed list per cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quantity {
    #[default]
    Single,
    List,
}

/// A value held by one cell.
///
/// A closed union over the five scalar kinds, their homogeneous list forms,
/// and null. Values are immutable once constructed; `Clone` deep-copies list
/// payloads, so no two holders ever alias the same buffer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
    Blob(Vec<u8>),
    Real(f64),
    Numeric(Decimal),
    IntegerList(Vec<i64>),
    TextList(Vec<String>),
    BlobList(Vec<Vec<u8>>),
    RealList(Vec<f64>),
    NumericList(Vec<Decimal>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self.quantity(), Some(Quantity::List))
    }

    /// Short kind name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Real(_) => "real",
            Value::Numeric(_) => "numeric",
            Value::IntegerList(_) => "integer list",
            Value::TextList(_) => "text list",
            Value::BlobList(_) => "blob list",
            Value::RealList(_) => "real list",
            Value::NumericList(_) => "numeric list",
        }
    }

    /// The element affinity this value would be stored under. None for null.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Integer(_) | Value::IntegerList(_) => Some(ColumnType::Integer),
            Value::Text(_) | Value::TextList(_) => Some(ColumnType::Text),
            Value::Blob(_) | Value::BlobList(_) => Some(ColumnType::Blob),
            Value::Real(_) | Value::RealList(_) => Some(ColumnType::Real),
            Value::Numeric(_) | Value::NumericList(_) => Some(ColumnType::Numeric),
        }
    }

    /// Single or list cardinality. None for null.
    pub fn quantity(&self) -> Option<Quantity> {
        match self {
            Value::Null => None,
            Value::Integer(_)
            | Value::Text(_)
            | Value::Blob(_)
            | Value::Real(_)
            | Value::Numeric(_) => Some(Quantity::Single),
            Value::IntegerList(_)
            | Value::TextList(_)
            | Value::BlobList(_)
            | Value::RealList(_)
            | Value::NumericList(_) => Some(Quantity::List),
        }
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::TypeMismatch {
            expected: expected.into(),
            found: self.kind().into(),
        }
    }

    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Value::Integer(i) => Ok(*i),
            other => Err(other.mismatch("integer")),
        }
    }

    pub fn as_text(&self) -> Result<&str> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(other.mismatch("text")),
        }
    }

    pub fn as_blob(&self) -> Result<&[u8]> {
        match self {
            Value::Blob(b) => Ok(b),
            other => Err(other.mismatch("blob")),
        }
    }

    pub fn as_real(&self) -> Result<f64> {
        match self {
            Value::Real(r) => Ok(*r),
            other => Err(other.mismatch("real")),
        }
    }

    pub fn as_numeric(&self) -> Result<Decimal> {
        match self {
            Value::Numeric(d) => Ok(*d),
            other => Err(other.mismatch("numeric")),
        }
    }

    pub fn as_integer_list(&self) -> Result<&[i64]> {
        match self {
            Value::IntegerList(items) => Ok(items),
            other => Err(other.mismatch("integer list")),
        }
    }

    pub fn as_text_list(&self) -> Result<&[String]> {
        match self {
            Value::TextList(items) => Ok(items),
            other => Err(other.mismatch("text list")),
        }
    }

    pub fn as_blob_list(&self) -> Result<&[Vec<u8>]> {
        match self {
            Value::BlobList(items) => Ok(items),
            other => Err(other.mismatch("blob list")),
        }
    }

    pub fn as_real_list(&self) -> Result<&[f64]> {
        match self {
            Value::RealList(items) => Ok(items),
            other => Err(other.mismatch("real list")),
        }
    }

    pub fn as_numeric_list(&self) -> Result<&[Decimal]> {
        match self {
            Value::NumericList(items) => Ok(items),
            other => Err(other.mismatch("numeric list")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", item)?;
            }
            write!(f, "]")
        }

        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "'{}'", s),
            Value::Blob(b) => {
                write!(f, "x'")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, "'")
            }
            Value::Real(r) => write!(f, "{}", r),
            Value::Numeric(d) => write!(f, "{}", d),
            Value::IntegerList(items) => list(f, items),
            Value::TextList(items) => list(f, items),
            Value::BlobList(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", Value::Blob(item.clone()))?;
                }
                write!(f, "]")
            }
            Value::RealList(items) => list(f, items),
            Value::NumericList(items) => list(f, items),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_owned())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Numeric(value)
    }
}

impl From<Vec<i64>> for Value {
    fn from(value: Vec<i64>) -> Self {
        Value::IntegerList(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::TextList(value)
    }
}

impl From<Vec<&str>> for Value {
    fn from(value: Vec<&str>) -> Self {
        Value::TextList(value.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<Vec<u8>>> for Value {
    fn from(value: Vec<Vec<u8>>) -> Self {
        Value::BlobList(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::RealList(value)
    }
}

impl From<Vec<Decimal>> for Value {
    fn from(value: Vec<Decimal>) -> Self {
        Value::NumericList(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_accessors() {
        assert_eq!(Value::from(42i64).as_integer().unwrap(), 42);
        assert_eq!(Value::from("hello").as_text().unwrap(), "hello");
        assert!(Value::from(42i64).as_text().is_err());
        assert!(Value::Null.as_integer().is_err());

        let err = Value::from(1.5f64).as_numeric().unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: "numeric".into(),
                found: "real".into(),
            }
        );
    }

    #[test]
    fn test_quantity_classification() {
        assert_eq!(Value::from(1i64).quantity(), Some(Quantity::Single));
        assert_eq!(
            Value::from(vec![1i64, 2]).quantity(),
            Some(Quantity::List)
        );
        assert_eq!(Value::Null.quantity(), None);
        assert!(Value::from(vec!["a", "b"]).is_list());
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Value::from(5i64), Value::from(5i64));
        // Equality is tag-sensitive; cross-kind numeric equality lives in the
        // evaluator.
        assert_ne!(Value::from(5i64), Value::from(5.0f64));
        assert_eq!(
            Value::from(vec![1i64, 2, 3]),
            Value::from(vec![1i64, 2, 3])
        );
        assert_ne!(Value::from(vec![1i64, 2]), Value::from(vec![1i64, 2, 3]));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }
}
