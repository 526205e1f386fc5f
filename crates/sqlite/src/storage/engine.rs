//! The boundary trait the object mirror drives the SQL store through

use crate::error::Result;
use rust_decimal::Decimal;

/// A value as it crosses the storage boundary: a scalar's native payload, or
/// the packed blob of a list column.
#[derive(Clone, Debug, PartialEq)]
pub enum WireValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Numeric(Decimal),
}

impl WireValue {
    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Null => "null",
            WireValue::Integer(_) => "integer",
            WireValue::Real(_) => "real",
            WireValue::Text(_) => "text",
            WireValue::Blob(_) => "blob",
            WireValue::Numeric(_) => "numeric",
        }
    }
}

/// An embedded SQL engine executing one parameterized statement at a time.
///
/// Implementations acquire and release their own connection scope per call,
/// including on error paths. The mirror performs all validation before
/// calling in, and propagates engine failures unchanged.
pub trait Engine: Send + Sync {
    /// Run a statement, returning the affected row count.
    fn execute(&self, sql: &str, params: &[WireValue]) -> Result<usize>;

    /// Run an insert, returning the storage-assigned row identifier.
    fn execute_returning_id(&self, sql: &str, params: &[WireValue]) -> Result<i64>;

    /// Run a query, returning all result rows.
    fn query(&self, sql: &str, params: &[WireValue]) -> Result<Vec<Vec<WireValue>>>;
}
