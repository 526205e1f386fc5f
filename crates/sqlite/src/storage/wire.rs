//! Conversion between in-memory values and wire values
//!
//! Outbound, a scalar crosses as its native payload and a list as its packed
//! blob. Inbound, the stored value is reclassified through the column's
//! element type and quantity, since the store itself cannot distinguish a
//! packed list from a plain blob nor a decimal from the text it travels as.

use super::engine::WireValue;
use crate::error::{Error, Result};
use mirror_value::{codec, ColumnType, Quantity, Value};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

pub(crate) fn to_wire(value: &Value) -> Result<WireValue> {
    Ok(match value {
        Value::Null => WireValue::Null,
        Value::Integer(i) => WireValue::Integer(*i),
        Value::Text(s) => WireValue::Text(s.clone()),
        Value::Blob(b) => WireValue::Blob(b.clone()),
        Value::Real(r) => WireValue::Real(*r),
        Value::Numeric(d) => WireValue::Numeric(*d),
        list => WireValue::Blob(codec::pack(list)?),
    })
}

pub(crate) fn from_wire(wire: WireValue, ty: ColumnType, quantity: Quantity) -> Result<Value> {
    let mismatch = |wire: &WireValue| Error::InvalidType {
        expected: format!("stored {} value", ty),
        found: wire.kind().to_owned(),
    };

    if let WireValue::Null = wire {
        return Ok(Value::Null);
    }

    if quantity == Quantity::List {
        return match wire {
            WireValue::Blob(blob) => Ok(codec::unpack(&blob, ty)?),
            other => Err(Error::InvalidType {
                expected: "packed list blob".into(),
                found: other.kind().to_owned(),
            }),
        };
    }

    match (ty, wire) {
        (ColumnType::Integer, WireValue::Integer(i)) => Ok(Value::Integer(i)),
        (ColumnType::Text, WireValue::Text(s)) => Ok(Value::Text(s)),
        (ColumnType::Blob, WireValue::Blob(b)) => Ok(Value::Blob(b)),
        (ColumnType::Real, WireValue::Real(r)) => Ok(Value::Real(r)),
        (ColumnType::Real, WireValue::Integer(i)) => Ok(Value::Real(i as f64)),
        (ColumnType::Numeric, WireValue::Numeric(d)) => Ok(Value::Numeric(d)),
        (ColumnType::Numeric, WireValue::Integer(i)) => Ok(Value::Numeric(Decimal::from(i))),
        (ColumnType::Numeric, WireValue::Real(r)) => Decimal::from_f64(r)
            .map(Value::Numeric)
            .ok_or_else(|| Error::InvalidType {
                expected: "stored NUMERIC value".into(),
                found: format!("unrepresentable real {}", r),
            }),
        (ColumnType::Numeric, WireValue::Text(s)) => Decimal::from_str(&s)
            .map(Value::Numeric)
            .map_err(|_| Error::InvalidType {
                expected: "stored NUMERIC value".into(),
                found: format!("text {:?}", s),
            }),
        (_, wire) => Err(mismatch(&wire)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_cross_as_native_payloads() {
        assert_eq!(
            to_wire(&Value::Integer(15)).unwrap(),
            WireValue::Integer(15)
        );
        assert_eq!(
            to_wire(&Value::Text("x".into())).unwrap(),
            WireValue::Text("x".into())
        );
        assert_eq!(to_wire(&Value::Null).unwrap(), WireValue::Null);
    }

    #[test]
    fn test_lists_cross_packed() {
        let wire = to_wire(&Value::IntegerList(vec![1, 2])).unwrap();
        match &wire {
            WireValue::Blob(blob) => assert_eq!(blob.len(), 16),
            other => panic!("expected blob, got {:?}", other),
        }
        assert_eq!(
            from_wire(wire, ColumnType::Integer, Quantity::List).unwrap(),
            Value::IntegerList(vec![1, 2])
        );
    }

    #[test]
    fn test_numeric_reclassification() {
        assert_eq!(
            from_wire(WireValue::Integer(7), ColumnType::Numeric, Quantity::Single).unwrap(),
            Value::Numeric(Decimal::from(7))
        );
        assert_eq!(
            from_wire(
                WireValue::Text("10.5".into()),
                ColumnType::Numeric,
                Quantity::Single
            )
            .unwrap(),
            Value::Numeric(Decimal::from_str("10.5").unwrap())
        );
        assert_eq!(
            from_wire(WireValue::Real(10.5), ColumnType::Numeric, Quantity::Single).unwrap(),
            Value::Numeric(Decimal::from_str("10.5").unwrap())
        );
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        assert!(from_wire(WireValue::Text("x".into()), ColumnType::Integer, Quantity::Single).is_err());
        assert!(from_wire(WireValue::Integer(1), ColumnType::Blob, Quantity::List).is_err());
    }
}
