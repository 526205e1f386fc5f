//! Binary packing for list values
//!
//! A list value is stored in a single opaque blob column. Fixed-stride
//! element kinds (integer, real, numeric) are concatenated fixed-width
//! little-endian representations with no separators; variable-stride kinds
//! (text as UTF-16 code units, blob) are repeated
//! `(u32 little-endian byte length, payload)` records.
//!
//! The format is not self-describing: the element kind and the fact that a
//! blob is a packed list at all live in column metadata, not in the blob.

use crate::error::{Error, Result};
use crate::types::{ColumnType, Value};
use rust_decimal::Decimal;

const LEN_PREFIX: usize = std::mem::size_of::<u32>();
const INTEGER_STRIDE: usize = std::mem::size_of::<i64>();
const REAL_STRIDE: usize = std::mem::size_of::<f64>();
const NUMERIC_STRIDE: usize = 16;

/// Pack a list value into one opaque blob.
pub fn pack(value: &Value) -> Result<Vec<u8>> {
    match value {
        Value::IntegerList(items) => Ok(pack_fixed(items, INTEGER_STRIDE, |i| {
            i.to_le_bytes().to_vec()
        })),
        Value::RealList(items) => Ok(pack_fixed(items, REAL_STRIDE, |r| {
            r.to_le_bytes().to_vec()
        })),
        Value::NumericList(items) => Ok(pack_fixed(items, NUMERIC_STRIDE, |d| {
            d.serialize().to_vec()
        })),
        Value::TextList(items) => Ok(pack_variable(items.iter().map(|s| utf16_bytes(s)))),
        Value::BlobList(items) => Ok(pack_variable(items.iter().cloned())),
        other => Err(Error::TypeMismatch {
            expected: "list".into(),
            found: other.kind().into(),
        }),
    }
}

/// Unpack a blob produced by [`pack`] back into a list value of the given
/// element kind.
pub fn unpack(blob: &[u8], element: ColumnType) -> Result<Value> {
    match element {
        ColumnType::Integer => unpack_fixed(blob, INTEGER_STRIDE, |chunk| {
            Ok(i64::from_le_bytes(chunk.try_into().expect("stride is 8")))
        })
        .map(Value::IntegerList),
        ColumnType::Real => unpack_fixed(blob, REAL_STRIDE, |chunk| {
            Ok(f64::from_le_bytes(chunk.try_into().expect("stride is 8")))
        })
        .map(Value::RealList),
        ColumnType::Numeric => unpack_fixed(blob, NUMERIC_STRIDE, |chunk| {
            Ok(Decimal::deserialize(chunk.try_into().expect("stride is 16")))
        })
        .map(Value::NumericList),
        ColumnType::Text => unpack_variable(blob)?
            .into_iter()
            .map(|bytes| utf16_string(&bytes))
            .collect::<Result<Vec<_>>>()
            .map(Value::TextList),
        ColumnType::Blob => unpack_variable(blob).map(Value::BlobList),
    }
}

fn pack_fixed<T>(items: &[T], stride: usize, encode: impl Fn(&T) -> Vec<u8>) -> Vec<u8> {
    let mut packed = Vec::with_capacity(items.len() * stride);
    for item in items {
        packed.extend_from_slice(&encode(item));
    }
    packed
}

fn unpack_fixed<T>(
    blob: &[u8],
    stride: usize,
    decode: impl Fn(&[u8]) -> Result<T>,
) -> Result<Vec<T>> {
    if blob.len() % stride != 0 {
        return Err(Error::Codec(format!(
            "blob length {} is not a multiple of element stride {}",
            blob.len(),
            stride
        )));
    }
    blob.chunks_exact(stride).map(decode).collect()
}

fn pack_variable(items: impl Iterator<Item = Vec<u8>>) -> Vec<u8> {
    let mut packed = Vec::new();
    for item in items {
        packed.extend_from_slice(&(item.len() as u32).to_le_bytes());
        packed.extend_from_slice(&item);
    }
    packed
}

fn unpack_variable(blob: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut items = Vec::new();
    let mut pos = 0;
    while pos < blob.len() {
        let Some(prefix) = blob.get(pos..pos + LEN_PREFIX) else {
            return Err(Error::Codec("truncated length prefix".into()));
        };
        let len = u32::from_le_bytes(prefix.try_into().expect("prefix is 4 bytes")) as usize;
        pos += LEN_PREFIX;
        let Some(payload) = blob.get(pos..pos + len) else {
            return Err(Error::Codec(format!(
                "record of {} bytes overruns blob of {} bytes",
                len,
                blob.len()
            )));
        };
        items.push(payload.to_vec());
        pos += len;
    }
    Ok(items)
}

fn utf16_bytes(s: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(s.len() * 2);
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

fn utf16_string(bytes: &[u8]) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::Codec("odd byte count in UTF-16 text record".into()));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes(pair.try_into().expect("pair is 2 bytes")))
        .collect();
    String::from_utf16(&units).map_err(|_| Error::Codec("invalid UTF-16 text record".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn round_trip(value: Value, element: ColumnType) {
        let packed = pack(&value).unwrap();
        assert_eq!(unpack(&packed, element).unwrap(), value);
    }

    #[test]
    fn test_round_trip_all_kinds() {
        round_trip(
            Value::IntegerList(vec![5, 2, 1, 8, -40, i64::MAX]),
            ColumnType::Integer,
        );
        round_trip(
            Value::RealList(vec![18.288, 6.914, 5.001, -0.0]),
            ColumnType::Real,
        );
        round_trip(
            Value::NumericList(vec![
                Decimal::from_str("5.2").unwrap(),
                Decimal::from_str("2.0").unwrap(),
                Decimal::from_str("11.1").unwrap(),
                Decimal::from_str("8.98721").unwrap(),
            ]),
            ColumnType::Numeric,
        );
        round_trip(
            Value::TextList(vec![
                "example".into(),
                "test".into(),
                "another sample string".into(),
                "".into(),
                "ünïcode ✓".into(),
            ]),
            ColumnType::Text,
        );
        round_trip(
            Value::BlobList(vec![vec![255, 0, 12, 4], vec![92, 14, 3], vec![0; 9]]),
            ColumnType::Blob,
        );
    }

    #[test]
    fn test_single_element_round_trip() {
        round_trip(Value::IntegerList(vec![42]), ColumnType::Integer);
        round_trip(Value::TextList(vec!["v".into()]), ColumnType::Text);
        round_trip(
            Value::NumericList(vec![Decimal::from_str("10.5").unwrap()]),
            ColumnType::Numeric,
        );
        round_trip(Value::RealList(vec![1.5]), ColumnType::Real);
        round_trip(Value::BlobList(vec![vec![0xFD]]), ColumnType::Blob);
    }

    #[test]
    fn test_empty_list_round_trip() {
        for element in [
            ColumnType::Integer,
            ColumnType::Text,
            ColumnType::Blob,
            ColumnType::Real,
            ColumnType::Numeric,
        ] {
            let packed: Vec<u8> = Vec::new();
            let unpacked = unpack(&packed, element).unwrap();
            assert_eq!(pack(&unpacked).unwrap(), packed);
        }
    }

    #[test]
    fn test_fixed_stride_layout() {
        let packed = pack(&Value::IntegerList(vec![1, 2])).unwrap();
        assert_eq!(packed.len(), 16);
        assert_eq!(&packed[..8], &1i64.to_le_bytes());
        assert_eq!(&packed[8..], &2i64.to_le_bytes());
    }

    #[test]
    fn test_variable_stride_layout() {
        // "ab" in UTF-16LE is 4 bytes behind a 4-byte length prefix.
        let packed = pack(&Value::TextList(vec!["ab".into()])).unwrap();
        assert_eq!(packed, vec![4, 0, 0, 0, b'a', 0, b'b', 0]);
    }

    #[test]
    fn test_pack_rejects_scalars() {
        assert!(pack(&Value::Integer(5)).is_err());
        assert!(pack(&Value::Null).is_err());
    }

    #[test]
    fn test_unpack_rejects_malformed_blobs() {
        assert!(unpack(&[0; 7], ColumnType::Integer).is_err());
        assert!(unpack(&[0; 15], ColumnType::Numeric).is_err());
        // Length prefix claims more bytes than the blob holds.
        assert!(unpack(&[9, 0, 0, 0, 1], ColumnType::Blob).is_err());
        // Truncated prefix.
        assert!(unpack(&[1, 0], ColumnType::Text).is_err());
    }
}
