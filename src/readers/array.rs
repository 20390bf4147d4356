//! Binary array reader and the array-OID registrations that drive it.
//!
//! Array OIDs carry no reader function of their own in the registry; instead
//! `array_element_oid` marks them, and `Registry::decode` routes to
//! [`read_array_binary`] with the live registry so nested/element OIDs resolve
//! against whatever scalar (or array) readers are registered, not a fixed table
//! baked in at registration time.

use std::collections::HashMap;

use super::{insert, Registry, RegistryEntry};
use crate::cursor::Cursor;
use crate::error::{ProtocolError, Result};
use crate::oid::{oid, Oid};
use crate::value::{ArrayValue, Value};

const MAX_DIMENSIONS: u32 = 6;

/// Decode a PostgreSQL binary array: `(ndim, has_nulls_flag, element_oid)` header,
/// `ndim` pairs of `(len, lower_bound)`, then the flattened elements, each prefixed
/// by its own `i32` length (`-1` for NULL).
pub fn read_array_binary(cur: &mut Cursor<'_>, registry: &Registry, expected_elem_oid: Oid) -> Result<Value> {
    let ndim = cur.advance_u32()?;
    if ndim > MAX_DIMENSIONS {
        return Err(ProtocolError::TooManyDimensions { ndim }.into());
    }
    let flags = cur.advance_i32()?;
    if flags & !1 != 0 {
        return Err(ProtocolError::InvalidArrayFlags { flags }.into());
    }
    let element_oid = cur.advance_u32()?;
    if element_oid != expected_elem_oid {
        return Err(ProtocolError::UnexpectedElementOid {
            expected: expected_elem_oid,
            found: element_oid,
        }
        .into());
    }

    if ndim == 0 {
        return Ok(Value::Array(ArrayValue {
            element_oid,
            dims: Vec::new(),
            lower_bounds: Vec::new(),
            elements: Vec::new(),
        }));
    }

    let mut dims = Vec::with_capacity(ndim as usize);
    let mut lower_bounds = Vec::with_capacity(ndim as usize);
    for _ in 0..ndim {
        dims.push(cur.advance_i32()?);
        lower_bounds.push(cur.advance_i32()?);
    }

    let total: i64 = dims.iter().map(|&d| i64::from(d.max(0))).product();
    let total = usize::try_from(total).unwrap_or(0);
    let mut elements = Vec::with_capacity(total);
    for _ in 0..total {
        let len = cur.advance_i32()?;
        if len < 0 {
            elements.push(None);
            continue;
        }
        let mut sub = cur.sub_cursor(len as usize)?;
        let value = registry.decode_element(element_oid, &mut sub)?;
        Cursor::finish(sub)?;
        elements.push(Some(value));
    }

    Ok(Value::Array(ArrayValue {
        element_oid,
        dims,
        lower_bounds,
        elements,
    }))
}

pub(super) fn register(entries: &mut HashMap<Oid, RegistryEntry>) {
    const ARRAYS: &[(Oid, Oid)] = &[
        (oid::BOOLARRAY, oid::BOOL),
        (oid::BYTEAARRAY, oid::BYTEA),
        (oid::CHARARRAY, oid::CHAR),
        (oid::NAMEARRAY, oid::NAME),
        (oid::INT8ARRAY, oid::INT8),
        (oid::INT2ARRAY, oid::INT2),
        (oid::INT2VECTOR, oid::INT2),
        (oid::INT2VECTORARRAY, oid::INT2),
        (oid::INT4ARRAY, oid::INT4),
        (oid::REGPROCARRAY, oid::REGPROC),
        (oid::TEXTARRAY, oid::TEXT),
        (oid::OIDARRAY, oid::OID),
        (oid::OIDVECTOR, oid::OID),
        (oid::OIDVECTORARRAY, oid::OID),
        (oid::TIDARRAY, oid::TID),
        (oid::XIDARRAY, oid::XID),
        (oid::CIDARRAY, oid::CID),
        (oid::JSONARRAY, oid::JSON),
        (oid::POINTARRAY, oid::POINT),
        (oid::LSEGARRAY, oid::LSEG),
        (oid::PATHARRAY, oid::PATH),
        (oid::BOXARRAY, oid::BOX),
        (oid::POLYGONARRAY, oid::POLYGON),
        (oid::LINEARRAY, oid::LINE),
        (oid::CIDRARRAY, oid::CIDR),
        (oid::FLOAT4ARRAY, oid::FLOAT4),
        (oid::FLOAT8ARRAY, oid::FLOAT8),
        (oid::ABSTIMEARRAY, oid::ABSTIME),
        (oid::RELTIMEARRAY, oid::RELTIME),
        (oid::TINTERVALARRAY, oid::TINTERVAL),
        (oid::CIRCLEARRAY, oid::CIRCLE),
        (oid::MACADDR8ARRAY, oid::MACADDR8),
        (oid::MONEYARRAY, oid::MONEY),
        (oid::MACADDRARRAY, oid::MACADDR),
        (oid::INETARRAY, oid::INET),
        (oid::BPCHARARRAY, oid::BPCHAR),
        (oid::VARCHARARRAY, oid::VARCHAR),
        (oid::DATEARRAY, oid::DATE),
        (oid::TIMEARRAY, oid::TIME),
        (oid::TIMESTAMPARRAY, oid::TIMESTAMP),
        (oid::TIMESTAMPTZARRAY, oid::TIMESTAMPTZ),
        (oid::INTERVALARRAY, oid::INTERVAL),
        (oid::TIMETZARRAY, oid::TIMETZ),
        (oid::BITARRAY, oid::BIT),
        (oid::VARBITARRAY, oid::VARBIT),
        (oid::NUMERICARRAY, oid::NUMERIC),
        (oid::UUIDARRAY, oid::UUID),
        (oid::CSTRINGARRAY, oid::CSTRING),
        (oid::JSONBARRAY, oid::JSONB),
    ];
    for &(array_oid, element_oid) in ARRAYS {
        insert(
            entries,
            array_oid,
            RegistryEntry {
                text: None,
                binary: None,
                array_element_oid: Some(element_oid),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::Format;

    fn array_header(ndim: u32, has_nulls: bool, elem_oid: Oid) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&ndim.to_be_bytes());
        buf.extend_from_slice(&i32::from(has_nulls).to_be_bytes());
        buf.extend_from_slice(&elem_oid.to_be_bytes());
        buf
    }

    #[test]
    fn decodes_a_flat_int4_array() {
        let registry = Registry::new();
        let mut bytes = array_header(1, false, oid::INT4);
        bytes.extend_from_slice(&3i32.to_be_bytes()); // dim len
        bytes.extend_from_slice(&1i32.to_be_bytes()); // lower bound
        for v in [10i32, 20, 30] {
            bytes.extend_from_slice(&4i32.to_be_bytes());
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        let value = registry.decode(oid::INT4ARRAY, Format::Binary, &bytes).unwrap();
        match value {
            Value::Array(arr) => {
                assert_eq!(arr.dims, vec![3]);
                assert_eq!(
                    arr.elements,
                    vec![Some(Value::Int4(10)), Some(Value::Int4(20)), Some(Value::Int4(30))]
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_array_has_zero_dims() {
        let registry = Registry::new();
        let bytes = array_header(0, false, oid::TEXT);
        let value = registry.decode(oid::TEXTARRAY, Format::Binary, &bytes).unwrap();
        assert_eq!(
            value,
            Value::Array(ArrayValue {
                element_oid: oid::TEXT,
                dims: Vec::new(),
                lower_bounds: Vec::new(),
                elements: Vec::new(),
            })
        );
    }

    #[test]
    fn null_elements_decode_to_none() {
        let registry = Registry::new();
        let mut bytes = array_header(1, true, oid::TEXT);
        bytes.extend_from_slice(&1i32.to_be_bytes());
        bytes.extend_from_slice(&1i32.to_be_bytes());
        bytes.extend_from_slice(&(-1i32).to_be_bytes());
        let value = registry.decode(oid::TEXTARRAY, Format::Binary, &bytes).unwrap();
        match value {
            Value::Array(arr) => assert_eq!(arr.elements, vec![None]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn too_many_dimensions_errors() {
        let registry = Registry::new();
        let bytes = array_header(7, false, oid::INT4);
        assert!(registry.decode(oid::INT4ARRAY, Format::Binary, &bytes).is_err());
    }

    #[test]
    fn mismatched_element_oid_errors() {
        let registry = Registry::new();
        let bytes = array_header(0, false, oid::TEXT);
        assert!(registry.decode(oid::INT4ARRAY, Format::Binary, &bytes).is_err());
    }
}
