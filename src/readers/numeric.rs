//! Boolean, fixed-width integer and floating point scalar readers.

use std::collections::HashMap;

use super::{insert, RegistryEntry};
use crate::cursor::Cursor;
use crate::error::{ProtocolError, Result};
use crate::oid::{oid, Oid};
use crate::value::Value;

fn bool_text(cur: &mut Cursor<'_>) -> Result<Value> {
    let text = cur.advance_to_end();
    Ok(Value::Bool(text == b"t" || text == b"true"))
}

fn bool_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Bool(cur.advance_u8()? != 0))
}

macro_rules! int_text_reader {
    ($name:ident, $ty:ty, $variant:ident) => {
        fn $name(cur: &mut Cursor<'_>) -> Result<Value> {
            let text = cur.advance_text(cur.remaining())?;
            let v: $ty = text.parse().map_err(|_| ProtocolError::TextParseFailed {
                kind: stringify!($ty),
                text: text.to_string(),
            })?;
            Ok(Value::$variant(v))
        }
    };
}

int_text_reader!(int2_text, i16, Int2);
int_text_reader!(int4_text, i32, Int4);
int_text_reader!(int8_text, i64, Int8);

fn int2_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Int2(cur.advance_i16()?))
}

fn int4_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Int4(cur.advance_i32()?))
}

fn int8_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Int8(cur.advance_i64()?))
}

/// `oid`, `xid`, `cid` and `regproc` are all unsigned 32-bit identifiers on the wire;
/// we surface them as `Int4` with the sign bit reinterpreted, matching how the rest
/// of this crate treats 4-byte integral wire values.
fn oid4_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Int4(cur.advance_u32()? as i32))
}

fn oid4_text(cur: &mut Cursor<'_>) -> Result<Value> {
    let text = cur.advance_text(cur.remaining())?;
    let v: u32 = text.parse().map_err(|_| ProtocolError::TextParseFailed {
        kind: "u32",
        text: text.to_string(),
    })?;
    Ok(Value::Int4(v as i32))
}

fn float4_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Float4(cur.advance_f32()?))
}

fn float8_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Float8(cur.advance_f64()?))
}

fn float4_text(cur: &mut Cursor<'_>) -> Result<Value> {
    let text = cur.advance_text(cur.remaining())?;
    let v: f32 = text.parse().map_err(|_| ProtocolError::TextParseFailed {
        kind: "f32",
        text: text.to_string(),
    })?;
    Ok(Value::Float4(v))
}

fn float8_text(cur: &mut Cursor<'_>) -> Result<Value> {
    let text = cur.advance_text(cur.remaining())?;
    let v: f64 = text.parse().map_err(|_| ProtocolError::TextParseFailed {
        kind: "f64",
        text: text.to_string(),
    })?;
    Ok(Value::Float8(v))
}

/// `money` is transmitted as an `int8` count of the minor currency unit (cents).
fn money_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Money(cur.advance_i64()?))
}

/// `tid` is a `(block, offset)` pair: a 4-byte block number and a 2-byte item offset.
fn tid_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let block = cur.advance_u32()?;
    let offset = cur.advance_u16()?;
    Ok(Value::Tid { block, offset })
}

fn tid_text(cur: &mut Cursor<'_>) -> Result<Value> {
    let text = cur.advance_text(cur.remaining())?;
    let inner = text
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| ProtocolError::MalformedTid(text.to_string()))?;
    let (block_str, offset_str) = inner
        .split_once(',')
        .ok_or_else(|| ProtocolError::MalformedTid(text.to_string()))?;
    let block: u32 = block_str
        .parse()
        .map_err(|_| ProtocolError::MalformedTid(text.to_string()))?;
    let offset: u16 = offset_str
        .parse()
        .map_err(|_| ProtocolError::MalformedTid(text.to_string()))?;
    Ok(Value::Tid { block, offset })
}

pub(super) fn register(entries: &mut HashMap<Oid, RegistryEntry>) {
    insert(
        entries,
        oid::BOOL,
        RegistryEntry {
            text: Some(bool_text),
            binary: Some(bool_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::INT2,
        RegistryEntry {
            text: Some(int2_text),
            binary: Some(int2_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::INT4,
        RegistryEntry {
            text: Some(int4_text),
            binary: Some(int4_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::INT8,
        RegistryEntry {
            text: Some(int8_text),
            binary: Some(int8_binary),
            array_element_oid: None,
        },
    );
    for scalar_oid in [oid::OID, oid::XID, oid::CID, oid::REGPROC] {
        insert(
            entries,
            scalar_oid,
            RegistryEntry {
                text: Some(oid4_text),
                binary: Some(oid4_binary),
                array_element_oid: None,
            },
        );
    }
    insert(
        entries,
        oid::FLOAT4,
        RegistryEntry {
            text: Some(float4_text),
            binary: Some(float4_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::FLOAT8,
        RegistryEntry {
            text: Some(float8_text),
            binary: Some(float8_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::MONEY,
        RegistryEntry {
            text: None,
            binary: Some(money_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::TID,
        RegistryEntry {
            text: Some(tid_text),
            binary: Some(tid_binary),
            array_element_oid: None,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::Format;
    use crate::readers::Registry;

    #[test]
    fn bool_round_trips() {
        let registry = Registry::new();
        assert_eq!(
            registry.decode(oid::BOOL, Format::Binary, &[1]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            registry.decode(oid::BOOL, Format::Text, b"f").unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn tid_text_parses_pair() {
        let registry = Registry::new();
        let value = registry.decode(oid::TID, Format::Text, b"(12,7)").unwrap();
        assert_eq!(value, Value::Tid { block: 12, offset: 7 });
    }

    #[test]
    fn money_is_minor_units() {
        let registry = Registry::new();
        let bytes = 12345i64.to_be_bytes();
        assert_eq!(
            registry.decode(oid::MONEY, Format::Binary, &bytes).unwrap(),
            Value::Money(12345)
        );
    }
}
