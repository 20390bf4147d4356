//! BIT and VARBIT scalar readers.
//!
//! The wire format packs bits MSB-first into whole bytes, left-aligned; when the
//! declared bit length isn't a multiple of 8 the low bits of the final byte are
//! padding and must be shifted away so the returned integer has exactly `len` bits
//! of significance.

use std::collections::HashMap;

use num_bigint::BigUint;

use super::{insert, RegistryEntry};
use crate::cursor::Cursor;
use crate::error::{ProtocolError, Result};
use crate::oid::{oid, Oid};
use crate::value::Value;

fn bit_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let len = cur.advance_i32()?.max(0) as u32;
    let nbytes = len.div_ceil(8) as usize;
    let bytes = cur.advance_bytes(nbytes)?;
    let mut bits = BigUint::from_bytes_be(bytes);
    let rest = len % 8;
    if rest != 0 {
        bits >>= 8 - rest;
    }
    Ok(Value::Bit { bits, len })
}

fn bit_text(cur: &mut Cursor<'_>) -> Result<Value> {
    let text = cur.advance_text(cur.remaining())?;
    let mut bits = BigUint::from(0u32);
    let mut len = 0u32;
    for ch in text.bytes() {
        let bit = match ch {
            b'0' => 0u32,
            b'1' => 1u32,
            other => return Err(ProtocolError::InvalidBitChar(other).into()),
        };
        bits = (bits << 1u32) + BigUint::from(bit);
        len += 1;
    }
    Ok(Value::Bit { bits, len })
}

pub(super) fn register(entries: &mut HashMap<Oid, RegistryEntry>) {
    for bit_oid in [oid::BIT, oid::VARBIT] {
        insert(
            entries,
            bit_oid,
            RegistryEntry {
                text: Some(bit_text),
                binary: Some(bit_binary),
                array_element_oid: None,
            },
        );
    }
}
