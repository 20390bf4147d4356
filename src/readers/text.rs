//! Text-family and byte-string scalar readers.

use std::collections::HashMap;

use super::{insert, RegistryEntry};
use crate::cursor::Cursor;
use crate::error::Result;
use crate::oid::{oid, Oid};
use crate::value::Value;

fn text_reader(cur: &mut Cursor<'_>) -> Result<Value> {
    let text = cur.advance_text(cur.remaining())?;
    Ok(Value::Text(text.to_string()))
}

/// `char` (without width) is a single raw byte on the wire, not a UTF-8 text value.
fn char_reader(cur: &mut Cursor<'_>) -> Result<Value> {
    let bytes = cur.advance_bytes(cur.remaining())?;
    Ok(Value::Bytes(bytes.to_vec()))
}

fn bytea_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let bytes = cur.advance_bytes(cur.remaining())?;
    Ok(Value::Bytes(bytes.to_vec()))
}

/// PostgreSQL's text-format `bytea` is either `\x`-prefixed hex, or the legacy
/// escape format (`\\` for a literal backslash, `\ooo` for a non-printable byte,
/// anything else verbatim).
fn bytea_text(cur: &mut Cursor<'_>) -> Result<Value> {
    let bytes = cur.advance_bytes(cur.remaining())?;
    if let Some(hex) = bytes.strip_prefix(b"\\x") {
        let mut out = Vec::with_capacity(hex.len() / 2);
        let mut iter = hex.iter();
        while let Some(&hi) = iter.next() {
            let lo = *iter.next().unwrap_or(&b'0');
            let hi = hex_digit(hi)?;
            let lo = hex_digit(lo)?;
            out.push((hi << 4) | lo);
        }
        return Ok(Value::Bytes(out));
    }
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    loop {
        let Some(next) = memchr::memchr(b'\\', &bytes[i..]) else {
            out.extend_from_slice(&bytes[i..]);
            break;
        };
        out.extend_from_slice(&bytes[i..i + next]);
        i += next;
        if bytes.get(i + 1) == Some(&b'\\') {
            out.push(b'\\');
            i += 2;
        } else if i + 3 < bytes.len() && bytes[i + 1..i + 4].iter().all(u8::is_ascii_digit) {
            let mut value = 0u16;
            for &d in &bytes[i + 1..i + 4] {
                if !(b'0'..=b'7').contains(&d) {
                    return Err(crate::error::ProtocolError::InvalidByteaOctalEscape(d).into());
                }
                value = value * 8 + u16::from(d - b'0');
            }
            let octal = u8::try_from(value).map_err(|_| crate::error::ProtocolError::InvalidByteaOctalEscape(bytes[i + 1]))?;
            out.push(octal);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(Value::Bytes(out))
}

fn hex_digit(b: u8) -> Result<u8> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        other => Err(crate::error::ProtocolError::InvalidBitChar(other).into()),
    }
}

pub(super) fn register(entries: &mut HashMap<Oid, RegistryEntry>) {
    for text_oid in [oid::TEXT, oid::VARCHAR, oid::BPCHAR, oid::NAME, oid::CSTRING, oid::XML] {
        insert(
            entries,
            text_oid,
            RegistryEntry {
                text: Some(text_reader),
                binary: Some(text_reader),
                array_element_oid: None,
            },
        );
    }
    insert(
        entries,
        oid::CHAR,
        RegistryEntry {
            text: Some(char_reader),
            binary: Some(char_reader),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::BYTEA,
        RegistryEntry {
            text: Some(bytea_text),
            binary: Some(bytea_binary),
            array_element_oid: None,
        },
    );
}
