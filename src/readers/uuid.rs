//! UUID scalar reader.

use std::collections::HashMap;

use super::{insert, RegistryEntry};
use crate::cursor::Cursor;
use crate::error::Result;
use crate::oid::{oid, Oid};
use crate::value::Value;

fn uuid_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let bytes = cur.advance_bytes(16)?;
    let array: [u8; 16] = bytes.try_into().unwrap_or_else(|_| unreachable!());
    Ok(Value::Uuid(uuid::Uuid::from_bytes(array)))
}

fn uuid_text(cur: &mut Cursor<'_>) -> Result<Value> {
    let text = cur.advance_text(cur.remaining())?;
    let parsed = uuid::Uuid::parse_str(text).map_err(|_| crate::error::ProtocolError::TextParseFailed {
        kind: "uuid",
        text: text.to_string(),
    })?;
    Ok(Value::Uuid(parsed))
}

pub(super) fn register(entries: &mut HashMap<Oid, RegistryEntry>) {
    insert(
        entries,
        oid::UUID,
        RegistryEntry {
            text: Some(uuid_text),
            binary: Some(uuid_binary),
            array_element_oid: None,
        },
    );
}
