//! JSON and JSONB scalar readers.

use std::collections::HashMap;

use super::{insert, RegistryEntry};
use crate::cursor::Cursor;
use crate::error::{ProtocolError, Result};
use crate::oid::{oid, Oid};
use crate::value::Value;

fn json_reader(cur: &mut Cursor<'_>) -> Result<Value> {
    let text = cur.advance_text(cur.remaining())?;
    let parsed: serde_json::Value = serde_json::from_str(text)?;
    Ok(Value::Json(parsed))
}

/// JSONB's binary form prefixes the JSON text with a one-byte format version, which
/// PostgreSQL has held at `1` since JSONB's introduction.
fn jsonb_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let version = cur.advance_u8()?;
    if version != 1 {
        return Err(ProtocolError::UnsupportedJsonbVersion { version }.into());
    }
    json_reader(cur)
}

pub(super) fn register(entries: &mut HashMap<Oid, RegistryEntry>) {
    insert(
        entries,
        oid::JSON,
        RegistryEntry {
            text: Some(json_reader),
            binary: Some(json_reader),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::JSONB,
        RegistryEntry {
            text: Some(json_reader),
            binary: Some(jsonb_binary),
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
    fn jsonb_rejects_unknown_version() {
        let registry = Registry::new();
        let mut bytes = vec![2u8];
        bytes.extend_from_slice(b"{}");
        assert!(registry.decode(oid::JSONB, Format::Binary, &bytes).is_err());
    }

    #[test]
    fn jsonb_decodes_version_one() {
        let registry = Registry::new();
        let mut bytes = vec![1u8];
        bytes.extend_from_slice(br#"{"a":1}"#);
        let value = registry.decode(oid::JSONB, Format::Binary, &bytes).unwrap();
        assert_eq!(value, Value::Json(serde_json::json!({"a": 1})));
    }
}
