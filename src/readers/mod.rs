//! The type registry: maps a PostgreSQL type OID to the reader functions that decode
//! its text and binary wire representations into a [`Value`](crate::value::Value).

mod array;
mod bitstring;
mod decimal;
mod geometric;
mod json;
mod network;
mod numeric;
mod temporal;
mod text;
mod uuid;

pub use array::read_array_binary;
pub use decimal::{decimal_from_numeric_binary, decimal_from_numeric_text, decimal_to_numeric_binary};

use std::collections::HashMap;

use crate::cursor::Cursor;
use crate::error::{ProtocolError, Result};
use crate::oid::Oid;
use crate::value::Value;

/// A reader decodes a value from a cursor scoped to exactly that value's bytes.
pub type ReaderFn = fn(&mut Cursor<'_>) -> Result<Value>;

/// The pair of readers registered for one OID. Either may be absent: some types
/// (e.g. legacy `money`) never round-trip through text in this driver, and most
/// types have no in-use text reader since parameters are always sent binary.
#[derive(Clone, Copy, Default)]
pub struct RegistryEntry {
    pub text: Option<ReaderFn>,
    pub binary: Option<ReaderFn>,
    /// Set only for array OIDs: the OID of the element type the array contains.
    pub array_element_oid: Option<Oid>,
}

/// The OID-indexed table of scalar and array readers.
///
/// Populated once at construction from a fixed set of per-family registration
/// functions. Registration is first-wins: a later call that targets an OID already
/// present is a programming error (it would silently shadow a previously wired type)
/// and is logged rather than applied.
pub struct Registry {
    entries: HashMap<Oid, RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        numeric::register(&mut entries);
        text::register(&mut entries);
        uuid::register(&mut entries);
        json::register(&mut entries);
        geometric::register(&mut entries);
        network::register(&mut entries);
        bitstring::register(&mut entries);
        temporal::register(&mut entries);
        decimal::register(&mut entries);
        array::register(&mut entries);
        Self { entries }
    }

    pub fn get(&self, oid: Oid) -> Option<&RegistryEntry> {
        self.entries.get(&oid)
    }

    /// Decode one value: pick the reader for `oid`/`format`, run it over a cursor
    /// scoped to `bytes`, and require the reader to have consumed every byte.
    ///
    /// Array OIDs have no reader function of their own; binary array values are
    /// routed to [`array::read_array_binary`] instead, with the registry passed
    /// through so element decoding resolves against live registrations.
    pub fn decode(&self, oid: Oid, format: crate::oid::Format, bytes: &[u8]) -> Result<Value> {
        let Some(entry) = self.get(oid) else {
            return Err(ProtocolError::UnexpectedElementOid {
                expected: oid,
                found: oid,
            }
            .into());
        };
        let mut cursor = Cursor::new(bytes);
        let value = if format == crate::oid::Format::Binary && entry.array_element_oid.is_some() {
            let elem_oid = entry.array_element_oid.unwrap_or_else(|| unreachable!());
            array::read_array_binary(&mut cursor, self, elem_oid)?
        } else {
            self.dispatch_scalar(oid, entry, format, &mut cursor)?
        };
        if !cursor.at_end() {
            return Err(ProtocolError::TrailingBytes {
                remaining: cursor.remaining(),
            }
            .into());
        }
        Ok(value)
    }

    fn dispatch_scalar(
        &self,
        oid: Oid,
        entry: &RegistryEntry,
        format: crate::oid::Format,
        cursor: &mut Cursor<'_>,
    ) -> Result<Value> {
        let reader = match format {
            crate::oid::Format::Text => entry.text,
            crate::oid::Format::Binary => entry.binary,
        };
        let Some(reader) = reader else {
            return Err(ProtocolError::UnexpectedElementOid {
                expected: oid,
                found: oid,
            }
            .into());
        };
        reader(cursor)
    }

    /// Decode a single array element, scoped to its own sub-cursor. Used by the
    /// array reader so that element dispatch (including nested arrays, as for
    /// `int2vector`/`oidvector`) goes through the same registry the outer decode
    /// started from.
    pub(crate) fn decode_element(&self, oid: Oid, cur: &mut Cursor<'_>) -> Result<Value> {
        let Some(entry) = self.get(oid) else {
            return Err(ProtocolError::UnexpectedElementOid {
                expected: oid,
                found: oid,
            }
            .into());
        };
        if let Some(elem_oid) = entry.array_element_oid {
            return array::read_array_binary(cur, self, elem_oid);
        }
        let Some(reader) = entry.binary else {
            return Err(ProtocolError::UnexpectedElementOid { expected: oid, found: oid }.into());
        };
        reader(cur)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert an entry for `oid`, warning (but not overwriting) if one is already present.
///
/// Shared by every `register` function in this module so the "later registrations
/// never override earlier ones" rule lives in exactly one place.
pub(crate) fn insert(entries: &mut HashMap<Oid, RegistryEntry>, oid: Oid, entry: RegistryEntry) {
    if entries.contains_key(&oid) {
        tracing::error!(oid, "duplicate type registry entry; keeping the first registration");
        return;
    }
    entries.insert(oid, entry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::{oid, Format};

    #[test]
    fn decodes_a_registered_scalar() {
        let registry = Registry::new();
        let bytes = 42i32.to_be_bytes();
        let value = registry.decode(oid::INT4, Format::Binary, &bytes).unwrap();
        assert_eq!(value, Value::Int4(42));
    }

    #[test]
    fn unregistered_oid_errors() {
        let registry = Registry::new();
        assert!(registry.decode(999_999, Format::Binary, &[]).is_err());
    }
}
