//! The Result Facade: wraps a [`RawTuples`] implementor and dispatches
//! `getvalue` through the [`Registry`] to produce decoded [`Value`]s.

use crate::error::Result;
use crate::oid::{Format, Oid};
use crate::raw::RawTuples;
use crate::readers::Registry;
use crate::value::Value;

/// Decoded column metadata, derived from `RawTuples`' per-column accessors plus
/// NUMERIC/FLOAT4/FLOAT8 precision and scale computed from `fmod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    pub name: String,
    pub type_oid: Oid,
    pub display_size: Option<i32>,
    pub internal_size: i32,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub null_ok: Option<bool>,
}

/// Precision/scale derived from a column's `fmod`: `(fmod-4)/0x10000` and
/// `(fmod-4) & 0xFFFF` for NUMERIC, and the fixed IEEE-754 constants for
/// FLOAT4/FLOAT8.
fn precision_scale(oid: Oid, fmod: i32) -> (Option<i32>, Option<i32>) {
    match oid {
        crate::oid::oid::NUMERIC if fmod >= 4 => {
            let basis = fmod - 4;
            (Some(basis >> 16), Some(basis & 0xFFFF))
        }
        crate::oid::oid::FLOAT4 => (Some(24), None),
        crate::oid::oid::FLOAT8 => (Some(53), None),
        _ => (None, None),
    }
}

/// Wraps a [`RawTuples`] handle and the [`Registry`] needed to decode its cells.
///
/// `getvalue`'s dispatch looks up the column's OID, picks the reader by the
/// column's wire format, scopes a `Cursor` over the raw bytes, and requires the
/// reader to consume every byte (enforced inside `Registry::decode`).
pub struct ResultSet<'r, T> {
    raw: &'r T,
    registry: &'r Registry,
}

impl<'r, T: RawTuples> ResultSet<'r, T> {
    pub fn new(raw: &'r T, registry: &'r Registry) -> Self {
        Self { raw, registry }
    }

    pub fn ntuples(&self) -> usize {
        self.raw.ntuples()
    }

    pub fn nfields(&self) -> usize {
        self.raw.nfields()
    }

    pub fn ftype(&self, col: usize) -> Oid {
        self.raw.ftype(col)
    }

    pub fn fformat(&self, col: usize) -> Format {
        self.raw.fformat(col)
    }

    pub fn getisnull(&self, row: usize, col: usize) -> bool {
        self.raw.getisnull(row, col)
    }

    pub fn getlength(&self, row: usize, col: usize) -> usize {
        self.raw.getlength(row, col)
    }

    /// Decode one cell. NULL short-circuits before any registry lookup; an OID
    /// the registry has no reader for falls back to the raw bytes (binary) or the
    /// server's own text rendering.
    pub fn getvalue(&self, row: usize, col: usize) -> Result<Option<Value>> {
        if self.raw.getisnull(row, col) {
            return Ok(None);
        }
        let oid = self.raw.ftype(col);
        let format = self.raw.fformat(col);
        let bytes = self.raw.getvalue(row, col).unwrap_or(&[]);

        let Some(entry) = self.registry.get(oid) else {
            return Ok(Some(fallback_value(format, bytes)));
        };
        let has_reader = match format {
            Format::Text => entry.text.is_some(),
            Format::Binary => entry.binary.is_some() || entry.array_element_oid.is_some(),
        };
        if !has_reader {
            return Ok(Some(fallback_value(format, bytes)));
        }
        Ok(Some(self.registry.decode(oid, format, bytes)?))
    }

    /// Column metadata for the whole result, in the DB-API `description` shape,
    /// with NUMERIC/FLOAT4/FLOAT8 precision/scale derived from `fmod`.
    pub fn description(&self) -> Vec<ColumnDescription> {
        (0..self.raw.nfields())
            .map(|col| {
                let oid = self.raw.ftype(col);
                let fmod = self.raw.fmod(col);
                let (precision, scale) = precision_scale(oid, fmod);
                ColumnDescription {
                    name: self.raw.fname(col).to_string(),
                    type_oid: oid,
                    display_size: None,
                    internal_size: self.raw.fsize(col),
                    precision,
                    scale,
                    null_ok: None,
                }
            })
            .collect()
    }
}

/// A cell whose OID has no registered reader for its wire format: binary falls
/// back to the raw bytes, text to the server's own textual rendering.
fn fallback_value(format: Format, bytes: &[u8]) -> Value {
    match format {
        Format::Binary => Value::Bytes(bytes.to_vec()),
        Format::Text => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
    }
}
