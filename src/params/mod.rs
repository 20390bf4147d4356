//! Parameter handlers: the encode side of the codec.
//!
//! A closed `ParamHandler` variant is built once per bound parameter and fed every
//! row of a (possibly batched) execution in a two-pass examine/finish cycle:
//! `examine` accumulates values and widens state as needed, `finish` resolves the
//! settled OID/format and emits one length-prefixed (`-1` for NULL) encoded
//! payload per row.

mod array;

use std::collections::VecDeque;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use rust_decimal::Decimal;

pub use array::ArrayHandler;

use crate::error::{Result, UsageError};
use crate::oid::{oid, Format, Oid};
use crate::readers::decimal_to_numeric_binary;

const PG_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2000, 1, 1) {
    Some(d) => d,
    None => panic!("2000-01-01 is always a valid NaiveDate"),
};
const USECS_PER_SEC: i64 = 1_000_000;
const USECS_PER_DAY: i64 = 86_400_000_000;

/// A host value bound as a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    /// Arbitrary-width integer input; the handler widens its wire representation
    /// (I32 -> I64 -> TEXT) to fit whatever values it actually sees.
    Int(i128),
    Float4(f32),
    Float8(f64),
    Numeric(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    Json(serde_json::Value),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Array(Vec<Param>),
}

impl Param {
    /// A short, stable name for the value's type family, used in mismatch errors.
    fn family(&self) -> &'static str {
        match self {
            Param::Null => "null",
            Param::Bool(_) => "bool",
            Param::Int(_) => "int",
            Param::Float4(_) => "float4",
            Param::Float8(_) => "float8",
            Param::Numeric(_) => "numeric",
            Param::Text(_) => "text",
            Param::Bytes(_) => "bytes",
            Param::Uuid(_) => "uuid",
            Param::Json(_) => "json",
            Param::Date(_) => "date",
            Param::Timestamp(_) => "timestamp",
            Param::TimestampTz(_) => "timestamptz",
            Param::Array(_) => "array",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum IntWidth {
    I32,
    I64,
    Text,
}

#[derive(Default)]
struct IntHandler {
    width: Option<IntWidth>,
    values: Vec<Option<i128>>,
}

impl IntHandler {
    fn examine(&mut self, val: Option<i128>) {
        if let Some(v) = val {
            let needed = if i32::try_from(v).is_ok() {
                IntWidth::I32
            } else if i64::try_from(v).is_ok() {
                IntWidth::I64
            } else {
                IntWidth::Text
            };
            let widened = match self.width {
                None => needed,
                Some(current) if needed > current => {
                    tracing::debug!(from = ?current, to = ?needed, "widening int parameter handler");
                    needed
                }
                Some(current) => current,
            };
            self.width = Some(widened);
        }
        self.values.push(val);
    }

    fn oid(&self) -> Oid {
        match self.width.unwrap_or(IntWidth::I32) {
            IntWidth::I32 => oid::INT4,
            IntWidth::I64 => oid::INT8,
            IntWidth::Text => oid::TEXT,
        }
    }

    fn array_oid(&self) -> Oid {
        match self.width.unwrap_or(IntWidth::I32) {
            IntWidth::I32 => oid::INT4ARRAY,
            IntWidth::I64 => oid::INT8ARRAY,
            IntWidth::Text => oid::TEXTARRAY,
        }
    }

    fn finish(&mut self) -> Result<Vec<Option<Vec<u8>>>> {
        let width = self.width.unwrap_or(IntWidth::I32);
        self.values
            .drain(..)
            .map(|val| match val {
                None => Ok(None),
                Some(v) => Ok(Some(match width {
                    IntWidth::I32 => (v as i32).to_be_bytes().to_vec(),
                    IntWidth::I64 => (v as i64).to_be_bytes().to_vec(),
                    IntWidth::Text => v.to_string().into_bytes(),
                })),
            })
            .collect()
    }
}

#[derive(Default)]
struct SimpleHandler {
    oid: Oid,
    array_oid: Oid,
    payloads: Vec<Option<Vec<u8>>>,
}

impl SimpleHandler {
    fn new(oid: Oid, array_oid: Oid) -> Self {
        Self {
            oid,
            array_oid,
            payloads: Vec::new(),
        }
    }
}

#[derive(Default)]
struct TimestampHandler {
    has_tz: Option<bool>,
    payloads: Vec<Option<Vec<u8>>>,
}

fn encode_date(date: NaiveDate) -> Vec<u8> {
    let days = (date - PG_EPOCH).num_days() as i32;
    days.to_be_bytes().to_vec()
}

fn encode_naive_timestamp(dt: NaiveDateTime) -> Vec<u8> {
    let days = (dt.date() - PG_EPOCH).num_days();
    let usecs_of_day = i64::from(dt.time().num_seconds_from_midnight()) * USECS_PER_SEC
        + i64::from(dt.time().nanosecond()) / 1_000;
    (days * USECS_PER_DAY + usecs_of_day).to_be_bytes().to_vec()
}

impl TimestampHandler {
    fn examine(&mut self, val: &Param) -> Result<()> {
        match val {
            Param::Null => self.payloads.push(None),
            Param::Timestamp(dt) => {
                self.set_has_tz(false)?;
                self.payloads.push(Some(encode_naive_timestamp(*dt)));
            }
            Param::TimestampTz(dt) => {
                self.set_has_tz(true)?;
                self.payloads.push(Some(encode_naive_timestamp(dt.naive_utc())));
            }
            other => {
                return Err(
                    UsageError::Other(format!("expected a timestamp-family value, found {}", other.family())).into(),
                );
            }
        }
        Ok(())
    }

    fn set_has_tz(&mut self, has_tz: bool) -> Result<()> {
        match self.has_tz {
            None => {
                self.has_tz = Some(has_tz);
                Ok(())
            }
            Some(existing) if existing == has_tz => Ok(()),
            Some(_) => Err(UsageError::MixedNaiveAndAwareTimestamps.into()),
        }
    }

    fn oid(&self) -> Oid {
        if self.has_tz == Some(true) {
            oid::TIMESTAMPTZ
        } else {
            oid::TIMESTAMP
        }
    }

    fn array_oid(&self) -> Oid {
        if self.has_tz == Some(true) {
            oid::TIMESTAMPTZARRAY
        } else {
            oid::TIMESTAMPARRAY
        }
    }
}

/// The resolved, stateful encoder for one bound parameter across every row of a
/// (possibly batched) execution.
pub enum ParamHandler {
    Bool(SimpleHandler),
    Int(IntHandler),
    Float4(SimpleHandler),
    Float8(SimpleHandler),
    Numeric(SimpleHandler),
    Text(SimpleHandler),
    Bytes(SimpleHandler),
    Uuid(SimpleHandler),
    Json(SimpleHandler),
    Date(SimpleHandler),
    Timestamp(TimestampHandler),
    Array(Box<ArrayHandler>),
    /// Every value examined so far has been `Param::Null`; the concrete handler is
    /// still undecided. Resolves to `Text`/`TEXTARRAY` if it never sees anything else,
    /// matching the array handler's empty-array default.
    Undecided(Vec<()>),
}

impl ParamHandler {
    pub fn new() -> Self {
        ParamHandler::Undecided(Vec::new())
    }

    /// True if `val`'s type family matches the handler's already-settled family (or
    /// the handler hasn't settled on one yet).
    pub fn allows_type(&self, val: &Param) -> bool {
        if matches!(val, Param::Null) {
            return true;
        }
        match (self, val) {
            (ParamHandler::Undecided(_), _) => true,
            (ParamHandler::Bool(_), Param::Bool(_)) => true,
            (ParamHandler::Int(_), Param::Int(_)) => true,
            (ParamHandler::Float4(_), Param::Float4(_)) => true,
            (ParamHandler::Float8(_), Param::Float8(_)) => true,
            (ParamHandler::Numeric(_), Param::Numeric(_)) => true,
            (ParamHandler::Text(_), Param::Text(_)) => true,
            (ParamHandler::Bytes(_), Param::Bytes(_)) => true,
            (ParamHandler::Uuid(_), Param::Uuid(_)) => true,
            (ParamHandler::Json(_), Param::Json(_)) => true,
            (ParamHandler::Date(_), Param::Date(_)) => true,
            (ParamHandler::Timestamp(_), Param::Timestamp(_) | Param::TimestampTz(_)) => true,
            (ParamHandler::Array(_), Param::Array(_)) => true,
            _ => false,
        }
    }

    /// Feed one value (one row) into the handler, resolving the concrete handler
    /// kind the first time a non-null value arrives.
    pub fn examine(&mut self, val: &Param) -> Result<()> {
        if let ParamHandler::Undecided(nulls) = self {
            match val {
                Param::Null => {
                    nulls.push(());
                    return Ok(());
                }
                _ => {
                    let leading_nulls = nulls.len();
                    *self = Self::for_value(val);
                    for _ in 0..leading_nulls {
                        self.examine(&Param::Null)?;
                    }
                }
            }
        }
        if !self.allows_type(val) {
            return Err(UsageError::Other(format!(
                "parameter handler for {} cannot accept a {} value",
                self.type_name(),
                val.family()
            ))
            .into());
        }
        match (self, val) {
            (ParamHandler::Bool(h), Param::Bool(v)) => h.payloads.push(Some(vec![u8::from(*v)])),
            (ParamHandler::Bool(h), Param::Null) => h.payloads.push(None),
            (ParamHandler::Int(h), Param::Int(v)) => h.examine(Some(*v)),
            (ParamHandler::Int(h), Param::Null) => h.examine(None),
            (ParamHandler::Float4(h), Param::Float4(v)) => h.payloads.push(Some(v.to_be_bytes().to_vec())),
            (ParamHandler::Float4(h), Param::Null) => h.payloads.push(None),
            (ParamHandler::Float8(h), Param::Float8(v)) => h.payloads.push(Some(v.to_be_bytes().to_vec())),
            (ParamHandler::Float8(h), Param::Null) => h.payloads.push(None),
            (ParamHandler::Numeric(h), Param::Numeric(v)) => h.payloads.push(Some(decimal_to_numeric_binary(v)?)),
            (ParamHandler::Numeric(h), Param::Null) => h.payloads.push(None),
            (ParamHandler::Text(h), Param::Text(v)) => h.payloads.push(Some(v.clone().into_bytes())),
            (ParamHandler::Text(h), Param::Null) => h.payloads.push(None),
            (ParamHandler::Bytes(h), Param::Bytes(v)) => h.payloads.push(Some(v.clone())),
            (ParamHandler::Bytes(h), Param::Null) => h.payloads.push(None),
            (ParamHandler::Uuid(h), Param::Uuid(v)) => h.payloads.push(Some(v.as_bytes().to_vec())),
            (ParamHandler::Uuid(h), Param::Null) => h.payloads.push(None),
            (ParamHandler::Json(h), Param::Json(v)) => {
                let mut buf = vec![1u8];
                buf.extend_from_slice(&serde_json::to_vec(v)?);
                h.payloads.push(Some(buf));
            }
            (ParamHandler::Json(h), Param::Null) => h.payloads.push(None),
            (ParamHandler::Date(h), Param::Date(v)) => h.payloads.push(Some(encode_date(*v))),
            (ParamHandler::Date(h), Param::Null) => h.payloads.push(None),
            (ParamHandler::Timestamp(h), _) => return h.examine(val),
            (ParamHandler::Array(h), Param::Array(items)) => return h.examine(items),
            (ParamHandler::Array(h), Param::Null) => return h.examine_null(),
            _ => unreachable!("allows_type already rejected mismatched families"),
        }
        Ok(())
    }

    fn for_value(val: &Param) -> Self {
        match val {
            Param::Bool(_) => ParamHandler::Bool(SimpleHandler::new(oid::BOOL, oid::BOOLARRAY)),
            Param::Int(_) => ParamHandler::Int(IntHandler::default()),
            Param::Float4(_) => ParamHandler::Float4(SimpleHandler::new(oid::FLOAT4, oid::FLOAT4ARRAY)),
            Param::Float8(_) => ParamHandler::Float8(SimpleHandler::new(oid::FLOAT8, oid::FLOAT8ARRAY)),
            Param::Numeric(_) => ParamHandler::Numeric(SimpleHandler::new(oid::NUMERIC, oid::NUMERICARRAY)),
            Param::Text(_) => ParamHandler::Text(SimpleHandler::new(oid::TEXT, oid::TEXTARRAY)),
            Param::Bytes(_) => ParamHandler::Bytes(SimpleHandler::new(oid::BYTEA, oid::BYTEAARRAY)),
            Param::Uuid(_) => ParamHandler::Uuid(SimpleHandler::new(oid::UUID, oid::UUIDARRAY)),
            Param::Json(_) => ParamHandler::Json(SimpleHandler::new(oid::JSONB, oid::JSONBARRAY)),
            Param::Date(_) => ParamHandler::Date(SimpleHandler::new(oid::DATE, oid::DATEARRAY)),
            Param::Timestamp(_) | Param::TimestampTz(_) => ParamHandler::Timestamp(TimestampHandler::default()),
            Param::Array(_) => ParamHandler::Array(Box::new(ArrayHandler::new())),
            Param::Null => ParamHandler::Undecided(Vec::new()),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ParamHandler::Bool(_) => "bool",
            ParamHandler::Int(_) => "int",
            ParamHandler::Float4(_) => "float4",
            ParamHandler::Float8(_) => "float8",
            ParamHandler::Numeric(_) => "numeric",
            ParamHandler::Text(_) => "text",
            ParamHandler::Bytes(_) => "bytes",
            ParamHandler::Uuid(_) => "uuid",
            ParamHandler::Json(_) => "json",
            ParamHandler::Date(_) => "date",
            ParamHandler::Timestamp(_) => "timestamp",
            ParamHandler::Array(_) => "array",
            ParamHandler::Undecided(_) => "undecided",
        }
    }

    pub fn oid(&self) -> Oid {
        match self {
            ParamHandler::Bool(h) | ParamHandler::Float4(h) | ParamHandler::Float8(h) | ParamHandler::Numeric(h) => {
                h.oid
            }
            ParamHandler::Text(h) | ParamHandler::Bytes(h) | ParamHandler::Uuid(h) | ParamHandler::Json(h) => h.oid,
            ParamHandler::Date(h) => h.oid,
            ParamHandler::Int(h) => h.oid(),
            ParamHandler::Timestamp(h) => h.oid(),
            ParamHandler::Array(h) => h.element_oid(),
            ParamHandler::Undecided(_) => oid::TEXT,
        }
    }

    pub fn array_oid(&self) -> Oid {
        match self {
            ParamHandler::Bool(h) | ParamHandler::Float4(h) | ParamHandler::Float8(h) | ParamHandler::Numeric(h) => {
                h.array_oid
            }
            ParamHandler::Text(h) | ParamHandler::Bytes(h) | ParamHandler::Uuid(h) | ParamHandler::Json(h) => {
                h.array_oid
            }
            ParamHandler::Date(h) => h.array_oid,
            ParamHandler::Int(h) => h.array_oid(),
            ParamHandler::Timestamp(h) => h.array_oid(),
            ParamHandler::Array(h) => h.array_oid(),
            ParamHandler::Undecided(_) => oid::TEXTARRAY,
        }
    }

    /// This driver always sends parameters in binary; every handler's `encode_into`
    /// output is the binary wire representation for `self.oid()`.
    pub fn wire_format(&self) -> Format {
        crate::oid::preferred_format(self.oid())
    }

    /// Resolve the settled OID/format and consume every examined row into one
    /// encoded (or NULL) payload per row, in examine order.
    pub fn finish(&mut self) -> Result<VecDeque<Option<Vec<u8>>>> {
        let payloads = match self {
            ParamHandler::Bool(h)
            | ParamHandler::Float4(h)
            | ParamHandler::Float8(h)
            | ParamHandler::Numeric(h)
            | ParamHandler::Text(h)
            | ParamHandler::Bytes(h)
            | ParamHandler::Uuid(h)
            | ParamHandler::Json(h)
            | ParamHandler::Date(h) => h.payloads.drain(..).collect(),
            ParamHandler::Int(h) => h.finish()?,
            ParamHandler::Timestamp(h) => h.payloads.drain(..).collect(),
            ParamHandler::Array(h) => h.finish()?,
            ParamHandler::Undecided(nulls) => nulls.iter().map(|()| None).collect(),
        };
        Ok(payloads)
    }
}

impl Default for ParamHandler {
    fn default() -> Self {
        Self::new()
    }
}
