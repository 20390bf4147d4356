//! The host-language value representation produced by scalar and array readers.

use std::net::IpAddr;

use crate::oid::Oid;

/// A decoded DATE value. PostgreSQL dates outside the range a host `NaiveDate` can
/// represent (the Julian day arithmetic goes back to 4713 BC and forward past
/// `NaiveDate::MAX`) are kept as PostgreSQL's own textual rendering instead of
/// failing the read.
#[derive(Debug, Clone, PartialEq)]
pub enum DateValue {
    Native(chrono::NaiveDate),
    OutOfRange(String),
    Infinity,
    NegInfinity,
}

/// A decoded TIMESTAMP or TIMESTAMPTZ value, with the same out-of-range and
/// infinity fallbacks as `DateValue`.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampValue {
    Native(chrono::NaiveDateTime),
    OutOfRange(String),
    Infinity,
    NegInfinity,
}

/// A decoded INET/CIDR address: a network address plus a prefix (mask) length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpNetworkValue {
    pub address: IpAddr,
    pub prefix_len: u8,
    /// True for CIDR (where only the network address itself is legal), false for INET
    /// (where a host address with a netmask is legal).
    pub is_cidr: bool,
}

/// A single 2-D point, shared by several geometric types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub p1: Point,
    pub p2: Point,
}

/// `Ax + By + C = 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box2 {
    pub high: Point,
    pub low: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub closed: bool,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

/// A decoded multi-dimensional array, stored flattened in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    pub element_oid: Oid,
    /// One entry per dimension; `dims.len()` is the array's rank (0..=6).
    pub dims: Vec<i32>,
    /// PostgreSQL's per-dimension lower bound, usually 1.
    pub lower_bounds: Vec<i32>,
    pub elements: Vec<Option<Value>>,
}

/// The decoded form of any value PostgreSQL can hand back to a client.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float4(f32),
    Float8(f64),
    Numeric(rust_decimal::Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    Json(serde_json::Value),
    Date(DateValue),
    Time(chrono::NaiveTime),
    TimeTz {
        time: chrono::NaiveTime,
        /// Offset east of UTC, in seconds (already corrected for the wire's
        /// inverted POSIX sign convention).
        offset_seconds: i32,
    },
    Timestamp(TimestampValue),
    TimestampTz(TimestampValue),
    Interval {
        months: i32,
        days: i32,
        microseconds: i64,
    },
    Money(i64),
    MacAddr([u8; 6]),
    MacAddr8([u8; 8]),
    Inet(IpNetworkValue),
    Cidr(IpNetworkValue),
    Point(Point),
    Line(Line),
    LineSegment(LineSegment),
    Box(Box2),
    Path(Path),
    Polygon(Polygon),
    Circle(Circle),
    /// An arbitrary-length bit string, stored as an unbounded unsigned integer
    /// together with its declared bit length (leading zero bits are significant).
    Bit {
        bits: num_bigint::BigUint,
        len: u32,
    },
    Tid {
        block: u32,
        offset: u16,
    },
    /// The legacy `tinterval` type: a pair of `abstime` endpoints plus a validity
    /// flag the server computes from them (`valid` iff neither endpoint is the
    /// `INVALID_ABSTIME` sentinel).
    TInterval {
        valid: bool,
        first: TimestampValue,
        second: TimestampValue,
    },
    Array(ArrayValue),
}
