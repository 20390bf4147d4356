//! Error types for pq-codec.

use std::collections::HashMap;
use thiserror::Error;

use crate::oid::Oid;

/// Result type for pq-codec operations.
pub type Result<T> = core::result::Result<T, Error>;

/// PostgreSQL error field type codes.
pub mod field_type {
    pub const SEVERITY: u8 = b'S';
    pub const SEVERITY_V: u8 = b'V';
    pub const CODE: u8 = b'C';
    pub const MESSAGE: u8 = b'M';
    pub const DETAIL: u8 = b'D';
    pub const HINT: u8 = b'H';
    pub const POSITION: u8 = b'P';
    pub const INTERNAL_POSITION: u8 = b'p';
    pub const INTERNAL_QUERY: u8 = b'q';
    pub const WHERE: u8 = b'W';
    pub const SCHEMA: u8 = b's';
    pub const TABLE: u8 = b't';
    pub const COLUMN: u8 = b'c';
    pub const DATA_TYPE: u8 = b'd';
    pub const CONSTRAINT: u8 = b'n';
    pub const FILE: u8 = b'F';
    pub const LINE: u8 = b'L';
    pub const ROUTINE: u8 = b'R';
}

/// PostgreSQL server error/notice message.
#[derive(Debug, Clone)]
pub struct ServerError(pub(crate) HashMap<u8, String>);

impl ServerError {
    /// Create from a HashMap of field codes to values.
    pub fn new(fields: HashMap<u8, String>) -> Self {
        Self(fields)
    }

    /// Severity (localized): ERROR, FATAL, PANIC, WARNING, NOTICE, DEBUG, INFO, LOG
    pub fn severity(&self) -> &str {
        self.0
            .get(&field_type::SEVERITY)
            .map(|s| s.as_str())
            .unwrap_or_default()
    }

    /// Severity (non-localized, never translated)
    pub fn severity_v(&self) -> &str {
        self.0
            .get(&field_type::SEVERITY_V)
            .map(|s| s.as_str())
            .unwrap_or_default()
    }

    /// SQLSTATE error code (5 characters)
    pub fn code(&self) -> &str {
        self.0
            .get(&field_type::CODE)
            .map(|s| s.as_str())
            .unwrap_or_default()
    }

    /// Primary error message
    pub fn message(&self) -> &str {
        self.0
            .get(&field_type::MESSAGE)
            .map(|s| s.as_str())
            .unwrap_or_default()
    }

    /// Detailed error explanation
    pub fn detail(&self) -> Option<&str> {
        self.0.get(&field_type::DETAIL).map(|s| s.as_str())
    }

    /// Suggestion for fixing the error
    pub fn hint(&self) -> Option<&str> {
        self.0.get(&field_type::HINT).map(|s| s.as_str())
    }

    /// Get a field by its type code.
    pub fn get(&self, field_type: u8) -> Option<&str> {
        self.0.get(&field_type).map(|s| s.as_str())
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} (SQLSTATE {})",
            self.severity(),
            self.message(),
            self.code()
        )?;
        if let Some(detail) = self.detail() {
            write!(f, "\nDETAIL: {detail}")?;
        }
        if let Some(hint) = self.hint() {
            write!(f, "\nHINT: {hint}")?;
        }
        Ok(())
    }
}

/// Malformed wire data: the bytes claim to encode a value they don't.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("value cursor exceeded buffer bounds: need {need} bytes, {remaining} remain")]
    LengthExceeded { need: usize, remaining: usize },

    #[error("cursor left {remaining} unread bytes after decoding the value")]
    TrailingBytes { remaining: usize },

    #[error("array element oid {found} does not match expected oid {expected}")]
    UnexpectedElementOid { expected: Oid, found: Oid },

    #[error("array has {ndim} dimensions, maximum supported is 6")]
    TooManyDimensions { ndim: u32 },

    #[error("invalid array flags value {flags}")]
    InvalidArrayFlags { flags: i32 },

    #[error("invalid numeric sign {sign:#06x}")]
    InvalidNumericSign { sign: u16 },

    #[error("numeric digit {digit} is not a valid base-10000 value")]
    InvalidNumericDigit { digit: u16 },

    #[error("unsupported jsonb version byte {version}")]
    UnsupportedJsonbVersion { version: u8 },

    #[error("invalid character {0:#04x} in bit string text")]
    InvalidBitChar(u8),

    #[error("invalid is_cidr flag {0} in inet/cidr wire data")]
    InvalidIsCidrFlag(u8),

    #[error("invalid address family {0} in inet/cidr wire data")]
    InvalidAddressFamily(u8),

    #[error("malformed tid text {0:?}")]
    MalformedTid(String),

    #[error("failed to parse {kind} from text value {text:?}")]
    TextParseFailed { kind: &'static str, text: String },

    #[error("invalid octal escape digit {0:#04x} in bytea text value")]
    InvalidByteaOctalEscape(u8),

    #[error("invalid utf-8 in text value: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("hour {0} out of range for a time-of-day value")]
    HourOutOfRange(u8),

    #[error("tinterval status {status} does not match endpoint validity (dt1={dt1}, dt2={dt2})")]
    InvalidTintervalStatus { status: i32, dt1: i32, dt2: i32 },
}

/// A host-language value cannot be represented on the wire.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("decimal infinities cannot be represented by NUMERIC")]
    NumericInfinity,

    #[error("decimal exponent {0} exceeds what NUMERIC can represent")]
    NumericExponentOutOfRange(i64),

    #[error("value {0} does not fit in the target integer width")]
    IntegerOverflow(i64),

    #[error("host value does not fit in the wire type for oid {0}")]
    TypeMismatch(Oid),

    #[error("numeric weight {0} exceeds the signed 16-bit range the wire format allows")]
    NumericWeightOutOfRange(i64),

    /// `rust_decimal::Decimal` has no NaN representation; a NUMERIC NaN from the wire
    /// cannot be decoded into one.
    #[error("NUMERIC NaN has no representation in rust_decimal::Decimal")]
    NumericNaNUnsupported,

    /// The wire value needs more significant digits than `rust_decimal::Decimal`'s
    /// 96-bit mantissa (≈28-29 decimal digits) can hold.
    #[error("NUMERIC value needs {0} significant digits, which exceeds Decimal's precision")]
    NumericPrecisionExceeded(usize),
}

/// The caller used the API incorrectly.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("array elements have mixed types: expected {expected}, found {found}")]
    MixedArrayTypes { expected: Oid, found: Oid },

    #[error("array dimension {dim} has inconsistent length {found}, expected {expected}")]
    InconsistentArrayShape { dim: usize, expected: i32, found: i32 },

    #[error("array nesting depth {0} exceeds the maximum of 6")]
    ArrayTooDeep(usize),

    #[error("cannot mix naive and timezone-aware timestamps in the same array parameter")]
    MixedNaiveAndAwareTimestamps,

    #[error("scroll position out of range")]
    ScrollOutOfRange,

    #[error("operation attempted on a closed cursor")]
    CursorClosed,

    #[error("{0}")]
    Other(String),
}

/// The libpq surface: a server error response, or the connection itself being
/// unusable. Everything the codec treats as an "external collaborator" failure
/// rather than a problem with the bytes or the caller's usage.
#[derive(Debug, Error)]
pub enum InterfaceError {
    /// Server error response, surfaced across the libpq boundary.
    #[error("PostgreSQL error: {0}")]
    Server(ServerError),

    /// The connection is broken and cannot be reused.
    #[error("connection is broken")]
    ConnectionBroken,

    /// A `RawTuples`/`RawParams` implementor reported a failure with no structured
    /// server error attached (e.g. `PQexecParams` returning a null result).
    #[error("{0}")]
    CommandFailed(String),
}

/// Error type for pq-codec.
#[derive(Debug, Error)]
pub enum Error {
    /// libpq-surface error: a server error response or a broken connection.
    #[error(transparent)]
    Interface(#[from] InterfaceError),

    /// Malformed wire data.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Host value cannot be represented on the wire.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Caller misused the API.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// I/O error surfaced by the `RawTuples`/`RawParams` implementor.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if the error indicates the connection is broken and cannot be reused.
    pub fn is_connection_broken(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Interface(InterfaceError::ConnectionBroken) => true,
            Error::Interface(InterfaceError::Server(err)) => matches!(err.severity_v(), "FATAL" | "PANIC"),
            _ => false,
        }
    }

    /// Get the SQLSTATE code if this is a server error.
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            Error::Interface(InterfaceError::Server(err)) => Some(err.code()),
            _ => None,
        }
    }
}

impl From<ServerError> for Error {
    fn from(err: ServerError) -> Self {
        Error::Interface(InterfaceError::Server(err))
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}
