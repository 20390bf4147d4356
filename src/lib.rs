//! A binary wire codec for PostgreSQL's built-in scalar and array types.
//!
//! # Features
//!
//! - **Bounds-checked decoding**: every value is read through a cursor scoped to
//!   exactly its declared bytes, and a reader that stops short is rejected
//! - **A closed type registry**: OID -> reader lookup, not a trait object per type
//! - **Two-pass parameter encoding**: scan every row of a batch before encoding
//!   any of it, so a malformed parameter never produces a partial wire write
//! - **No connection of its own**: this crate decodes bytes a libpq-style driver
//!   already fetched, and encodes bytes for one to send; see [`raw`] for the
//!   boundary traits that stand in for that driver
//!
//! # Example
//!
//! ```no_run
//! use pq_codec::{Cursor, Param};
//! # use pq_codec::raw::{EncodedParam, RawParams, RawTuples};
//! # struct Conn;
//! # struct Tuples;
//! # impl RawTuples for Tuples {
//! #     fn ntuples(&self) -> usize { 0 }
//! #     fn nfields(&self) -> usize { 0 }
//! #     fn ftype(&self, _: usize) -> u32 { 0 }
//! #     fn fformat(&self, _: usize) -> pq_codec::Format { pq_codec::Format::Binary }
//! #     fn fmod(&self, _: usize) -> i32 { -1 }
//! #     fn fsize(&self, _: usize) -> i32 { -1 }
//! #     fn fname(&self, _: usize) -> &str { "" }
//! #     fn ftable(&self, _: usize) -> u32 { 0 }
//! #     fn ftablecol(&self, _: usize) -> i32 { 0 }
//! #     fn getisnull(&self, _: usize, _: usize) -> bool { true }
//! #     fn getlength(&self, _: usize, _: usize) -> usize { 0 }
//! #     fn getvalue(&self, _: usize, _: usize) -> Option<&[u8]> { None }
//! # }
//! # impl RawParams for Conn {
//! #     type Tuples = Tuples;
//! #     fn exec_params(&mut self, _: &str, _: &[EncodedParam], _: pq_codec::Format) -> pq_codec::Result<Tuples> { Ok(Tuples) }
//! # }
//!
//! fn main() -> pq_codec::Result<()> {
//!     let mut cursor = Cursor::new(Conn);
//!     cursor.execute("SELECT $1::int4", &[Param::Int(1)])?;
//!     while let Some(row) = cursor.fetchone()? {
//!         println!("{row:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cursor;
pub mod dbapi;
pub mod error;
pub mod oid;
pub mod params;
pub mod raw;
pub mod readers;
pub mod result;
pub mod value;

pub use config::{ByteaOutput, CodecConfig};
pub use dbapi::{Cursor, ScrollMode};
pub use error::{DataError, Error, InterfaceError, ProtocolError, Result, ServerError, UsageError};
pub use oid::{Format, Oid};
pub use params::{Param, ParamHandler};
pub use raw::{EncodedParam, RawParams, RawTuples};
pub use readers::Registry;
pub use result::{ColumnDescription, ResultSet};
pub use value::Value;
