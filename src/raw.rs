//! The FFI boundary the codec engine is built against.
//!
//! `RawTuples`/`RawParams` stand in for a libpq result handle and a
//! `PQexecParams`-style call site: plain, synchronous, borrow-based traits with no
//! I/O of their own. A real libpq binding implements them over `PGresult`/
//! `PQexecParams`; tests implement them over plain `Vec<u8>` buffers. Connection
//! lifecycle, the socket, and query dispatch are out of scope for this crate —
//! these traits are exactly the interface the codec consumes from and exposes to
//! that external collaborator.

use crate::error::Result;
use crate::oid::{Format, Oid};

/// A decoded or raw PostgreSQL result set, as the codec needs to see it.
///
/// Implementations own the lifetime of the raw value pointers libpq handed back;
/// `getvalue` borrows for exactly the call, valid only until the enclosing result
/// is cleared.
pub trait RawTuples {
    /// Number of result rows.
    fn ntuples(&self) -> usize;
    /// Number of result columns.
    fn nfields(&self) -> usize;
    /// The OID PostgreSQL reports for a column.
    fn ftype(&self, col: usize) -> Oid;
    /// The wire format (text/binary) PostgreSQL used to send a column.
    fn fformat(&self, col: usize) -> Format;
    /// Type modifier (e.g. NUMERIC's encoded `(precision, scale)`).
    fn fmod(&self, col: usize) -> i32;
    /// Declared on-wire size, or a negative sentinel for variable-length types.
    fn fsize(&self, col: usize) -> i32;
    /// Column name as reported by the server.
    fn fname(&self, col: usize) -> &str;
    /// Source table OID, or 0 if the column isn't a direct table reference.
    fn ftable(&self, col: usize) -> Oid;
    /// Source table column number, or 0 if `ftable` is 0.
    fn ftablecol(&self, col: usize) -> i32;
    /// True if the cell is SQL NULL.
    fn getisnull(&self, row: usize, col: usize) -> bool;
    /// Length of the raw cell value in bytes (0 for NULL).
    fn getlength(&self, row: usize, col: usize) -> usize;
    /// Borrow the raw bytes of a non-NULL cell.
    fn getvalue(&self, row: usize, col: usize) -> Option<&[u8]>;
}

/// One bound parameter, already encoded for submission: the OID PostgreSQL should
/// interpret the bytes as, the wire format, and the payload (`None` for SQL NULL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedParam {
    pub oid: Oid,
    pub format: Format,
    pub value: Option<Vec<u8>>,
}

/// Stands in for the libpq `PQexecParams`-style call: submit a command plus its
/// already-encoded parameters and get back a `RawTuples` result (or a server
/// error).
pub trait RawParams {
    type Tuples: RawTuples;

    /// Execute `command` with `params` bound in order, requesting `result_format`
    /// for every result column.
    fn exec_params(&mut self, command: &str, params: &[EncodedParam], result_format: Format) -> Result<Self::Tuples>;
}
