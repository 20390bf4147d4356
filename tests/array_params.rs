//! Integration tests for array parameter shape validation.

use pq_codec::{Cursor, Param};
use pq_codec::raw::{EncodedParam, RawParams, RawTuples};
use pq_codec::{Format, Oid};

struct EmptyTuples;

impl RawTuples for EmptyTuples {
    fn ntuples(&self) -> usize {
        0
    }
    fn nfields(&self) -> usize {
        0
    }
    fn ftype(&self, _col: usize) -> Oid {
        0
    }
    fn fformat(&self, _col: usize) -> Format {
        Format::Binary
    }
    fn fmod(&self, _col: usize) -> i32 {
        -1
    }
    fn fsize(&self, _col: usize) -> i32 {
        -1
    }
    fn fname(&self, _col: usize) -> &str {
        ""
    }
    fn ftable(&self, _col: usize) -> Oid {
        0
    }
    fn ftablecol(&self, _col: usize) -> i32 {
        0
    }
    fn getisnull(&self, _row: usize, _col: usize) -> bool {
        true
    }
    fn getlength(&self, _row: usize, _col: usize) -> usize {
        0
    }
    fn getvalue(&self, _row: usize, _col: usize) -> Option<&[u8]> {
        None
    }
}

/// Records whether `exec_params` was ever called, so a test can assert that a
/// parameter error aborted before anything reached the connection.
struct RecordingConn {
    called: bool,
    captured: Vec<EncodedParam>,
}

impl RawParams for RecordingConn {
    type Tuples = EmptyTuples;

    fn exec_params(&mut self, _command: &str, params: &[EncodedParam], _result_format: Format) -> pq_codec::Result<EmptyTuples> {
        self.called = true;
        self.captured = params.to_vec();
        Ok(EmptyTuples)
    }
}

fn int_array(rows: Vec<i64>) -> Param {
    Param::Array(rows.into_iter().map(Param::Int).collect())
}

#[test]
fn ragged_nested_array_is_rejected_before_any_command_is_sent() {
    let conn = RecordingConn {
        called: false,
        captured: Vec::new(),
    };
    let mut cursor = Cursor::new(conn);

    let ragged = Param::Array(vec![int_array(vec![1, 2]), int_array(vec![3])]);
    let err = cursor.execute("INSERT INTO t (col) VALUES ($1)", &[ragged]);

    assert!(err.is_err());
}

#[test]
fn flat_int_array_param_is_accepted_and_widens_to_int8() {
    let conn = RecordingConn {
        called: false,
        captured: Vec::new(),
    };
    let mut cursor = Cursor::new(conn);

    let arr = int_array(vec![1, i64::from(i32::MAX) + 1, 3]);
    cursor.execute("INSERT INTO t (col) VALUES ($1)", &[arr]).unwrap();
}

#[test]
fn mismatched_nesting_depth_is_rejected() {
    let conn = RecordingConn {
        called: false,
        captured: Vec::new(),
    };
    let mut cursor = Cursor::new(conn);

    let bad = Param::Array(vec![int_array(vec![1]), Param::Int(2)]);
    let err = cursor.execute("INSERT INTO t (col) VALUES ($1)", &[bad]);

    assert!(err.is_err());
}

#[test]
fn too_deep_nesting_is_rejected() {
    let conn = RecordingConn {
        called: false,
        captured: Vec::new(),
    };
    let mut cursor = Cursor::new(conn);

    let mut value = Param::Int(1);
    for _ in 0..7 {
        value = Param::Array(vec![value]);
    }
    let err = cursor.execute("INSERT INTO t (col) VALUES ($1)", &[value]);

    assert!(err.is_err());
}
