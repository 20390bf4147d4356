//! Integration tests for fetching and decoding result rows through the `Cursor`
//! DB-API facade, over a fake `RawParams`/`RawTuples` connection.

use pq_codec::oid::{self, Oid};
use pq_codec::raw::{EncodedParam, RawParams, RawTuples};
use pq_codec::{Cursor, Format, ScrollMode, Value};

struct FixtureTuples {
    col_oids: Vec<Oid>,
    col_fmods: Vec<i32>,
    rows: Vec<Vec<Option<Vec<u8>>>>,
}

impl RawTuples for FixtureTuples {
    fn ntuples(&self) -> usize {
        self.rows.len()
    }
    fn nfields(&self) -> usize {
        self.col_oids.len()
    }
    fn ftype(&self, col: usize) -> Oid {
        self.col_oids[col]
    }
    fn fformat(&self, _col: usize) -> Format {
        Format::Binary
    }
    fn fmod(&self, col: usize) -> i32 {
        self.col_fmods[col]
    }
    fn fsize(&self, _col: usize) -> i32 {
        -1
    }
    fn fname(&self, col: usize) -> &str {
        match col {
            0 => "id",
            1 => "amount",
            _ => "extra",
        }
    }
    fn ftable(&self, _col: usize) -> Oid {
        0
    }
    fn ftablecol(&self, _col: usize) -> i32 {
        0
    }
    fn getisnull(&self, row: usize, col: usize) -> bool {
        self.rows[row][col].is_none()
    }
    fn getlength(&self, row: usize, col: usize) -> usize {
        self.rows[row][col].as_ref().map_or(0, Vec::len)
    }
    fn getvalue(&self, row: usize, col: usize) -> Option<&[u8]> {
        self.rows[row][col].as_deref()
    }
}

struct FixtureConn {
    tuples: Option<FixtureTuples>,
}

impl RawParams for FixtureConn {
    type Tuples = FixtureTuples;

    fn exec_params(&mut self, _command: &str, _params: &[EncodedParam], _result_format: Format) -> pq_codec::Result<FixtureTuples> {
        Ok(self.tuples.take().expect("fixture exhausted"))
    }
}

fn be(v: i32) -> Vec<u8> {
    v.to_be_bytes().to_vec()
}

#[test]
fn fetchall_decodes_every_row_and_preserves_nulls() {
    let conn = FixtureConn {
        tuples: Some(FixtureTuples {
            col_oids: vec![oid::oid::INT4, oid::oid::INT4],
            col_fmods: vec![-1, -1],
            rows: vec![
                vec![Some(be(1)), Some(be(100))],
                vec![Some(be(2)), None],
            ],
        }),
    };
    let mut cursor = Cursor::new(conn);
    cursor.execute("SELECT id, amount FROM t", &[]).unwrap();

    let rows = cursor.fetchall().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], vec![Some(Value::Int4(1)), Some(Value::Int4(100))]);
    assert_eq!(rows[1], vec![Some(Value::Int4(2)), None]);
}

#[test]
fn description_reports_numeric_precision_and_scale_from_fmod() {
    let conn = FixtureConn {
        tuples: Some(FixtureTuples {
            col_oids: vec![oid::oid::NUMERIC],
            col_fmods: vec![4 + (8 << 16) + 3],
            rows: vec![],
        }),
    };
    let mut cursor = Cursor::new(conn);
    cursor.execute("SELECT amount FROM t", &[]).unwrap();

    let desc = cursor.description().unwrap();
    assert_eq!(desc[0].name, "id");
    assert_eq!(desc[0].precision, Some(8));
    assert_eq!(desc[0].scale, Some(3));
}

#[test]
fn scroll_relative_then_fetchone_returns_the_right_row() {
    let conn = FixtureConn {
        tuples: Some(FixtureTuples {
            col_oids: vec![oid::oid::INT4],
            col_fmods: vec![-1],
            rows: vec![vec![Some(be(10))], vec![Some(be(20))], vec![Some(be(30))]],
        }),
    };
    let mut cursor = Cursor::new(conn);
    cursor.execute("SELECT id FROM t", &[]).unwrap();

    cursor.fetchone().unwrap();
    cursor.scroll(1, ScrollMode::Relative).unwrap();
    let row = cursor.fetchone().unwrap().unwrap();
    assert_eq!(row, vec![Some(Value::Int4(30))]);
}

#[test]
fn fetch_after_close_is_rejected() {
    let conn = FixtureConn {
        tuples: Some(FixtureTuples {
            col_oids: vec![oid::oid::INT4],
            col_fmods: vec![-1],
            rows: vec![vec![Some(be(1))]],
        }),
    };
    let mut cursor = Cursor::new(conn);
    cursor.execute("SELECT id FROM t", &[]).unwrap();
    cursor.close();
    assert!(cursor.fetchone().is_err());
}
