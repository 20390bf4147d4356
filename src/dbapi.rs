//! The DB-API `Cursor` facade: `execute`/`executemany`, the `fetch*`
//! family, `rownumber`/`rowcount`/`description`, and `scroll`. A thin layer over
//! [`RawParams`]/[`RawTuples`] plus the [`Registry`] and [`ParamHandler`]s —
//! connection lifecycle and query dispatch belong to the `RawParams` implementor,
//! not here.

use crate::config::CodecConfig;
use crate::error::{Result, UsageError};
use crate::oid::Format;
use crate::params::{Param, ParamHandler};
use crate::raw::{EncodedParam, RawParams, RawTuples};
use crate::readers::Registry;
use crate::result::{ColumnDescription, ResultSet};
use crate::value::Value;

/// Relative or absolute row repositioning, matching the DB-API `scroll` modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    Relative,
    Absolute,
}

/// One executed result set plus the fetch position into it.
///
/// `None` until `execute`/`executemany` runs; calling a `fetch*`/`scroll` method
/// before that, or after `close`, is a [`UsageError::CursorClosed`].
struct Executed<T> {
    raw: T,
    position: usize,
}

/// A DB-API-style cursor: wraps one connection-like `RawParams` implementor and
/// exposes query execution plus row fetching over the decoded [`Value`] type.
pub struct Cursor<C> {
    conn: C,
    registry: Registry,
    config: CodecConfig,
    current: Option<Executed<<C as RawParams>::Tuples>>,
    closed: bool,
}

impl<C: RawParams> Cursor<C> {
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            registry: Registry::new(),
            config: CodecConfig::default(),
            current: None,
            closed: false,
        }
    }

    pub fn with_config(conn: C, config: CodecConfig) -> Self {
        Self {
            conn,
            registry: Registry::new(),
            config,
            current: None,
            closed: false,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Execute `command` once with one row of parameters.
    pub fn execute(&mut self, command: &str, params: &[Param]) -> Result<()> {
        let row = [params.to_vec()];
        self.execute_rows(command, &row)
    }

    /// Execute `command` once per row of `param_rows`, each row bound in order.
    /// Every row is examined before any of them is encoded, so a parameter-shape
    /// error anywhere in the batch aborts before the first row is ever sent.
    pub fn executemany(&mut self, command: &str, param_rows: &[Vec<Param>]) -> Result<()> {
        self.execute_rows(command, param_rows)
    }

    fn execute_rows(&mut self, command: &str, param_rows: &[Vec<Param>]) -> Result<()> {
        self.require_open()?;
        let ncols = param_rows.first().map_or(0, Vec::len);
        for row in param_rows {
            if row.len() != ncols {
                return Err(UsageError::Other("parameter rows must all have the same length".into()).into());
            }
        }

        let mut handlers: Vec<ParamHandler> = (0..ncols).map(|_| ParamHandler::new()).collect();
        for row in param_rows {
            for (handler, val) in handlers.iter_mut().zip(row) {
                handler.examine(val)?;
            }
        }

        let mut encoded_columns = Vec::with_capacity(ncols);
        for mut handler in handlers {
            let oid = handler.oid();
            let format = handler.wire_format();
            let payloads = handler.finish()?;
            encoded_columns.push((oid, format, payloads));
        }

        let mut last = None;
        for _ in 0..param_rows.len().max(1) {
            let mut params = Vec::with_capacity(ncols);
            for (oid, format, payloads) in &mut encoded_columns {
                let value = payloads.pop_front().flatten();
                params.push(EncodedParam {
                    oid: *oid,
                    format: *format,
                    value,
                });
            }
            last = Some(self.conn.exec_params(command, &params, Format::Binary)?);
        }

        if let Some(raw) = last {
            self.current = Some(Executed { raw, position: 0 });
        }
        Ok(())
    }

    fn require_open(&self) -> Result<()> {
        if self.closed {
            return Err(UsageError::CursorClosed.into());
        }
        Ok(())
    }

    fn require_executed(&self) -> Result<&Executed<<C as RawParams>::Tuples>> {
        self.require_open()?;
        self.current.as_ref().ok_or_else(|| UsageError::CursorClosed.into())
    }

    /// Column metadata for the most recent result, DB-API `description` shape.
    pub fn description(&self) -> Result<Vec<ColumnDescription>> {
        let executed = self.require_executed()?;
        let rs = ResultSet::new(&executed.raw, &self.registry);
        Ok(rs.description())
    }

    /// Number of rows produced by the most recent `execute`/`executemany`.
    pub fn rowcount(&self) -> Result<usize> {
        Ok(self.require_executed()?.raw.ntuples())
    }

    /// Zero-based index of the next row `fetchone` will return.
    pub fn rownumber(&self) -> Result<usize> {
        Ok(self.require_executed()?.position)
    }

    /// Fetch and decode one row, advancing the position. `None` once exhausted.
    pub fn fetchone(&mut self) -> Result<Option<Vec<Option<Value>>>> {
        self.require_open()?;
        let Some(executed) = self.current.as_mut() else {
            return Err(UsageError::CursorClosed.into());
        };
        if executed.position >= executed.raw.ntuples() {
            return Ok(None);
        }
        let row = decode_row(&executed.raw, &self.registry, executed.position)?;
        executed.position += 1;
        Ok(Some(row))
    }

    /// Fetch up to `size` rows (default batch semantics left to the caller).
    pub fn fetchmany(&mut self, size: usize) -> Result<Vec<Vec<Option<Value>>>> {
        let mut out = Vec::with_capacity(size);
        for _ in 0..size {
            match self.fetchone()? {
                Some(row) => out.push(row),
                None => break,
            }
        }
        Ok(out)
    }

    /// Fetch every remaining row.
    pub fn fetchall(&mut self) -> Result<Vec<Vec<Option<Value>>>> {
        let mut out = Vec::new();
        while let Some(row) = self.fetchone()? {
            out.push(row);
        }
        Ok(out)
    }

    /// Reposition the fetch cursor, relative to the current position or absolute
    /// from the start. Out-of-range targets are a [`UsageError::ScrollOutOfRange`]
    /// and leave the position unchanged.
    pub fn scroll(&mut self, value: i64, mode: ScrollMode) -> Result<()> {
        self.require_open()?;
        let Some(executed) = self.current.as_mut() else {
            return Err(UsageError::CursorClosed.into());
        };
        let target = match mode {
            ScrollMode::Relative => executed.position as i64 + value,
            ScrollMode::Absolute => value,
        };
        if target < 0 || target as usize > executed.raw.ntuples() {
            return Err(UsageError::ScrollOutOfRange.into());
        }
        executed.position = target as usize;
        Ok(())
    }

    /// Release the current result set; subsequent `fetch*`/`scroll` calls fail
    /// until the next `execute`/`executemany`.
    pub fn close(&mut self) {
        self.closed = true;
        self.current = None;
    }
}

fn decode_row<T: RawTuples>(raw: &T, registry: &Registry, row: usize) -> Result<Vec<Option<Value>>> {
    let rs = ResultSet::new(raw, registry);
    (0..rs.nfields()).map(|col| rs.getvalue(row, col)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::oid;

    struct FakeTuples {
        rows: Vec<Vec<Option<Vec<u8>>>>,
    }

    impl RawTuples for FakeTuples {
        fn ntuples(&self) -> usize {
            self.rows.len()
        }
        fn nfields(&self) -> usize {
            self.rows.first().map_or(0, Vec::len)
        }
        fn ftype(&self, _col: usize) -> crate::oid::Oid {
            oid::INT4
        }
        fn fformat(&self, _col: usize) -> Format {
            Format::Binary
        }
        fn fmod(&self, _col: usize) -> i32 {
            -1
        }
        fn fsize(&self, _col: usize) -> i32 {
            4
        }
        fn fname(&self, col: usize) -> &str {
            match col {
                0 => "a",
                _ => "b",
            }
        }
        fn ftable(&self, _col: usize) -> crate::oid::Oid {
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

    struct FakeConn {
        result: Vec<Vec<Option<Vec<u8>>>>,
        last_command: Option<String>,
        last_params: Vec<EncodedParam>,
    }

    impl RawParams for FakeConn {
        type Tuples = FakeTuples;

        fn exec_params(&mut self, command: &str, params: &[EncodedParam], _result_format: Format) -> Result<FakeTuples> {
            self.last_command = Some(command.to_string());
            self.last_params = params.to_vec();
            Ok(FakeTuples {
                rows: self.result.clone(),
            })
        }
    }

    fn one_col_rows(vals: &[i32]) -> Vec<Vec<Option<Vec<u8>>>> {
        vals.iter().map(|v| vec![Some(v.to_be_bytes().to_vec())]).collect()
    }

    #[test]
    fn fetchone_decodes_rows_in_order() {
        let conn = FakeConn {
            result: one_col_rows(&[1, 2, 3]),
            last_command: None,
            last_params: Vec::new(),
        };
        let mut cursor = Cursor::new(conn);
        cursor.execute("select a from t", &[]).unwrap();
        assert_eq!(cursor.fetchone().unwrap(), Some(vec![Some(Value::Int4(1))]));
        assert_eq!(cursor.fetchone().unwrap(), Some(vec![Some(Value::Int4(2))]));
        assert_eq!(cursor.rownumber().unwrap(), 2);
    }

    #[test]
    fn fetchall_exhausts_the_result() {
        let conn = FakeConn {
            result: one_col_rows(&[1, 2, 3]),
            last_command: None,
            last_params: Vec::new(),
        };
        let mut cursor = Cursor::new(conn);
        cursor.execute("select a from t", &[]).unwrap();
        let rows = cursor.fetchall().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(cursor.fetchone().unwrap(), None);
    }

    #[test]
    fn scroll_absolute_repositions() {
        let conn = FakeConn {
            result: one_col_rows(&[1, 2, 3]),
            last_command: None,
            last_params: Vec::new(),
        };
        let mut cursor = Cursor::new(conn);
        cursor.execute("select a from t", &[]).unwrap();
        cursor.scroll(2, ScrollMode::Absolute).unwrap();
        assert_eq!(cursor.fetchone().unwrap(), Some(vec![Some(Value::Int4(3))]));
    }

    #[test]
    fn scroll_out_of_range_errors_and_keeps_position() {
        let conn = FakeConn {
            result: one_col_rows(&[1, 2]),
            last_command: None,
            last_params: Vec::new(),
        };
        let mut cursor = Cursor::new(conn);
        cursor.execute("select a from t", &[]).unwrap();
        assert!(cursor.scroll(10, ScrollMode::Absolute).is_err());
        assert_eq!(cursor.rownumber().unwrap(), 0);
    }

    #[test]
    fn fetch_before_execute_is_a_usage_error() {
        let conn = FakeConn {
            result: Vec::new(),
            last_command: None,
            last_params: Vec::new(),
        };
        let mut cursor = Cursor::new(conn);
        assert!(cursor.fetchone().is_err());
    }

    #[test]
    fn executemany_sends_one_command_per_row() {
        let conn = FakeConn {
            result: one_col_rows(&[1]),
            last_command: None,
            last_params: Vec::new(),
        };
        let mut cursor = Cursor::new(conn);
        cursor
            .executemany("insert into t values ($1)", &[vec![Param::Int(1)], vec![Param::Int(2)]])
            .unwrap();
        assert_eq!(cursor.conn.last_params.len(), 1);
    }

    #[test]
    fn closed_cursor_rejects_execute() {
        let conn = FakeConn {
            result: Vec::new(),
            last_command: None,
            last_params: Vec::new(),
        };
        let mut cursor = Cursor::new(conn);
        cursor.close();
        assert!(cursor.execute("select 1", &[]).is_err());
    }
}
