//! Array parameter handler: shape validation plus an inner scalar handler for
//! the leaf elements.
//!
//! One `ArrayHandler` is created per bound array parameter and fed one nested
//! `Param::Array`/`Param::Null` per row of a (possibly batched) execution via
//! [`ArrayHandler::examine`]/[`ArrayHandler::examine_null`]. Shape (sibling-length
//! equality, uniform leaf depth, <= 6 dimensions) is validated up front, before a
//! single byte of the row is queued, so a malformed shape never produces a partial
//! wire write. Leaf values are threaded through a plain [`ParamHandler`] exactly as
//! if they were their own top-level parameter, so int widening / NULL handling are
//! shared rather than re-implemented here; `finish` re-groups that handler's
//! per-leaf payloads back into one array-wire-format buffer per row.

use std::collections::VecDeque;

use super::{Param, ParamHandler};
use crate::error::{Result, UsageError};
use crate::oid::{oid, Oid};

const MAX_DIMENSIONS: usize = 6;

/// The shape recorded for one row's array value, kept until `finish` can drain
/// the matching leaf payloads back out of `inner`.
struct RowFrame {
    dims: Vec<i32>,
    has_nulls: bool,
    /// Number of leaf slots (including NULLs) this row contributed to `inner`, in
    /// the order they were queued.
    leaf_count: usize,
}

#[derive(Default)]
pub struct ArrayHandler {
    inner: Option<Box<ParamHandler>>,
    rows: Vec<Option<RowFrame>>,
}

impl ArrayHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The whole parameter is NULL for this row (not an empty array).
    pub fn examine_null(&mut self) -> Result<()> {
        self.rows.push(None);
        Ok(())
    }

    /// Feed one row's array value, already split into its immediate children
    /// (which may themselves be `Param::Array` for a deeper dimension).
    pub fn examine(&mut self, items: &[Param]) -> Result<()> {
        let mut dims = Vec::new();
        let mut has_nulls = false;
        let mut leaf_count = 0usize;
        self.walk(items, 0, &mut dims, &mut has_nulls, &mut leaf_count)?;
        self.rows.push(Some(RowFrame {
            dims,
            has_nulls,
            leaf_count,
        }));
        Ok(())
    }

    /// Recursively validate shape and queue leaf values into `inner`.
    ///
    /// `is_nested` (whether siblings at this depth are themselves lists) is fixed
    /// by the first element at each depth; any sibling that disagrees is an
    /// "invalid nesting" error before anything is queued for this row.
    fn walk(
        &mut self,
        items: &[Param],
        depth: usize,
        dims: &mut Vec<i32>,
        has_nulls: &mut bool,
        leaf_count: &mut usize,
    ) -> Result<()> {
        if depth >= MAX_DIMENSIONS {
            return Err(UsageError::ArrayTooDeep(depth + 1).into());
        }
        match dims.get(depth) {
            Some(&expected) if expected != items.len() as i32 => {
                return Err(UsageError::InconsistentArrayShape {
                    dim: depth,
                    expected,
                    found: items.len() as i32,
                }
                .into());
            }
            Some(_) => {}
            None => dims.push(items.len() as i32),
        }

        let is_nested = items.iter().find_map(|p| match p {
            Param::Array(_) => Some(true),
            Param::Null => None,
            _ => Some(false),
        });

        for item in items {
            match item {
                Param::Array(children) => {
                    if is_nested == Some(false) {
                        return Err(UsageError::Other(
                            "array parameter has a nested list at a leaf depth".into(),
                        )
                        .into());
                    }
                    self.walk(children, depth + 1, dims, has_nulls, leaf_count)?;
                }
                other => {
                    if is_nested == Some(true) {
                        return Err(UsageError::Other(
                            "array parameter has a non-list value at a non-leaf depth".into(),
                        )
                        .into());
                    }
                    if matches!(other, Param::Null) {
                        *has_nulls = true;
                    }
                    self.inner.get_or_insert_with(|| Box::new(ParamHandler::new())).examine(other)?;
                    *leaf_count += 1;
                }
            }
        }
        Ok(())
    }

    /// The OID of the leaf element type, resolved from whatever the inner handler
    /// settled on. Defaults to `TEXT` if no row ever contained a non-NULL leaf
    /// (matching the empty-array convention used below).
    fn scalar_oid(&self) -> Oid {
        self.inner.as_deref().map_or(oid::TEXT, ParamHandler::oid)
    }

    /// The OID of the array type itself, i.e. what this parameter's slot is sent
    /// to libpq as.
    pub fn array_oid(&self) -> Oid {
        self.inner.as_deref().map_or(oid::TEXTARRAY, ParamHandler::array_oid)
    }

    /// Alias kept for `ParamHandler::array_oid`'s dispatch: an `ArrayHandler` can
    /// never itself be nested as the leaf of an outer array (the leaf walk in
    /// `walk` never hands a `Param::Array` to `inner`), so this agrees with
    /// `array_oid`.
    pub fn element_oid(&self) -> Oid {
        self.array_oid()
    }

    /// Resolve the settled element OID and drain every examined row into one
    /// encoded array-wire-format payload (or `None` for a NULL row).
    pub fn finish(&mut self) -> Result<VecDeque<Option<Vec<u8>>>> {
        let elem_oid = self.scalar_oid();
        let mut leaves: VecDeque<Option<Vec<u8>>> = match &mut self.inner {
            Some(inner) => inner.finish()?,
            None => VecDeque::new(),
        };

        let mut out = VecDeque::with_capacity(self.rows.len());
        for row in self.rows.drain(..) {
            let Some(frame) = row else {
                out.push_back(None);
                continue;
            };
            let mut buf = Vec::new();
            let total: i64 = frame.dims.iter().map(|&d| i64::from(d.max(0))).product();
            if total == 0 && frame.dims.len() <= 1 {
                buf.extend_from_slice(&0u32.to_be_bytes());
                buf.extend_from_slice(&0i32.to_be_bytes());
                buf.extend_from_slice(&elem_oid.to_be_bytes());
            } else {
                buf.extend_from_slice(&(frame.dims.len() as u32).to_be_bytes());
                buf.extend_from_slice(&i32::from(frame.has_nulls).to_be_bytes());
                buf.extend_from_slice(&elem_oid.to_be_bytes());
                for &len in &frame.dims {
                    buf.extend_from_slice(&len.to_be_bytes());
                    buf.extend_from_slice(&1i32.to_be_bytes());
                }
                for _ in 0..frame.leaf_count {
                    match leaves.pop_front().unwrap_or(None) {
                        None => buf.extend_from_slice(&(-1i32).to_be_bytes()),
                        Some(bytes) => {
                            buf.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
                            buf.extend_from_slice(&bytes);
                        }
                    }
                }
            }
            out.push_back(Some(buf));
        }
        Ok(out)
    }
}
