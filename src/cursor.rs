//! Bounds-checked sequential reader over a borrowed byte region.
//!
//! Every value-level reader is handed one of these over exactly the bytes PostgreSQL
//! declared for that value; the cursor's `at_end` invariant is checked by the caller
//! after each value decodes, which is what catches a reader that silently stops short.

use crate::error::{ProtocolError, Result};

/// A cursor over a borrowed byte slice with a running offset.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    data: &'a [u8],
    idx: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, idx: 0 }
    }

    /// Bytes remaining between the current offset and the end of the region.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.idx
    }

    /// True once every byte of the region has been consumed.
    pub fn at_end(&self) -> bool {
        self.idx == self.data.len()
    }

    fn require(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(ProtocolError::LengthExceeded {
                need: n,
                remaining: self.remaining(),
            }
            .into());
        }
        Ok(())
    }

    /// Advance by `n` bytes, returning the offset the cursor was at before advancing.
    pub fn advance(&mut self, n: usize) -> Result<usize> {
        self.require(n)?;
        let start = self.idx;
        self.idx += n;
        Ok(start)
    }

    /// Advance to the end of the region, returning a view of every remaining byte.
    pub fn advance_to_end(&mut self) -> &'a [u8] {
        let view = &self.data[self.idx..];
        self.idx = self.data.len();
        view
    }

    /// Borrow the next `n` bytes without advancing.
    pub fn peek_view(&self, n: usize) -> Result<&'a [u8]> {
        self.require(n)?;
        Ok(&self.data[self.idx..self.idx + n])
    }

    /// Advance past the next `n` bytes, returning a borrowed view of them.
    pub fn advance_view(&mut self, n: usize) -> Result<&'a [u8]> {
        let start = self.advance(n)?;
        Ok(&self.data[start..start + n])
    }

    /// Advance past the next `n` bytes, interpreting them as raw bytes.
    pub fn advance_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.advance_view(n)
    }

    /// Advance past the next `n` bytes, interpreting them as UTF-8 text.
    pub fn advance_text(&mut self, n: usize) -> Result<&'a str> {
        let bytes = self.advance_view(n)?;
        Ok(simdutf8::basic::from_utf8(bytes).map_err(|_| {
            // simdutf8's basic API does not report a position; re-validate with
            // std to surface a precise error.
            std::str::from_utf8(bytes).unwrap_err()
        })?)
    }

    /// Read a big-endian `u8`.
    pub fn advance_u8(&mut self) -> Result<u8> {
        let start = self.advance(1)?;
        Ok(self.data[start])
    }

    /// Read a big-endian `i16`.
    pub fn advance_i16(&mut self) -> Result<i16> {
        let bytes = self.advance_view(2)?;
        Ok(i16::from_be_bytes(bytes.try_into().unwrap_or_else(|_| unreachable!())))
    }

    /// Read a big-endian `u16`.
    pub fn advance_u16(&mut self) -> Result<u16> {
        let bytes = self.advance_view(2)?;
        Ok(u16::from_be_bytes(bytes.try_into().unwrap_or_else(|_| unreachable!())))
    }

    /// Read a big-endian `i32`.
    pub fn advance_i32(&mut self) -> Result<i32> {
        let bytes = self.advance_view(4)?;
        Ok(i32::from_be_bytes(bytes.try_into().unwrap_or_else(|_| unreachable!())))
    }

    /// Read a big-endian `u32`.
    pub fn advance_u32(&mut self) -> Result<u32> {
        let bytes = self.advance_view(4)?;
        Ok(u32::from_be_bytes(bytes.try_into().unwrap_or_else(|_| unreachable!())))
    }

    /// Read a big-endian `i64`.
    pub fn advance_i64(&mut self) -> Result<i64> {
        let bytes = self.advance_view(8)?;
        Ok(i64::from_be_bytes(bytes.try_into().unwrap_or_else(|_| unreachable!())))
    }

    /// Read a big-endian `u64`.
    pub fn advance_u64(&mut self) -> Result<u64> {
        let bytes = self.advance_view(8)?;
        Ok(u64::from_be_bytes(bytes.try_into().unwrap_or_else(|_| unreachable!())))
    }

    /// Read a big-endian IEEE-754 `f32`.
    pub fn advance_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.advance_u32()?))
    }

    /// Read a big-endian IEEE-754 `f64`.
    pub fn advance_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.advance_u64()?))
    }

    /// Create a sub-cursor over the next `n` bytes, borrowing from the same slice.
    pub fn sub_cursor(&mut self, n: usize) -> Result<Cursor<'a>> {
        Ok(Cursor::new(self.advance_view(n)?))
    }

    /// Advance past `size_of::<T>()` bytes, decoding them as a fixed-layout,
    /// big-endian wire struct. `T` is expected to be built from
    /// `zerocopy::byteorder::big_endian` field types, so the byte-level layout is
    /// exactly the struct's wire representation with no further conversion needed.
    pub fn advance_struct<T>(&mut self) -> Result<T>
    where
        T: zerocopy::FromBytes + zerocopy::KnownLayout + zerocopy::Immutable,
    {
        let bytes = self.advance_view(core::mem::size_of::<T>())?;
        Ok(T::read_from_bytes(bytes).unwrap_or_else(|_| unreachable!()))
    }

    /// Consume a sub-cursor and require it to be fully read, surfacing a protocol error
    /// otherwise. Every scalar reader that creates a sub-cursor should finish with this.
    pub fn finish(cur: Cursor<'a>) -> Result<()> {
        if !cur.at_end() {
            return Err(ProtocolError::TrailingBytes {
                remaining: cur.remaining(),
            }
            .into());
        }
        Ok(())
    }
}
