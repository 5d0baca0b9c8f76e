//! Reading and in-place overwriting of byte buffers
//!

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{CursorError, Result};

/// A positioned view over a byte buffer
///
/// Reads are available for any `T: AsRef<[u8]>`. When the buffer is also `AsMut<[u8]>` the
/// cursor can overwrite existing bytes, but it will never make the buffer longer.
#[derive(Debug, Clone)]
pub struct ByteCursor<T> {
    inner: T,
    pos: usize,
}

impl<T: AsRef<[u8]>> ByteCursor<T> {
    /// Create a cursor positioned at the start of `inner`.
    pub fn new(inner: T) -> Self {
        Self { inner, pos: 0 }
    }

    /// Current offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying buffer
    pub fn len(&self) -> usize {
        self.inner.as_ref().len()
    }

    /// Whether the underlying buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes between the current position and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.pos)
    }

    /// Move to an absolute offset. Seeking to exactly the end is allowed.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.len() {
            return Err(CursorError::OutOfBounds {
                offset,
                requested: 0,
                len: self.len(),
            });
        }
        self.pos = offset;
        Ok(())
    }

    /// Advance the position by `count` bytes without reading them.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    fn check(&self, offset: usize, requested: usize) -> Result<std::ops::Range<usize>> {
        let len = self.len();
        match offset.checked_add(requested) {
            Some(end) if end <= len => Ok(offset..end),
            _ => Err(CursorError::OutOfBounds {
                offset,
                requested,
                len,
            }),
        }
    }

    fn take(&mut self, count: usize) -> Result<&[u8]> {
        let range = self.check(self.pos, count)?;
        self.pos = range.end;
        Ok(&self.inner.as_ref()[range])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.take(2).map(LittleEndian::read_u16)
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.take(4).map(LittleEndian::read_u32)
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        self.take(8).map(LittleEndian::read_u64)
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        self.take(4).map(LittleEndian::read_i32)
    }

    pub fn read_f32_le(&mut self) -> Result<f32> {
        self.take(4).map(LittleEndian::read_f32)
    }

    /// Read exactly `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<&[u8]> {
        self.take(count)
    }

    /// Read a fixed size array, such as a 16 byte identifier.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read bytes up to the next zero byte and decode them as UTF-8.
    ///
    /// The terminator is consumed but not returned.
    pub fn read_nul_terminated_str(&mut self) -> Result<&str> {
        let start = self.pos;
        let rest = &self.inner.as_ref()[start..];
        let Some(end) = rest.iter().position(|b| *b == 0) else {
            return Err(CursorError::Unterminated { offset: start });
        };
        self.pos = start + end + 1;
        std::str::from_utf8(&self.inner.as_ref()[start..start + end])
            .map_err(|source| CursorError::InvalidUtf8 {
                offset: start,
                source,
            })
    }

    /// Read a `u16` length followed by that many bytes.
    pub fn read_u16_prefixed_bytes(&mut self) -> Result<&[u8]> {
        let start = self.pos;
        let count = self.read_u16_le()? as usize;
        if let Err(err) = self.check(self.pos, count) {
            self.pos = start;
            return Err(err);
        }
        self.take(count)
    }

    /// Read a `u32` length followed by that many bytes.
    pub fn read_u32_prefixed_bytes(&mut self) -> Result<&[u8]> {
        let start = self.pos;
        let count = self.read_u32_le()? as usize;
        if let Err(err) = self.check(self.pos, count) {
            self.pos = start;
            return Err(err);
        }
        self.take(count)
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> ByteCursor<T> {
    fn take_mut(&mut self, count: usize) -> Result<&mut [u8]> {
        let range = self.check(self.pos, count)?;
        self.pos = range.end;
        Ok(&mut self.inner.as_mut()[range])
    }

    /// Overwrite bytes at the current position.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.take_mut(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// Overwrite bytes at an absolute offset without moving the cursor.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let range = self.check(offset, bytes.len())?;
        self.inner.as_mut()[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Fill `count` bytes starting at the current position with `value`.
    pub fn fill(&mut self, value: u8, count: usize) -> Result<()> {
        self.take_mut(count)?.fill(value);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    pub fn write_u16_le(&mut self, value: u16) -> Result<()> {
        LittleEndian::write_u16(self.take_mut(2)?, value);
        Ok(())
    }

    pub fn write_u32_le(&mut self, value: u32) -> Result<()> {
        LittleEndian::write_u32(self.take_mut(4)?, value);
        Ok(())
    }

    pub fn write_u64_le(&mut self, value: u64) -> Result<()> {
        LittleEndian::write_u64(self.take_mut(8)?, value);
        Ok(())
    }
}
