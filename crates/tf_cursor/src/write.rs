//! Append mode writing into a growable buffer
//!

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{CursorError, Result};

/// Growable little-endian writer
///
/// Appending never fails. Revisiting an earlier offset with [`ByteWriter::patch_u32_le`] is
/// bounds checked and never extends the buffer.
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Offset the next write will land at
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16_le(&mut self, value: u16) {
        let mut raw = [0u8; 2];
        LittleEndian::write_u16(&mut raw, value);
        self.buf.extend_from_slice(&raw);
    }

    pub fn write_u32_le(&mut self, value: u32) {
        let mut raw = [0u8; 4];
        LittleEndian::write_u32(&mut raw, value);
        self.buf.extend_from_slice(&raw);
    }

    pub fn write_u64_le(&mut self, value: u64) {
        let mut raw = [0u8; 8];
        LittleEndian::write_u64(&mut raw, value);
        self.buf.extend_from_slice(&raw);
    }

    pub fn write_i32_le(&mut self, value: i32) {
        let mut raw = [0u8; 4];
        LittleEndian::write_i32(&mut raw, value);
        self.buf.extend_from_slice(&raw);
    }

    pub fn write_f32_le(&mut self, value: f32) {
        let mut raw = [0u8; 4];
        LittleEndian::write_f32(&mut raw, value);
        self.buf.extend_from_slice(&raw);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append the UTF-8 bytes of `value` followed by a zero byte.
    pub fn write_nul_terminated_str(&mut self, value: &str) {
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(0);
    }

    /// Append a `u32` length followed by the bytes.
    ///
    /// Fails if the length does not fit into the prefix.
    pub fn write_u32_prefixed_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| CursorError::OutOfBounds {
            offset: self.position(),
            requested: bytes.len(),
            len: u32::MAX as usize,
        })?;
        self.write_u32_le(len);
        self.write_bytes(bytes);
        Ok(())
    }

    /// Overwrite a previously written `u32` at `offset`.
    pub fn patch_u32_le(&mut self, offset: usize, value: u32) -> Result<()> {
        let len = self.buf.len();
        let slot = offset
            .checked_add(4)
            .filter(|end| *end <= len)
            .map(|end| &mut self.buf[offset..end])
            .ok_or(CursorError::OutOfBounds {
                offset,
                requested: 4,
                len,
            })?;
        LittleEndian::write_u32(slot, value);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{CursorError, Result};
    use crate::write::ByteWriter;

    #[test]
    fn append_values() {
        let mut writer = ByteWriter::new();
        writer.write_u8(7);
        writer.write_u16_le(0x0102);
        writer.write_i32_le(-1);
        writer.write_nul_terminated_str("ab");

        #[rustfmt::skip]
        assert_eq!(
            writer.into_inner(),
            vec![
                0x07,
                0x02, 0x01,
                0xFF, 0xFF, 0xFF, 0xFF,
                b'a', b'b', 0x00,
            ]
        );
    }

    #[test]
    fn patch_previous_offset() -> Result<()> {
        let mut writer = ByteWriter::new();
        writer.write_u32_le(0);
        writer.write_bytes(b"data");
        writer.patch_u32_le(0, writer.position() as u32)?;

        assert_eq!(&writer.as_slice()[..4], &[0x08, 0x00, 0x00, 0x00]);
        assert_eq!(
            writer.patch_u32_le(6, 1),
            Err(CursorError::OutOfBounds {
                offset: 6,
                requested: 4,
                len: 8
            })
        );
        assert_eq!(writer.position(), 8);

        Ok(())
    }
}
