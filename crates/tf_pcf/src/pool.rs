//! String table shared by element and attribute names

use indexmap::IndexSet;
use tf_cursor::{ByteCursor, ByteWriter};

use crate::error::{CodecError, Result};

/// Integer width of a counter or index on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Width {
    U16,
    U32,
}

impl Width {
    pub fn read(self, cursor: &mut ByteCursor<&[u8]>) -> Result<u32> {
        Ok(match self {
            Width::U16 => cursor.read_u16_le()? as u32,
            Width::U32 => cursor.read_u32_le()?,
        })
    }

    pub fn write(self, writer: &mut ByteWriter, value: u32) {
        match self {
            Width::U16 => writer.write_u16_le(value as u16),
            Width::U32 => writer.write_u32_le(value),
        }
    }

    fn max(self) -> usize {
        match self {
            Width::U16 => u16::MAX as usize,
            Width::U32 => u32::MAX as usize,
        }
    }
}

/// How a binary encoding version lays out its string table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PoolLayout {
    /// Width of the string count
    pub count: Width,
    /// Width of every index into the table
    pub index: Width,
    /// Element names and string values go through the table rather than inline
    pub pooled_values: bool,
}

impl PoolLayout {
    pub fn for_version(version: u32) -> Self {
        match version {
            0..=3 => PoolLayout {
                count: Width::U16,
                index: Width::U16,
                pooled_values: false,
            },
            4 => PoolLayout {
                count: Width::U32,
                index: Width::U16,
                pooled_values: true,
            },
            _ => PoolLayout {
                count: Width::U32,
                index: Width::U32,
                pooled_values: true,
            },
        }
    }

    /// Most distinct strings the table can hold
    pub fn limit(&self) -> usize {
        self.count.max().min(self.index.max().saturating_add(1))
    }
}

/// Deduplicated strings in first-seen order
#[derive(Debug, Default)]
pub(crate) struct StringPool {
    strings: IndexSet<String>,
}

impl StringPool {
    /// Index of `value`, adding it when not seen yet.
    pub fn intern(&mut self, value: &str) -> Result<u32> {
        check_storable(value)?;
        let index = match self.strings.get_index_of(value) {
            Some(index) => index,
            None => self.strings.insert_full(value.to_owned()).0,
        };
        Ok(index as u32)
    }

    /// Index of a string interned earlier
    pub fn index_of(&self, value: &str) -> Result<u32> {
        self.strings
            .get_index_of(value)
            .map(|index| index as u32)
            .ok_or_else(|| CodecError::MalformedString(format!("{value:?} missing from string table")))
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }

    /// Fail unless the table fits the layout.
    pub fn check_limit(&self, layout: &PoolLayout) -> Result<()> {
        if self.len() > layout.limit() {
            return Err(CodecError::PoolOverflow {
                count: self.len(),
                limit: layout.limit(),
            });
        }
        Ok(())
    }
}

/// Strings are written NUL-terminated, so they cannot contain NUL themselves.
pub(crate) fn check_storable(value: &str) -> Result<()> {
    if value.contains('\0') {
        return Err(CodecError::MalformedString(format!(
            "{value:?} contains a NUL byte"
        )));
    }
    Ok(())
}
