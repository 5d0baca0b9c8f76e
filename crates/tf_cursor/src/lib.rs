//! Bounds-checked byte cursors used by the archive and element graph crates.
//!
//! Two types are provided:
//!
//! - [`ByteCursor`] wraps any byte buffer. It reads little-endian fixed-width values, raw byte
//!   runs, NUL-terminated and length-prefixed strings, and when the buffer is mutable it can
//!   overwrite bytes in place. It never grows the buffer.
//! - [`ByteWriter`] is the append mode counterpart backed by a `Vec<u8>`. Values already
//!   written can be revisited through [`ByteWriter::patch_u32_le`] to fill in offsets that are
//!   only known once later data has been laid out.
//!
//! Every operation that would cross the end of the buffer fails with
//! [`CursorError::OutOfBounds`]. Nothing is truncated or zero-filled.
//!
//! ```
//! use tf_cursor::{ByteCursor, ByteWriter};
//!
//! let mut writer = ByteWriter::new();
//! writer.write_u16_le(0xFFFF);
//! writer.write_nul_terminated_str("particles");
//!
//! let bytes = writer.into_inner();
//! let mut cursor = ByteCursor::new(bytes.as_slice());
//! assert_eq!(cursor.read_u16_le()?, 0xFFFF);
//! assert_eq!(cursor.read_nul_terminated_str()?, "particles");
//! assert_eq!(cursor.remaining(), 0);
//! # Ok::<(), tf_cursor::CursorError>(())
//! ```

pub mod error;
pub mod read;
pub mod write;

pub use error::CursorError;
pub use read::ByteCursor;
pub use write::ByteWriter;
