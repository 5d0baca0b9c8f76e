//! This library decodes the binary **DMX** element graphs stored in `.pcf` particle files and
//! encodes them again after modification.
//!
//! # Binary DMX Format Documentation
//!
//! A file starts with a NUL-terminated text header:
//!
//! ```text
//! <!-- dmx encoding binary 2 format pcf 1 -->\n\0
//! ```
//!
//! followed by a string table, the element table, and the attributes of every element.
//!
//! ## String Table
//!
//! | version | string count | string index | element names | string values |
//! |---------|--------------|--------------|---------------|---------------|
//! | 2, 3    | u16          | u16          | inline        | inline        |
//! | 4       | u32          | u16          | table index   | table index   |
//! | 5       | u32          | u32          | table index   | table index   |
//!
//! Strings are NUL-terminated UTF-8. Inline strings are written where they are used.
//!
//! ## Element Table
//!
//! | Field          | Description                                          |
//! |----------------|------------------------------------------------------|
//! | Count          | 4 bytes: Number of elements                          |
//! | Type           | String index: Element type, e.g. `DmElement`         |
//! | Name           | String (see table above)                             |
//! | ID             | 16 bytes: Unique identifier                          |
//!
//! ## Attributes
//!
//! After the element table, each element in order stores a 4 byte attribute count followed by
//! its attributes:
//!
//! | Field          | Description                                          |
//! |----------------|------------------------------------------------------|
//! | Name           | String index                                         |
//! | Type           | 1 byte: [`AttributeKind`] tag                        |
//! | Value          | Depends on the type                                  |
//!
//! Element references are 4 byte indices into the element table, `-1` for none. Arrays are a
//! 4 byte count followed by the items. Strings inside arrays are always inline.
//!
//! Type 7 and its array form 21 hold a 16 byte object id up to version 2 and a 4 byte time from
//! version 3 on.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.pcf`, `.dmx`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod error;
pub mod graph;
pub mod header;
mod pool;
pub mod read;
pub mod types;
pub mod write;

pub use error::CodecError;
pub use graph::Graph;
pub use header::DmxHeader;
pub use read::decode;
pub use types::{Attribute, AttributeKind, AttributeValue, Element, ElementHandle, ElementId};
pub use write::encode;
