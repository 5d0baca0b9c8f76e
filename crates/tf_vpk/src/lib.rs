//! This library handles reading **VPK** archives and patching their entries in place.
//!
//! # VPK Archive Format Documentation
//!
//! A VPK archive is split over a directory file (`<name>_dir.vpk`) and numbered data parts
//! (`<name>_000.vpk`, `<name>_001.vpk`, ...). The directory file holds a header, a directory tree
//! describing every entry, and optionally entry data of its own.
//!
//! ## Header
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Signature              | 4 bytes: 0x55AA1234                                        |
//! | 0x0004         | Version                | 4 bytes: 1 or 2                                            |
//! | 0x0008         | Tree Size              | 4 bytes: Size of the directory tree                        |
//! | 0x000C         | File Data Size         | 4 bytes (v2): Size of the data stored after the tree       |
//! | 0x0010         | Archive MD5 Size       | 4 bytes (v2): Size of the part checksum section            |
//! | 0x0014         | Other MD5 Size         | 4 bytes (v2): Size of the tree checksum section            |
//! | 0x0018         | Signature Size         | 4 bytes (v2): Size of the signature section                |
//!
//! ## Directory Tree
//!
//! Entries are grouped by extension, then by directory, then by file name. Each level is a run
//! of NUL-terminated strings closed by an empty string. An extension or directory of `" "`
//! stands for "none". After each file name comes the entry record:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | CRC32                  | 4 bytes: CRC-32 of the whole payload                    |
//! | 0x0004         | Preload Length         | 2 bytes: Payload bytes stored right after this record   |
//! | 0x0006         | Archive Index          | 2 bytes: Data part number, 0x7FFF for the dir file      |
//! | 0x0008         | Data Offset            | 4 bytes: Offset of the data inside its part             |
//! | 0x000C         | Data Length            | 4 bytes: Payload bytes stored at the data offset        |
//! | 0x0010         | Terminator             | 2 bytes: 0xFFFF                                         |
//!
//! Entries with archive index `0x7FFF` keep their data in the directory file, at
//! `header size + tree size + data offset`.
//!
//! ## Patching
//!
//! [`VpkArchive::patch`] overwrites an entry's bytes where they are. The preload and data
//! lengths never change, so the tree and every other entry stay byte-identical. Shorter
//! payloads are padded with a [`PaddingPolicy`], larger ones are rejected.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.vpk`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod batch;
pub mod error;
pub mod options;
pub mod patch;
pub mod read;
pub mod types;

pub use batch::{spawn_extract, BatchHandle, BatchReport, CancellationToken};
pub use error::ArchiveError;
pub use options::{ArchiveOptions, PaddingPolicy, PARTICLE_PADDING};
pub use read::{EntryRef, VpkArchive, VpkEntry};
