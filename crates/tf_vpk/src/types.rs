//! Base types for structure of VPK directory file.

use binrw::{BinRead, BinWrite};

/// Archive index marking entries whose data follows the directory tree in the `_dir.vpk` itself
pub const INLINE_ARCHIVE_INDEX: u16 = 0x7FFF;

/// Value closing every entry record in the directory tree
pub const ENTRY_TERMINATOR: u16 = 0xFFFF;

/// VPK directory header
///
/// Always starts with the signature `0x55AA1234`. Version 1 headers stop after the tree size,
/// version 2 headers carry the sizes of the sections that follow the tree.
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little, magic = 0x55AA1234u32)]
pub struct VpkHeader {
    /// Format version, 1 or 2
    pub version: u32,

    /// Size of the directory tree that follows the header
    pub tree_size: u32,

    /// Size of the data stored inline after the tree
    #[br(if(version == 2))]
    #[bw(if(*version == 2))]
    pub file_data_section_size: u32,

    #[br(if(version == 2))]
    #[bw(if(*version == 2))]
    pub archive_md5_section_size: u32,

    #[br(if(version == 2))]
    #[bw(if(*version == 2))]
    pub other_md5_section_size: u32,

    #[br(if(version == 2))]
    #[bw(if(*version == 2))]
    pub signature_section_size: u32,
}

impl VpkHeader {
    /// Size of the header on disk
    pub fn size(&self) -> u64 {
        match self.version {
            2 => 28,
            _ => 12,
        }
    }

    /// Offset of the first byte after the directory tree
    pub fn data_start(&self) -> u64 {
        self.size() + self.tree_size as u64
    }
}

/// VPK directory entry record
///
/// The fixed part of an entry, stored right after the entry's file name in the tree and
/// followed by `preload_length` inline bytes.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct VpkEntryRecord {
    /// CRC-32 of the whole entry payload
    pub crc32: u32,

    /// Number of payload bytes stored inline in the tree
    pub preload_length: u16,

    /// Number of the `_NNN.vpk` part holding the data, or [`INLINE_ARCHIVE_INDEX`]
    pub archive_index: u16,

    /// Offset of the data inside its part (or after the tree for inline entries)
    pub data_offset: u32,

    /// Number of payload bytes stored at `data_offset`
    pub data_length: u32,

    /// Always [`ENTRY_TERMINATOR`]
    pub terminator: u16,
}

impl VpkEntryRecord {
    pub const SIZE: usize = 18;
}
