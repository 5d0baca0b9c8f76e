//! Builds small VPK archives on disk for tests
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use binrw::BinWrite;
use tf_vpk::types::{VpkEntryRecord, VpkHeader, ENTRY_TERMINATOR, INLINE_ARCHIVE_INDEX};

const CRC: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);

pub fn crc32(bytes: &[u8]) -> u32 {
    CRC.checksum(bytes)
}

/// Where the non-preload part of an entry is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Part(u16),
    Inline,
}

#[derive(Debug, Clone)]
pub struct FixtureEntry {
    pub path: String,
    pub payload: Vec<u8>,
    pub preload: u16,
    pub location: Location,
}

/// Archive description written by [`VpkFixture::write`]
///
/// The tree is grouped by extension, then directory, both sorted, keeping insertion order for
/// files of the same directory.
#[derive(Debug, Clone)]
pub struct VpkFixture {
    pub version: u32,
    pub entries: Vec<FixtureEntry>,
}

impl VpkFixture {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            entries: Vec::new(),
        }
    }

    /// Entry stored entirely in data part 0.
    pub fn entry(self, path: &str, payload: impl Into<Vec<u8>>) -> Self {
        self.entry_with(path, payload, 0, Location::Part(0))
    }

    pub fn entry_with(
        mut self,
        path: &str,
        payload: impl Into<Vec<u8>>,
        preload: u16,
        location: Location,
    ) -> Self {
        let payload = payload.into();
        assert!(preload as usize <= payload.len(), "preload longer than payload");
        self.entries.push(FixtureEntry {
            path: path.to_owned(),
            payload,
            preload,
            location,
        });
        self
    }

    /// Write `<base>_dir.vpk` and its data parts into `dir`, returning the directory file path.
    pub fn write(&self, dir: &Path, base: &str) -> PathBuf {
        let mut grouped: BTreeMap<String, BTreeMap<String, Vec<(String, &FixtureEntry)>>> =
            BTreeMap::new();
        for entry in &self.entries {
            let (directory, file) = entry.path.rsplit_once('/').unwrap_or((" ", entry.path.as_str()));
            let (name, extension) = file.rsplit_once('.').unwrap_or((file, " "));
            grouped
                .entry(extension.to_owned())
                .or_default()
                .entry(directory.to_owned())
                .or_default()
                .push((name.to_owned(), entry));
        }

        let mut parts: BTreeMap<u16, Vec<u8>> = BTreeMap::new();
        let mut inline = Vec::new();
        let mut tree = Cursor::new(Vec::new());

        for (extension, directories) in &grouped {
            push_str(&mut tree, extension);
            for (directory, files) in directories {
                push_str(&mut tree, directory);
                for (name, entry) in files {
                    push_str(&mut tree, name);

                    let (preload, data) = entry.payload.split_at(entry.preload as usize);
                    let (archive_index, sink) = match entry.location {
                        Location::Part(index) => (index, parts.entry(index).or_default()),
                        Location::Inline => (INLINE_ARCHIVE_INDEX, &mut inline),
                    };
                    let record = VpkEntryRecord {
                        crc32: crc32(&entry.payload),
                        preload_length: entry.preload,
                        archive_index,
                        data_offset: sink.len() as u32,
                        data_length: data.len() as u32,
                        terminator: ENTRY_TERMINATOR,
                    };
                    sink.extend_from_slice(data);

                    record.write(&mut tree).expect("record fits in memory");
                    tree.get_mut().extend_from_slice(preload);
                    tree.set_position(tree.get_ref().len() as u64);
                }
                push_str(&mut tree, "");
            }
            push_str(&mut tree, "");
        }
        push_str(&mut tree, "");
        let tree = tree.into_inner();

        let header = VpkHeader {
            version: self.version,
            tree_size: tree.len() as u32,
            file_data_section_size: if self.version == 2 {
                inline.len() as u32
            } else {
                0
            },
            ..Default::default()
        };

        let mut dir_file = Cursor::new(Vec::new());
        header.write(&mut dir_file).expect("header fits in memory");
        let mut dir_file = dir_file.into_inner();
        dir_file.extend_from_slice(&tree);
        dir_file.extend_from_slice(&inline);

        let dir_path = dir.join(format!("{base}_dir.vpk"));
        std::fs::write(&dir_path, dir_file).expect("write directory file");
        for (index, data) in parts {
            std::fs::write(dir.join(format!("{base}_{index:03}.vpk")), data)
                .expect("write data part");
        }

        dir_path
    }
}

fn push_str(tree: &mut Cursor<Vec<u8>>, value: &str) {
    tree.get_mut().extend_from_slice(value.as_bytes());
    tree.get_mut().push(0);
    tree.set_position(tree.get_ref().len() as u64);
}

/// Archive with entries in every storage layout.
///
/// Tree order is `a.pcf`, `c.pcf`, `particles/effect.pcf`, `particles/split.pcf`, `b.txt`,
/// `materials/models/hat.vmt`.
pub fn mixed_fixture() -> VpkFixture {
    VpkFixture::new(2)
        .entry("a.pcf", b"pcf-a".to_vec())
        .entry("b.txt", b"readme\n".to_vec())
        .entry("c.pcf", b"pcf-c".to_vec())
        .entry("particles/effect.pcf", effect_payload())
        .entry_with(
            "particles/split.pcf",
            b"0123456789".to_vec(),
            4,
            Location::Part(1),
        )
        .entry_with(
            "materials/models/hat.vmt",
            b"\"VertexLitGeneric\"\n{\n}\n".to_vec(),
            0,
            Location::Inline,
        )
}

/// 1024 bytes ending in `}`
pub fn effect_payload() -> Vec<u8> {
    let mut payload = vec![b'x'; 1024];
    payload[1023] = b'}';
    payload
}

/// Write [`mixed_fixture`] into a fresh temporary directory.
pub fn mixed_archive() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = mixed_fixture().write(dir.path(), "tf2_misc");
    (dir, path)
}
