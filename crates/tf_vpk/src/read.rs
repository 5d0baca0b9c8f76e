//! Types for reading VPK archives
//!

use binrw::BinRead;
use glob::{MatchOptions, Pattern};
use indexmap::IndexMap;
use std::{
    fs::File,
    io::{self, Read},
    ops::Deref,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};
use tf_cursor::ByteCursor;
use tracing::{debug, instrument, warn};

use crate::{
    error::{io_error, ArchiveError, EntryNotFoundError, Result},
    options::ArchiveOptions,
    types::{VpkEntryRecord, VpkHeader, ENTRY_TERMINATOR, INLINE_ARCHIVE_INDEX},
};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Structure representing a VPK directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpkEntry {
    /// Logical path, `directory/name.extension`
    pub path: Box<str>,
    /// CRC32 checksum recorded in the directory
    pub crc32: u32,
    /// Number of payload bytes stored inline in the tree
    pub preload_length: u16,
    /// Data part holding the rest of the payload, or [`INLINE_ARCHIVE_INDEX`]
    pub archive_index: u16,
    /// Offset of the data inside its part
    pub data_offset: u32,
    /// Number of payload bytes stored at `data_offset`
    pub data_length: u32,
    /// Absolute offset of the preload bytes inside the directory file
    pub preload_offset: u64,
}

impl VpkEntry {
    /// Size of the whole payload. Patching can never change it.
    pub fn total_size(&self) -> u64 {
        self.preload_length as u64 + self.data_length as u64
    }

    /// Whether the data is stored in the directory file rather than a numbered part
    pub fn is_inline(&self) -> bool {
        self.archive_index == INLINE_ARCHIVE_INDEX
    }

    /// Final segment of the logical path
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Extension of the logical path, without the dot
    pub fn extension(&self) -> Option<&str> {
        self.file_name()
            .rsplit_once('.')
            .map(|(_, extension)| extension)
    }
}

/// Handle to an entry of one open archive
///
/// A reference stays valid for the archive it was obtained from. Using it with an archive that
/// was opened again fails with [`EntryNotFoundError::Stale`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRef {
    session: u64,
    index: usize,
    entry: VpkEntry,
}

impl Deref for EntryRef {
    type Target = VpkEntry;

    fn deref(&self) -> &Self::Target {
        &self.entry
    }
}

/// Normalize a logical path for lookup: forward slashes, no leading slash.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_owned()
}

fn logical_path(directory: &str, file_name: &str, extension: &str) -> String {
    let mut path = String::with_capacity(directory.len() + file_name.len() + extension.len() + 2);
    let directory = directory.trim();
    if !directory.is_empty() {
        path.push_str(directory);
        path.push('/');
    }
    path.push_str(file_name);
    let extension = extension.trim();
    if !extension.is_empty() {
        path.push('.');
        path.push_str(extension);
    }
    path
}

/// VPK archive reader and patcher
///
/// ```no_run
/// fn list_particles(path: &std::path::Path) -> tf_vpk::error::Result<()> {
///     let vpk = tf_vpk::VpkArchive::open(path)?;
///
///     for name in vpk.find_by_glob("*.pcf")? {
///         let entry = vpk.find(name).expect("listed entries can be found");
///         println!("{name}: {} bytes", entry.total_size());
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct VpkArchive {
    pub(crate) path: PathBuf,
    pub(crate) header: VpkHeader,
    pub(crate) session: u64,
    pub(crate) entries: IndexMap<Box<str>, VpkEntry>,
    pub(crate) options: ArchiveOptions,
    pub(crate) write_lock: Mutex<()>,
}

impl VpkArchive {
    /// Open a `_dir.vpk` file and index its directory tree.
    pub fn open(path: impl AsRef<Path>) -> Result<VpkArchive> {
        Self::open_with(path, ArchiveOptions::default())
    }

    /// Open a `_dir.vpk` file with explicit options.
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn open_with(path: impl AsRef<Path>, options: ArchiveOptions) -> Result<VpkArchive> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(io_error("open", path, 0))?;
        let file_len = file
            .metadata()
            .map_err(io_error("inspect", path, 0))?
            .len();

        let header = VpkHeader::read(&mut file).map_err(|err| match err {
            binrw::Error::BadMagic { .. } => ArchiveError::SignatureMismatch {
                path: path.to_path_buf(),
            },
            binrw::Error::Io(source) if source.kind() == io::ErrorKind::UnexpectedEof => {
                ArchiveError::SignatureMismatch {
                    path: path.to_path_buf(),
                }
            }
            binrw::Error::Io(source) => io_error("read header of", path, 0)(source),
            other => ArchiveError::CorruptDirectory(other.to_string()),
        })?;

        if !matches!(header.version, 1 | 2) {
            return Err(ArchiveError::UnsupportedVersion {
                path: path.to_path_buf(),
                version: header.version,
            });
        }

        if header.data_start() > file_len {
            return Err(ArchiveError::CorruptDirectory(format!(
                "tree of {} bytes does not fit in a {} byte file",
                header.tree_size, file_len
            )));
        }

        let mut tree = vec![0u8; header.tree_size as usize];
        file.read_exact(&mut tree)
            .map_err(io_error("read directory tree of", path, header.size()))?;

        let entries = parse_tree(&tree, header.size())?;
        debug!(version = header.version, entries = entries.len(), "indexed directory");

        Ok(VpkArchive {
            path: path.to_path_buf(),
            header,
            session: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
            entries,
            options,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the directory file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &VpkHeader {
        &self.header
    }

    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Number of entries contained in this VPK.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this VPK contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over all logical paths, in directory tree order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_ref())
    }

    /// Look up an entry by logical path.
    ///
    /// Backslashes and a leading slash are normalized away, the rest is compared byte for byte.
    pub fn find(&self, path: &str) -> Option<EntryRef> {
        let path = normalize_path(path);
        self.entries
            .get_full(path.as_str())
            .map(|(index, _, entry)| EntryRef {
                session: self.session,
                index,
                entry: entry.clone(),
            })
    }

    /// Full metadata of an entry, same as [`VpkArchive::find`].
    pub fn entry_metadata(&self, path: &str) -> Option<EntryRef> {
        self.find(path)
    }

    /// Look up an entry by logical path, failing when it is missing.
    pub fn by_name(&self, path: &str) -> Result<EntryRef> {
        self.find(path)
            .ok_or_else(|| EntryNotFoundError::Path(path.to_owned()).into())
    }

    /// First entry, in tree order, whose final path segment is `file_name`.
    pub fn find_file_path(&self, file_name: &str) -> Option<&str> {
        self.entries
            .values()
            .find(|entry| entry.file_name() == file_name)
            .map(|entry| entry.path.as_ref())
    }

    /// Logical paths matching a glob pattern, in tree order.
    ///
    /// `*` also matches `/`, so `*.pcf` finds particle files in any directory. Each call walks the
    /// index again, the returned iterator holds no other state.
    pub fn find_by_glob(&self, pattern: &str) -> Result<impl Iterator<Item = &str> + '_> {
        let compiled = Pattern::new(pattern).map_err(|err| ArchiveError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: err.msg,
        })?;

        Ok(self
            .entries
            .keys()
            .filter(move |path| compiled.matches_with(path, MATCH_OPTIONS))
            .map(|path| path.as_ref()))
    }

    pub(crate) fn resolve(&self, entry: &EntryRef) -> Result<&VpkEntry> {
        if entry.session != self.session {
            return Err(EntryNotFoundError::Stale(entry.path.to_string()).into());
        }

        match self.entries.get_index(entry.index) {
            Some((_, current)) if current.path == entry.entry.path => Ok(current),
            _ => Err(EntryNotFoundError::Stale(entry.path.to_string()).into()),
        }
    }
}

fn read_string(cursor: &mut ByteCursor<&[u8]>) -> Result<String> {
    Ok(cursor.read_nul_terminated_str()?.to_owned())
}

/// Walk the extension, directory and file name levels of the tree.
fn parse_tree(tree: &[u8], tree_start: u64) -> Result<IndexMap<Box<str>, VpkEntry>> {
    let mut cursor = ByteCursor::new(tree);
    let mut entries = IndexMap::new();

    loop {
        let extension = read_string(&mut cursor)?;
        if extension.is_empty() {
            break;
        }

        loop {
            let directory = read_string(&mut cursor)?;
            if directory.is_empty() {
                break;
            }

            loop {
                let file_name = read_string(&mut cursor)?;
                if file_name.is_empty() {
                    break;
                }

                let path = logical_path(&directory, &file_name, &extension);
                let raw = cursor.read_array::<{ VpkEntryRecord::SIZE }>()?;
                let record = VpkEntryRecord::read(&mut io::Cursor::new(raw))
                    .map_err(|err| ArchiveError::CorruptDirectory(err.to_string()))?;

                if record.terminator != ENTRY_TERMINATOR {
                    return Err(ArchiveError::CorruptDirectory(format!(
                        "entry {path} ends with {:#06X} instead of {ENTRY_TERMINATOR:#06X}",
                        record.terminator
                    )));
                }

                let preload_offset = tree_start + cursor.position() as u64;
                cursor.skip(record.preload_length as usize)?;

                let entry = VpkEntry {
                    path: path.into(),
                    crc32: record.crc32,
                    preload_length: record.preload_length,
                    archive_index: record.archive_index,
                    data_offset: record.data_offset,
                    data_length: record.data_length,
                    preload_offset,
                };
                if let Some(previous) = entries.insert(entry.path.clone(), entry) {
                    warn!(path = %previous.path, "duplicate entry in directory tree");
                }
            }
        }
    }

    if cursor.remaining() > 0 {
        debug!(remaining = cursor.remaining(), "ignoring bytes after tree terminator");
    }

    Ok(entries)
}
