//! Extracting entries and overwriting their payload in place
//!

use std::{
    fs::{self, File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Component, Path, PathBuf},
    sync::PoisonError,
};
use tracing::{debug, info, instrument};

use crate::{
    error::{io_error, ArchiveError, Result},
    options::PaddingPolicy,
    read::{EntryRef, VpkArchive, VpkEntry},
};

const PAYLOAD_CRC: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);

/// A byte range inside one of the archive's files
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Span {
    pub file: PathBuf,
    pub offset: u64,
    pub len: u64,
}

/// Where the two halves of an entry's payload live
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PayloadLayout {
    pub preload: Span,
    pub data: Span,
}

/// Join a logical path onto `root`, refusing anything that would leave `root`.
pub fn safe_join(root: &Path, logical_path: &str) -> Result<PathBuf> {
    let relative = Path::new(logical_path);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || logical_path.contains('\\') {
        return Err(ArchiveError::UnsafePath(logical_path.to_owned()));
    }
    Ok(root.join(relative))
}

impl VpkArchive {
    /// Path of the numbered data part `index`, derived from the `_dir.vpk` name.
    pub fn part_path(&self, index: u16) -> Result<PathBuf> {
        let base = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix("_dir.vpk"))
            .ok_or_else(|| {
                ArchiveError::CorruptDirectory(format!(
                    "{} is not named <name>_dir.vpk, data part {index} cannot be located",
                    self.path.display()
                ))
            })?;
        Ok(self.path.with_file_name(format!("{base}_{index:03}.vpk")))
    }

    /// Compute and check where an entry's bytes are stored.
    pub(crate) fn layout(&self, entry: &VpkEntry) -> Result<PayloadLayout> {
        let preload = Span {
            file: self.path.clone(),
            offset: entry.preload_offset,
            len: entry.preload_length as u64,
        };
        if preload.offset + preload.len > self.header.data_start() {
            return Err(ArchiveError::CorruptDirectory(format!(
                "preload of {} extends past the directory tree",
                entry.path
            )));
        }

        let data = if entry.is_inline() {
            if self.header.version == 2
                && entry.data_offset as u64 + entry.data_length as u64
                    > self.header.file_data_section_size as u64
            {
                return Err(ArchiveError::CorruptDirectory(format!(
                    "data of {} extends past the embedded data section of {} bytes",
                    entry.path, self.header.file_data_section_size
                )));
            }
            Span {
                file: self.path.clone(),
                offset: self.header.data_start() + entry.data_offset as u64,
                len: entry.data_length as u64,
            }
        } else {
            Span {
                file: self.part_path(entry.archive_index)?,
                offset: entry.data_offset as u64,
                len: entry.data_length as u64,
            }
        };

        if data.len > 0 {
            let file_len = fs::metadata(&data.file)
                .map_err(io_error("inspect", &data.file, 0))?
                .len();
            if data.offset + data.len > file_len {
                return Err(ArchiveError::CorruptDirectory(format!(
                    "data of {} ends at {} but {} has {} bytes",
                    entry.path,
                    data.offset + data.len,
                    data.file.display(),
                    file_len
                )));
            }
        }

        Ok(PayloadLayout { preload, data })
    }

    fn read_layout(&self, layout: &PayloadLayout) -> Result<Vec<u8>> {
        let mut payload = Vec::with_capacity((layout.preload.len + layout.data.len) as usize);
        for span in [&layout.preload, &layout.data] {
            read_span(span, &mut payload)?;
        }
        Ok(payload)
    }

    /// Read the full payload of an entry, preload bytes first.
    #[instrument(skip_all, fields(path = %entry.path), err)]
    pub fn read(&self, entry: &EntryRef) -> Result<Vec<u8>> {
        let entry = self.resolve(entry)?;
        let layout = self.layout(entry)?;
        self.read_layout(&layout)
    }

    /// Write the full payload of an entry to `destination`, creating parent directories.
    #[instrument(skip_all, fields(path = %entry.path, destination = %destination.as_ref().display()), err)]
    pub fn extract(&self, entry: &EntryRef, destination: impl AsRef<Path>) -> Result<()> {
        let destination = destination.as_ref();
        let payload = self.read(entry)?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(io_error("create directory", parent, 0))?;
        }
        fs::write(destination, &payload).map_err(io_error("write", destination, 0))?;
        debug!(size = payload.len(), "extracted");

        Ok(())
    }

    /// Whether the entry's current payload still matches the CRC recorded in the directory.
    ///
    /// Patching never rewrites the recorded checksum, so patched entries normally fail this.
    pub fn verify(&self, entry: &EntryRef) -> Result<bool> {
        let payload = self.read(entry)?;
        Ok(PAYLOAD_CRC.checksum(&payload) == entry.crc32)
    }

    /// Location a backup of `entry` is written to.
    pub fn backup_path(&self, entry: &VpkEntry) -> Result<PathBuf> {
        let root = match &self.options.backup_dir {
            Some(dir) => dir.clone(),
            None => {
                let stem = self
                    .path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "vpk".to_owned());
                self.path.with_file_name(format!("{stem}.backup"))
            }
        };
        safe_join(&root, &entry.path)
    }

    /// Overwrite an entry with `payload`, padding it with the policy configured for its extension.
    pub fn patch(&self, entry: &EntryRef, payload: &[u8], backup: bool) -> Result<()> {
        let padding = self.options.padding_for(&entry.path);
        self.patch_with(entry, payload, backup, padding)
    }

    /// Overwrite an entry with `payload` in place.
    ///
    /// The entry keeps its size and location. A larger payload is rejected with
    /// [`ArchiveError::PayloadTooLarge`] before anything is written, a shorter payload is
    /// stretched according to `padding`. With `backup` set the current bytes are saved to
    /// [`VpkArchive::backup_path`] first, and a failed backup aborts the patch. Every file the
    /// payload touches is opened before the first byte is written.
    #[instrument(skip(self, entry, payload), fields(path = %entry.path, size = payload.len()), err)]
    pub fn patch_with(
        &self,
        entry: &EntryRef,
        payload: &[u8],
        backup: bool,
        padding: PaddingPolicy,
    ) -> Result<()> {
        let entry = self.resolve(entry)?;
        let original_size = entry.total_size();
        let new_size = payload.len() as u64;

        if new_size > original_size {
            return Err(ArchiveError::PayloadTooLarge {
                path: entry.path.to_string(),
                overflow: new_size - original_size,
            });
        }

        let buffer = padding
            .pad(payload, original_size as usize)
            .ok_or_else(|| ArchiveError::PaddingRejected {
                path: entry.path.to_string(),
                missing: original_size - new_size,
            })?;
        if new_size < original_size {
            info!(bytes = original_size - new_size, ?padding, "padding payload");
        }

        let layout = self.layout(entry)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let (preload, data) = buffer.split_at(entry.preload_length as usize);
        let targets = [
            (SpanWriter::open(&layout.preload, preload)?, preload),
            (SpanWriter::open(&layout.data, data)?, data),
        ];

        if backup {
            let target = self.backup_path(entry)?;
            let current = self.read_layout(&layout)?;
            write_backup(&target, &current)?;
            info!(backup = %target.display(), "saved original bytes");
        }

        for (writer, bytes) in targets {
            if let Some(writer) = writer {
                writer.write(bytes)?;
            }
        }

        Ok(())
    }
}

fn read_span(span: &Span, out: &mut Vec<u8>) -> Result<()> {
    if span.len == 0 {
        return Ok(());
    }

    let mut file = File::open(&span.file).map_err(io_error("open", &span.file, span.offset))?;
    file.seek(SeekFrom::Start(span.offset))
        .map_err(io_error("seek", &span.file, span.offset))?;

    let start = out.len();
    out.resize(start + span.len as usize, 0);
    file.read_exact(&mut out[start..])
        .map_err(io_error("read", &span.file, span.offset))
}

/// A span opened for writing and positioned at its offset
struct SpanWriter<'a> {
    span: &'a Span,
    file: File,
}

impl<'a> SpanWriter<'a> {
    /// Open the file behind `span`, or `None` when there is nothing to write.
    fn open(span: &'a Span, bytes: &[u8]) -> Result<Option<SpanWriter<'a>>> {
        if bytes.is_empty() {
            return Ok(None);
        }
        if bytes.len() as u64 != span.len {
            return Err(ArchiveError::CorruptDirectory(format!(
                "{} bytes do not fit a {} byte region of {}",
                bytes.len(),
                span.len,
                span.file.display()
            )));
        }

        let mut file = OpenOptions::new()
            .write(true)
            .open(&span.file)
            .map_err(io_error("open for writing", &span.file, span.offset))?;
        file.seek(SeekFrom::Start(span.offset))
            .map_err(io_error("seek", &span.file, span.offset))?;
        Ok(Some(SpanWriter { span, file }))
    }

    fn write(mut self, bytes: &[u8]) -> Result<()> {
        let span = self.span;
        self.file
            .write_all(bytes)
            .map_err(io_error("write", &span.file, span.offset))?;
        self.file
            .sync_all()
            .map_err(io_error("sync", &span.file, span.offset))
    }
}

fn write_backup(target: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(io_error("create directory", parent, 0))?;
    }
    let mut file = File::create(target).map_err(io_error("create backup", target, 0))?;
    file.write_all(bytes)
        .map_err(io_error("write backup", target, 0))?;
    file.sync_all().map_err(io_error("sync backup", target, 0))
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use crate::error::ArchiveError;
    use crate::patch::safe_join;

    #[test]
    fn join_inside_root() -> crate::error::Result<()> {
        let root = Path::new("/tmp/out");
        assert_eq!(
            safe_join(root, "particles/fire.pcf")?,
            root.join("particles").join("fire.pcf")
        );
        Ok(())
    }

    #[test]
    fn join_refuses_escapes() {
        let root = Path::new("/tmp/out");
        for path in ["../etc/passwd", "/etc/passwd", "a/../../b", "a\\..\\b"] {
            assert!(
                matches!(safe_join(root, path), Err(ArchiveError::UnsafePath(_))),
                "{path} should be refused"
            );
        }
    }
}
