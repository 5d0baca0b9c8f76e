//! Reading, mutating and patching entries of one archive

use std::path::Path;

use tf_vpk::{error::EntryNotFoundError, ArchiveError, ArchiveOptions, EntryRef, VpkArchive};
use tracing::{info, instrument};

use crate::{
    error::{Error, Result},
    hooks::Processor,
};

/// Extensions whose entries are decoded as element graphs
pub const GRAPH_EXTENSIONS: &[&str] = &["pcf"];

/// Extensions whose entries are handed to mutations as raw bytes
pub const BYTES_EXTENSIONS: &[&str] = &["vmt", "txt", "res"];

/// How an entry is handled by [`ModSession::process`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Graph,
    Bytes,
}

impl FileKind {
    /// Kind of the entry at `path`, judged by its extension
    pub fn of(path: &str) -> Option<FileKind> {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let (_, extension) = file_name.rsplit_once('.')?;
        let extension = extension.to_ascii_lowercase();
        if GRAPH_EXTENSIONS.contains(&extension.as_str()) {
            Some(FileKind::Graph)
        } else if BYTES_EXTENSIONS.contains(&extension.as_str()) {
            Some(FileKind::Bytes)
        } else {
            None
        }
    }
}

/// Result of processing one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Logical path of the patched entry
    pub path: String,
    /// Size of the entry, unchanged by patching
    pub original_size: u64,
    /// Size of the payload the mutation produced
    pub produced_size: u64,
}

impl ProcessOutcome {
    /// Filler bytes added to stretch the payload to the entry's size
    pub fn padding(&self) -> u64 {
        self.original_size - self.produced_size
    }
}

/// One open archive being modded
///
/// ```no_run
/// use tfmod::{hooks::Processor, pipeline::ModSession};
///
/// fn shrink_fire(path: &std::path::Path) -> tfmod::error::Result<()> {
///     let session = ModSession::open(path, Default::default())?;
///     let shrink = tfmod::hooks::set_attribute("fire_large", "radius", 4.0f32.into());
///     session.process("fire.pcf", Processor::graph(shrink), true)?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ModSession {
    archive: VpkArchive,
}

impl ModSession {
    /// Open the archive at `path`.
    ///
    /// Default options pad particle files with [`tf_vpk::PARTICLE_PADDING`].
    pub fn open(path: impl AsRef<Path>, options: ArchiveOptions) -> Result<ModSession> {
        Ok(ModSession {
            archive: VpkArchive::open_with(path, options)?,
        })
    }

    pub fn archive(&self) -> &VpkArchive {
        &self.archive
    }

    pub fn into_archive(self) -> VpkArchive {
        self.archive
    }

    /// Logical paths of every particle file, in tree order
    pub fn pcf_files(&self) -> Result<Vec<String>> {
        self.list("*.pcf")
    }

    /// Logical paths of every material file, in tree order
    pub fn vmt_files(&self) -> Result<Vec<String>> {
        self.list("*.vmt")
    }

    fn list(&self, pattern: &str) -> Result<Vec<String>> {
        Ok(self
            .archive
            .find_by_glob(pattern)?
            .map(str::to_owned)
            .collect())
    }

    /// Entry for `name`, which is either a logical path or a bare file name.
    pub fn resolve(&self, name: &str) -> Result<EntryRef> {
        let path = if name.contains('/') {
            name
        } else {
            self.archive.find_file_path(name).ok_or_else(|| {
                ArchiveError::from(EntryNotFoundError::Path(name.to_owned()))
            })?
        };
        Ok(self.archive.by_name(path)?)
    }

    /// Run `processor` over the entry `name` and patch the result back in place.
    ///
    /// `.pcf` entries are decoded, mutated as a graph and encoded again with the same DMX
    /// version. `.vmt`, `.txt` and `.res` entries are mutated as bytes. Nothing is written when
    /// the mutation fails or its result does not fit the entry.
    #[instrument(skip(self, processor), fields(processor = processor.kind()), err)]
    pub fn process(
        &self,
        name: &str,
        mut processor: Processor<'_>,
        backup: bool,
    ) -> Result<ProcessOutcome> {
        let entry = self.resolve(name)?;
        let path = entry.path.to_string();
        let kind = FileKind::of(&path).ok_or_else(|| Error::UnsupportedFileType {
            path: path.clone(),
        })?;

        let original = self.archive.read(&entry)?;
        let produced = match (kind, &mut processor) {
            (FileKind::Graph, Processor::Graph(mutation)) => {
                let mut graph = tf_pcf::decode(&original)?;
                mutation.mutate(&mut graph)?;
                tf_pcf::encode(&graph)?
            }
            (FileKind::Bytes, Processor::Bytes(mutation)) => mutation.mutate(original)?,
            (FileKind::Graph, Processor::Bytes(_)) => {
                return Err(Error::ProcessorMismatch {
                    path,
                    expected: "graph",
                })
            }
            (FileKind::Bytes, Processor::Graph(_)) => {
                return Err(Error::ProcessorMismatch {
                    path,
                    expected: "bytes",
                })
            }
        };

        self.archive.patch(&entry, &produced, backup)?;

        let outcome = ProcessOutcome {
            path,
            original_size: entry.total_size(),
            produced_size: produced.len() as u64,
        };
        info!(
            path = %outcome.path,
            size = outcome.original_size,
            padding = outcome.padding(),
            "processed"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod test {
    use crate::pipeline::FileKind;

    #[test]
    fn file_kind_by_extension() {
        assert_eq!(FileKind::of("particles/fire.pcf"), Some(FileKind::Graph));
        assert_eq!(FileKind::of("materials/a.VMT"), Some(FileKind::Bytes));
        assert_eq!(FileKind::of("resource/ui/hud.res"), Some(FileKind::Bytes));
        assert_eq!(FileKind::of("scripts/a.txt"), Some(FileKind::Bytes));
        assert_eq!(FileKind::of("models/hat.mdl"), None);
        assert_eq!(FileKind::of("a.dir/readme"), None);
    }
}
