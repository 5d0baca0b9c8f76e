//! Options controlling how archives are patched

use std::collections::HashMap;
use std::path::PathBuf;

use bon::Builder;
use tf_cursor::ByteCursor;

/// How a replacement shorter than its entry is stretched to the entry's size
///
/// Entries can never change size, so a shorter payload has to be padded. Which padding is safe
/// depends on the format of the entry, hence the policy can be chosen per extension through
/// [`ArchiveOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingPolicy {
    /// Insert filler bytes in front of the payload's final byte, moving that byte to the very end
    /// of the entry. The final byte of the entry is the replacement's, not the one it had before.
    /// Suited to text formats that end in a terminator.
    BeforeLastByte { filler: u8 },

    /// Append filler bytes after the payload. Suited to binary formats whose reader stops on its own.
    Trailing { filler: u8 },

    /// Refuse to pad
    Exact,
}

impl Default for PaddingPolicy {
    fn default() -> Self {
        PaddingPolicy::BeforeLastByte { filler: b' ' }
    }
}

impl PaddingPolicy {
    /// Lay `payload` out over exactly `size` bytes.
    ///
    /// Returns `None` when the payload is larger than `size`, or when it is shorter and the policy
    /// is [`PaddingPolicy::Exact`].
    pub fn pad(&self, payload: &[u8], size: usize) -> Option<Vec<u8>> {
        if payload.len() == size {
            return Some(payload.to_vec());
        }
        if payload.len() > size {
            return None;
        }

        let filler = match *self {
            PaddingPolicy::BeforeLastByte { filler } | PaddingPolicy::Trailing { filler } => filler,
            PaddingPolicy::Exact => return None,
        };

        let mut cursor = ByteCursor::new(vec![filler; size]);
        match (self, payload.split_last()) {
            (PaddingPolicy::BeforeLastByte { .. }, Some((last, head))) => {
                cursor.write_at(0, head).ok()?;
                cursor.write_at(size - 1, &[*last]).ok()?;
            }
            _ => cursor.write_at(0, payload).ok()?,
        }
        Some(cursor.into_inner())
    }
}

/// Options for how an archive is patched
#[derive(Debug, Clone, Builder)]
pub struct ArchiveOptions {
    /// Padding used for extensions without an override
    #[builder(default)]
    pub padding: PaddingPolicy,

    /// Padding per lowercase extension, without the leading dot
    #[builder(default = default_overrides())]
    pub padding_overrides: HashMap<String, PaddingPolicy>,

    /// Where entry backups are written, defaults to `<name>_dir.backup` next to the archive
    pub backup_dir: Option<PathBuf>,
}

/// Padding for binary particle files
///
/// Moving the final byte of a DMX graph would corrupt its last value, while readers stop after
/// the last element and ignore anything that follows.
pub const PARTICLE_PADDING: PaddingPolicy = PaddingPolicy::Trailing { filler: 0 };

fn default_overrides() -> HashMap<String, PaddingPolicy> {
    HashMap::from([("pcf".to_owned(), PARTICLE_PADDING)])
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ArchiveOptions {
    /// Use `policy` for entries with the given extension.
    pub fn with_padding_for(mut self, extension: &str, policy: PaddingPolicy) -> Self {
        self.padding_overrides
            .insert(extension.trim_start_matches('.').to_ascii_lowercase(), policy);
        self
    }

    /// Padding that applies to the entry at `path`
    pub fn padding_for(&self, path: &str) -> PaddingPolicy {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        file_name
            .rsplit_once('.')
            .and_then(|(_, extension)| {
                self.padding_overrides
                    .get(&extension.to_ascii_lowercase())
                    .copied()
            })
            .unwrap_or(self.padding)
    }
}
