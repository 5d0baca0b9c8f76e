use clap::{Args, ValueEnum};
use miette::{miette, Context, IntoDiagnostic, Result};
use std::path::PathBuf;
use tf_vpk::{PaddingPolicy, VpkArchive};
use tracing::info;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Padding {
    /// Spaces in front of the final byte
    BeforeLastByte,
    /// Spaces after the payload
    Trailing,
    /// Zero bytes after the payload
    Zeroed,
    /// Refuse payloads shorter than the entry
    Exact,
}

impl From<Padding> for PaddingPolicy {
    fn from(value: Padding) -> Self {
        match value {
            Padding::BeforeLastByte => PaddingPolicy::BeforeLastByte { filler: b' ' },
            Padding::Trailing => PaddingPolicy::Trailing { filler: b' ' },
            Padding::Zeroed => PaddingPolicy::Trailing { filler: 0 },
            Padding::Exact => PaddingPolicy::Exact,
        }
    }
}

#[derive(Args)]
pub struct PatchArgs {
    /// An input `_dir.vpk` file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Logical path of the entry, or a bare file name
    #[arg(short, long, value_name = "PATH")]
    entry: String,

    /// File holding the replacement bytes
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// How shorter replacements are padded, defaults to the policy for the entry's extension
    #[arg(long, value_enum)]
    padding: Option<Padding>,

    /// Skip saving the original bytes
    #[arg(long, default_value_t = false)]
    no_backup: bool,
}

impl PatchArgs {
    pub fn handle(&self) -> Result<()> {
        let vpk = VpkArchive::open(&self.file)?;

        let path = if self.entry.contains('/') {
            self.entry.as_str()
        } else {
            vpk.find_file_path(&self.entry)
                .ok_or(miette!("unable to find {} in {}", self.entry, self.file.display()))?
        };
        let entry = vpk.by_name(path)?;

        let payload = std::fs::read(&self.input)
            .into_diagnostic()
            .context(format!("reading {}", self.input.display()))?;

        match self.padding {
            Some(padding) => vpk.patch_with(&entry, &payload, !self.no_backup, padding.into())?,
            None => vpk.patch(&entry, &payload, !self.no_backup)?,
        }
        info!(
            "patched {} ({} of {} bytes)",
            entry.path,
            payload.len(),
            entry.total_size()
        );

        Ok(())
    }
}
