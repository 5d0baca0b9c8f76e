pub mod check;
pub mod dump;
pub mod set;

use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::path::PathBuf;
use tf_vpk::VpkArchive;

#[derive(clap::Subcommand)]
pub enum PcfCommands {
    /// Print the element graph of a particle file
    Dump(dump::DumpArgs),
    /// Check that particle files survive a decode and encode round trip
    Check(check::CheckArgs),
    /// Set one attribute of a particle file inside a VPK archive
    Set(set::SetArgs),
}

impl PcfCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            PcfCommands::Dump(dump) => dump.handle(),
            PcfCommands::Check(check) => check.handle(),
            PcfCommands::Set(set) => set.handle(),
        }
    }
}

/// A particle file on disk, or entries of an archive
#[derive(Args)]
pub struct Source {
    /// An input PCF file
    #[arg(short, long, value_name = "FILE", conflicts_with = "archive")]
    file: Option<PathBuf>,

    /// An input `_dir.vpk` file
    #[arg(short, long, value_name = "FILE")]
    archive: Option<PathBuf>,

    /// Logical path or bare file name of an entry of the archive
    #[arg(short, long, value_name = "PATH", requires = "archive")]
    entry: Option<String>,
}

impl Source {
    /// Name and bytes of every particle file the arguments select.
    ///
    /// Without an entry, every `.pcf` of the archive is selected.
    pub fn load(&self) -> Result<Vec<(String, Vec<u8>)>> {
        if let Some(file) = &self.file {
            let bytes = std::fs::read(file)
                .into_diagnostic()
                .context(format!("reading {}", file.display()))?;
            return Ok(vec![(file.display().to_string(), bytes)]);
        }

        let archive = self
            .archive
            .as_ref()
            .ok_or(miette!("either --file or --archive is required"))?;
        let vpk = VpkArchive::open(archive)?;

        let names = match &self.entry {
            Some(entry) if entry.contains('/') => vec![entry.clone()],
            Some(entry) => vec![vpk
                .find_file_path(entry)
                .ok_or(miette!("unable to find {} in {}", entry, archive.display()))?
                .to_owned()],
            None => vpk.find_by_glob("*.pcf")?.map(str::to_owned).collect(),
        };

        names
            .into_iter()
            .map(|name| -> Result<(String, Vec<u8>)> {
                let entry = vpk.by_name(&name)?;
                let bytes = vpk.read(&entry)?;
                Ok((name, bytes))
            })
            .collect()
    }
}
