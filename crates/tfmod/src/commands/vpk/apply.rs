use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::path::PathBuf;
use tf_vpk::{CancellationToken, VpkArchive};
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Args)]
pub struct ApplyArgs {
    /// An input `_dir.vpk` file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A directory laid out like the archive
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Skip saving the original bytes
    #[arg(long, default_value_t = false)]
    no_backup: bool,
}

impl ApplyArgs {
    pub fn handle(&self) -> Result<()> {
        let vpk = VpkArchive::open(&self.file)?;

        let files = WalkDir::new(&self.directory)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir())
            .collect::<Vec<_>>();

        if files.is_empty() {
            return Err(miette!("directory is empty"));
        }

        let mut items = Vec::with_capacity(files.len());
        for file in files {
            let name = file
                .path()
                .strip_prefix(&self.directory)
                .into_diagnostic()?;
            let logical = name
                .to_str()
                .ok_or(miette!("unable to convert {} to a string", name.display()))?
                .replace('\\', "/");

            if vpk.find(&logical).is_none() {
                warn!("skipping {logical}, not in the archive");
                continue;
            }

            info!("applying {logical}");
            let payload = std::fs::read(file.path())
                .into_diagnostic()
                .context(format!("reading {}", file.path().display()))?;
            items.push((logical, payload));
        }

        let report = vpk.patch_batch(items, !self.no_backup, &CancellationToken::new());
        super::summarize("patched", &report)
    }
}
