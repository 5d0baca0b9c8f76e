use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::{path::PathBuf, sync::Arc};
use tf_vpk::{spawn_extract, CancellationToken, VpkArchive};
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input `_dir.vpk` file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Only extract paths matching this glob, `*` also matches `/`
    #[arg(short, long, default_value = "*")]
    pattern: String,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let vpk = Arc::new(VpkArchive::open(&self.file)?);
        let paths = vpk
            .find_by_glob(&self.pattern)?
            .map(str::to_owned)
            .collect::<Vec<_>>();
        info!("extracting {} entries to {}", paths.len(), self.directory.display());

        let token = CancellationToken::new();
        let interrupt = token.clone();
        ctrlc::set_handler(move || {
            eprintln!("\nInterrupted, finishing the current entry");
            interrupt.cancel();
        })
        .into_diagnostic()
        .context("installing ctrl-c handler")?;

        let handle = spawn_extract(vpk, paths, self.directory.clone(), token);
        let report = handle.wait()?;

        super::summarize("extracted", &report)
    }
}
