use clap::Args;
use miette::{miette, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tf_vpk::VpkArchive;

#[derive(Args)]
pub struct VerifyArgs {
    /// An input `_dir.vpk` file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Only verify paths matching this glob
    #[arg(short, long, default_value = "*")]
    pattern: String,
}

impl VerifyArgs {
    pub fn handle(&self) -> Result<()> {
        let vpk = VpkArchive::open(&self.file)?;

        let mut mismatched = 0usize;
        for name in vpk.find_by_glob(&self.pattern)? {
            let entry = vpk.by_name(name)?;
            if !vpk.verify(&entry)? {
                mismatched += 1;
                println!("🔃 {}", name.yellow());
            }
        }

        if mismatched > 0 {
            return Err(miette!(
                "{mismatched} entries differ from their recorded checksum"
            ));
        }
        println!("{}", "all entries match".green());
        Ok(())
    }
}
