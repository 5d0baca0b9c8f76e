use clap::Args;
use itertools::Itertools;
use miette::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tf_vpk::VpkArchive;

#[derive(Args)]
pub struct ListArgs {
    /// An input `_dir.vpk` file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Only list paths matching this glob, `*` also matches `/`
    #[arg(short, long, default_value = "*")]
    pattern: String,

    /// Show size and storage location of every entry
    #[arg(short, long, default_value_t = false)]
    long: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let vpk = VpkArchive::open(&self.file)?;

        let names = vpk.find_by_glob(&self.pattern)?.collect::<Vec<_>>();
        for name in &names {
            if !self.long {
                println!("{name}");
                continue;
            }

            let entry = vpk.by_name(name)?;
            let location = if entry.is_inline() {
                "dir".to_string()
            } else {
                format!("{:03}", entry.archive_index)
            };
            println!(
                "{:>10} {:>4} {:08x} {}",
                entry.total_size(),
                location.dimmed(),
                entry.crc32,
                name
            );
        }

        if self.long {
            let summary = names
                .iter()
                .map(|name| name.rsplit_once('.').map_or("", |(_, extension)| extension))
                .counts()
                .into_iter()
                .sorted()
                .map(|(extension, count)| format!("{count} .{extension}"))
                .join(", ");
            println!("{} entries ({})", names.len().bold(), summary);
        }

        Ok(())
    }
}
