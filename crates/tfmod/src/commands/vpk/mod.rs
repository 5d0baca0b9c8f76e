pub mod apply;
pub mod extract;
pub mod list;
pub mod patch;
pub mod verify;

use miette::{miette, Result};
use owo_colors::OwoColorize;
use tf_vpk::BatchReport;

#[derive(clap::Subcommand)]
pub enum VpkCommands {
    /// List the entries of a VPK archive
    List(list::ListArgs),
    /// Extract entries of a VPK archive into a directory
    Extract(extract::ExtractArgs),
    /// Overwrite one entry with the contents of a file
    Patch(patch::PatchArgs),
    /// Overwrite every entry that has a counterpart in a directory
    Apply(apply::ApplyArgs),
    /// Compare entries against their recorded checksums
    Verify(verify::VerifyArgs),
}

impl VpkCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            VpkCommands::List(list) => list.handle(),
            VpkCommands::Extract(extract) => extract.handle(),
            VpkCommands::Patch(patch) => patch.handle(),
            VpkCommands::Apply(apply) => apply.handle(),
            VpkCommands::Verify(verify) => verify.handle(),
        }
    }
}

/// Print a batch summary, failing when any entry failed or the batch was interrupted.
fn summarize(verb: &str, report: &BatchReport) -> Result<()> {
    for (path, err) in &report.failed {
        println!("❌ {}: {}", path.red(), err);
    }
    println!(
        "{} {} {}",
        verb,
        report.completed.len().green(),
        if report.completed.len() == 1 { "entry" } else { "entries" }
    );

    if report.cancelled {
        return Err(miette!("interrupted after {} entries", report.completed.len()));
    }
    if !report.failed.is_empty() {
        return Err(miette!("{} entries failed", report.failed.len()));
    }
    Ok(())
}
