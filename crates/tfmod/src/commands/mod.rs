pub mod pcf;
pub mod vpk;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle VPK archives
    Vpk {
        #[command(subcommand)]
        command: vpk::VpkCommands,
    },
    /// Handle PCF particle files
    Pcf {
        #[command(subcommand)]
        command: pcf::PcfCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Vpk { command } => command.handle(),
            Commands::Pcf { command } => command.handle(),
        }
    }
}
