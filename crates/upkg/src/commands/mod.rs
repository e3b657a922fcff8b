pub mod utx;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle UTX packages
    Utx {
        #[command(subcommand)]
        command: utx::UtxCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Utx { command } => command.handle(),
        }
    }
}
