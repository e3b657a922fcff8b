pub mod check;
pub mod info;
pub mod list;

use std::{fs::File, io::BufReader, path::Path};

use miette::{Context, IntoDiagnostic, Result};
use upkg_utx::Package;

#[derive(clap::Subcommand)]
pub enum UtxCommands {
    /// Show the header and texture exports of a package
    Info(info::InfoArgs),
    /// Print one of the tables of a package
    List(list::ListArgs),
    /// Load every package found in the given paths
    Check(check::CheckArgs),
}

impl UtxCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            UtxCommands::Info(info) => info.handle(),
            UtxCommands::List(list) => list.handle(),
            UtxCommands::Check(check) => check.handle(),
        }
    }
}

pub(crate) fn open_package(path: &Path) -> Result<Package> {
    let f = File::open(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))?;

    Package::read(&mut BufReader::new(f)).context(format!("reading {}", path.display()))
}
