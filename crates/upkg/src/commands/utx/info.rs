use clap::Args;
use itertools::Itertools;
use miette::Result;
use std::path::PathBuf;

use super::open_package;

#[derive(Args)]
pub struct InfoArgs {
    /// An input UTX file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let package = open_package(&self.file)?;
        let header = package.header();

        println!("{}", self.file.display());
        println!("  version:      {}", header.version);
        println!("  license mode: {}", header.license_mode);
        println!("  flags:        {:#010x}", header.flags);
        println!(
            "  names:        {} at {:#x}",
            header.name_count, header.name_offset
        );
        println!(
            "  exports:      {} at {:#x}",
            header.export_count, header.export_offset
        );
        println!(
            "  imports:      {} at {:#x}",
            header.import_count, header.import_offset
        );

        let textures = package.texture_exports()?;
        if textures.is_empty() {
            println!("  textures:     none");
        } else {
            println!(
                "  textures:     {}",
                textures.iter().map(|i| format!("export:{i}")).join(", ")
            );
        }

        Ok(())
    }
}
