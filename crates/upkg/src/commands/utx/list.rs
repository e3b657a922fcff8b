use clap::{Args, ValueEnum};
use miette::{IntoDiagnostic, Result};
use owo_colors::{OwoColorize, Stream::Stdout};
use std::{borrow::Cow, path::PathBuf};
use upkg_utx::{ObjectRef, Package};

use super::open_package;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Table {
    #[default]
    Names,
    Exports,
    Imports,
}

#[derive(Args)]
pub struct ListArgs {
    /// An input UTX file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// The table to print
    #[arg(short, long, value_enum, default_value_t)]
    table: Table,

    /// Print the table as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let package = open_package(&self.file)?;

        if self.json {
            let json = match self.table {
                Table::Names => serde_json::to_string_pretty(package.names()),
                Table::Exports => serde_json::to_string_pretty(package.exports()),
                Table::Imports => serde_json::to_string_pretty(package.imports()),
            }
            .into_diagnostic()?;
            println!("{json}");
            return Ok(());
        }

        match self.table {
            Table::Names => {
                for (i, entry) in package.names().iter().enumerate() {
                    println!(
                        "{i:>5} {:#010x} {}",
                        entry.flags,
                        entry.name().if_supports_color(Stdout, |n| n.green())
                    );
                }
            }
            Table::Exports => {
                for (i, export) in package.exports().iter().enumerate() {
                    println!(
                        "{i:>5} {} class={} super={} group={} size={} offset={:#x}",
                        name(&package, export.object_name).if_supports_color(Stdout, |n| n.green()),
                        reference(&package, export.class),
                        reference(&package, export.super_ref),
                        export.group,
                        export.serial_size,
                        export.serial_offset,
                    );
                }
            }
            Table::Imports => {
                for (i, import) in package.imports().iter().enumerate() {
                    println!(
                        "{i:>5} {} class={}.{} package={}",
                        name(&package, import.object_name).if_supports_color(Stdout, |n| n.green()),
                        name(&package, import.class_package),
                        name(&package, import.class_name),
                        reference(&package, import.package),
                    );
                }
            }
        }

        Ok(())
    }
}

fn name(package: &Package, index: i32) -> Cow<'_, str> {
    package
        .name_of(index)
        .map(|n| n.name())
        .unwrap_or_else(|_| Cow::Owned(format!("<name {index}>")))
}

fn reference(package: &Package, r: ObjectRef) -> String {
    let object_name = match r {
        ObjectRef::Null => return r.to_string(),
        ObjectRef::Import(i) => package.imports().get(i as usize).map(|e| e.object_name),
        ObjectRef::Export(i) => package.exports().get(i as usize).map(|e| e.object_name),
    };

    match object_name {
        Some(index) => format!("{r}({})", name(package, index)),
        None => r.to_string(),
    }
}
