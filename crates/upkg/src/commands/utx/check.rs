use clap::Args;
use miette::{miette, Result};
use owo_colors::{OwoColorize, Stream::Stdout};
use std::path::PathBuf;
use tracing::{debug, error, info};
use upkg_utx::{load_utx_path, LoadTarget};
use walkdir::WalkDir;

/// Stands in for the image a package is loaded into
struct LoggingTarget<'a> {
    path: &'a PathBuf,
}

impl LoadTarget for LoggingTarget<'_> {
    fn finalize(&mut self) -> upkg_utx::error::Result<()> {
        debug!("finalized {}", self.path.display());
        Ok(())
    }
}

#[derive(Args)]
pub struct CheckArgs {
    /// Packages, or directories to search for packages
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// File extension of packages inside directories
    #[arg(long, default_value = "utx")]
    extension: String,
}

impl CheckArgs {
    pub fn handle(&self) -> Result<()> {
        let files = self
            .paths
            .iter()
            .flat_map(|p| WalkDir::new(p).into_iter().filter_map(|e| e.ok()))
            .filter(|e| !e.file_type().is_dir())
            .filter(|e| {
                e.path()
                    .extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case(self.extension.as_str()))
            })
            .map(|e| e.into_path())
            .collect::<Vec<_>>();

        if files.is_empty() {
            return Err(miette!("no packages found"));
        }

        let mut failed = 0;
        for path in &files {
            let mut target = LoggingTarget { path };
            match load_utx_path(path, Some(&mut target)) {
                Ok(summary) => {
                    info!(
                        textures = summary.texture_exports.len(),
                        "loaded {}",
                        path.display()
                    );
                    println!("{} {}", "ok".if_supports_color(Stdout, |s| s.green()), path.display());
                }
                Err(e) => {
                    error!("{}: {e}", path.display());
                    println!("{} {}", "failed".if_supports_color(Stdout, |s| s.red()), path.display());
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(miette!("{failed} of {} packages failed to load", files.len()));
        }

        Ok(())
    }
}
