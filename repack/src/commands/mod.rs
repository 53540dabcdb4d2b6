mod build;
mod check;
mod completions;

use std::path::Path;

use build::BuildCommand;
use check::CheckCommand;
use clap::{Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use repack_manifest::{Config, EntrypointSpec, Error, Metadata, ModuleConfig};

/// Extension trait for exiting on configuration errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for repack_manifest::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "repack")]
#[command(version)]
#[command(about = "Package a module source tree into a publishable npm package")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Build(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the entrypoints and assemble the package
    Build(BuildCommand),

    /// Validate repack.toml and the entrypoint surface without building
    Check(CheckCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Entrypoints from repack.toml, falling back to the module config's
/// `exports` map when none are declared.
pub(crate) fn load_entrypoints(
    config: &Config,
    root: &Path,
) -> repack_manifest::Result<Vec<EntrypointSpec>> {
    if !config.entrypoints.is_empty() {
        return Ok(config.entrypoints.clone());
    }
    match &config.build.module_config {
        Some(path) => ModuleConfig::open(root.join(path))?.exports(),
        None => Ok(Vec::new()),
    }
}

/// The base manifest document: the `[package]` table, with name and version
/// filled from the module config when absent.
pub(crate) fn load_metadata(config: &Config, root: &Path) -> repack_manifest::Result<Metadata> {
    let mut metadata = config.metadata_document();
    let missing_name = metadata.string_field("name").is_none();
    let missing_version = metadata.string_field("version").is_none();
    if missing_name || missing_version {
        let Some(path) = &config.build.module_config else {
            return Err(Error::config(
                "package name and version must be set under [package], or sourced through [build] module_config",
            ));
        };
        let module = ModuleConfig::open(root.join(path))?;
        if missing_name {
            let name = module.name()?.to_string();
            metadata.0.insert("name".to_string(), name.into());
        }
        if missing_version {
            let version = module.version()?.to_string();
            metadata.0.insert("version".to_string(), version.into());
        }
    }
    Ok(metadata)
}
