use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use repack_manifest::{EntrypointKind, RepackToml, resolve_entrypoints};

use super::{UnwrapOrExit, load_entrypoints, load_metadata};
use crate::reports::{CheckSummary, EntrypointLine, Report, TerminalOutput};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to repack.toml (defaults to ./repack.toml)
    #[arg(short, long, default_value = "repack.toml")]
    pub config: PathBuf,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let repack_toml = RepackToml::open(&self.config).unwrap_or_exit();
        let config = repack_toml.config();

        let root = config.build.root.clone();
        let entrypoints = load_entrypoints(config, &root).unwrap_or_exit();
        let metadata = load_metadata(config, &root).unwrap_or_exit();
        let surface =
            resolve_entrypoints(&entrypoints, config.build.declaration).unwrap_or_exit();

        let summary = CheckSummary {
            config_path: self.config.clone(),
            package_name: metadata.string_field("name").map(str::to_string),
            package_version: metadata.string_field("version").map(str::to_string),
            declaration: config.build.declaration,
            entrypoints: surface
                .plan
                .iter()
                .map(|entry| EntrypointLine {
                    executable: entry.kind == EntrypointKind::Bin,
                    name: entry.name.clone(),
                    path: entry.path.clone(),
                })
                .collect(),
        };
        summary.render(&mut TerminalOutput::new());
        Ok(())
    }
}
