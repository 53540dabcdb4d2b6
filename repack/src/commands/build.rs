use std::path::PathBuf;

use clap::Args;
use eyre::{Result, WrapErr, bail};
use repack_build::{AssetSpec, BuildOptions, CommandTransformer, build};
use repack_manifest::{AssetCopy, RepackToml, resolve_entrypoints};

use super::{UnwrapOrExit, load_entrypoints, load_metadata};
use crate::reports::{BuildSummary, Report, TerminalOutput};

#[derive(Args)]
pub struct BuildCommand {
    /// Path to repack.toml (defaults to ./repack.toml)
    #[arg(short, long, default_value = "repack.toml")]
    pub config: PathBuf,

    /// Workspace root (overrides repack.toml setting)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Output directory (overrides repack.toml setting)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip declaration (.d.ts) entrypoint paths
    #[arg(long)]
    pub no_declaration: bool,
}

impl BuildCommand {
    /// Run the build command
    pub fn run(&self) -> Result<()> {
        let repack_toml = RepackToml::open(&self.config).unwrap_or_exit();
        let config = repack_toml.config();

        let root = self
            .root
            .clone()
            .unwrap_or_else(|| config.build.root.clone());
        let entrypoints = load_entrypoints(config, &root).unwrap_or_exit();
        let metadata = load_metadata(config, &root).unwrap_or_exit();
        let declaration = !self.no_declaration && config.build.declaration;

        // Surface validation problems with pretty reporting before any
        // filesystem work; the pipeline re-validates as its first step.
        resolve_entrypoints(&entrypoints, declaration).unwrap_or_exit();

        let Some(transform) = &config.transform else {
            bail!(
                "{} has no [transform] section; nothing can compile the entrypoints",
                self.config.display()
            );
        };
        let transformer = CommandTransformer::new(&transform.command, transform.args.clone());

        let package_name = metadata.string_field("name").map(str::to_string);
        let package_version = metadata.string_field("version").map(str::to_string);

        let mut options = BuildOptions::new(entrypoints, metadata);
        options.root = root;
        options.output_dir = self
            .output
            .clone()
            .unwrap_or_else(|| config.build.output_dir.clone());
        options.clean_output = config.build.clean_output;
        options.declaration = declaration;
        options.transform_options = config.transform_options();
        options.assets = config.assets.iter().map(asset_spec).collect();

        let report = build(&options, &transformer).wrap_err("build failed")?;

        let summary = BuildSummary {
            package_name,
            package_version,
            relocated: report.relocated,
            warnings: report.warnings,
            output_dir: options.output_dir,
            manifest_path: report.manifest_path,
        };
        summary.render(&mut TerminalOutput::new());
        Ok(())
    }
}

fn asset_spec(asset: &AssetCopy) -> AssetSpec {
    match asset {
        AssetCopy::Path(path) => AssetSpec {
            from: PathBuf::from(path),
            to: PathBuf::from(path),
        },
        AssetCopy::FromTo { from, to } => AssetSpec {
            from: PathBuf::from(from),
            to: PathBuf::from(to.as_deref().unwrap_or(from)),
        },
    }
}
