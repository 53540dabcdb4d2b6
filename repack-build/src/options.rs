//! Build pipeline options.

use std::path::PathBuf;

use repack_manifest::{EntrypointSpec, Metadata};
use serde_json::Value;

/// The conventional output directory name.
pub const DEFAULT_OUTPUT_DIR: &str = "nodejs";

/// Options for one pipeline run, usually derived from a repack.toml by the
/// CLI.
#[derive(Debug)]
pub struct BuildOptions {
    /// Workspace root the pipeline runs under. The process working directory
    /// is scoped to this path for the whole run.
    pub root: PathBuf,
    /// Output directory, relative to the root.
    pub output_dir: PathBuf,
    /// Whether to empty the output directory before the transform.
    pub clean_output: bool,
    /// Whether to compute declaration (`.d.ts`) entrypoint paths.
    pub declaration: bool,
    /// Declared entrypoints.
    pub entrypoints: Vec<EntrypointSpec>,
    /// Base manifest document; fields the transformer does not emit are
    /// filled from here.
    pub metadata: Metadata,
    /// Free-form options forwarded to the transformer.
    pub transform_options: Value,
    /// Indentation of the synthesized manifest.
    pub indent: String,
    /// Assets copied into the output directory after the build.
    pub assets: Vec<AssetSpec>,
}

impl BuildOptions {
    /// Options with the conventional defaults for the given entrypoints and
    /// metadata.
    pub fn new(entrypoints: Vec<EntrypointSpec>, metadata: Metadata) -> Self {
        Self {
            root: PathBuf::from("."),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            clean_output: false,
            declaration: true,
            entrypoints,
            metadata,
            transform_options: Value::Null,
            indent: "\t".to_string(),
            assets: Vec::new(),
        }
    }
}

/// A post-build asset copy, relative to the workspace root and the output
/// directory respectively.
#[derive(Debug, Clone)]
pub struct AssetSpec {
    pub from: PathBuf,
    pub to: PathBuf,
}
