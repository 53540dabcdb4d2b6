//! The repack.toml configuration file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::entrypoint::EntrypointSpec;
use crate::metadata::Metadata;
use crate::{Error, Result};

/// Root schema for repack.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Package metadata passed through verbatim to the synthesized manifest.
    #[serde(default)]
    pub package: toml::Table,

    /// Entrypoints of the package.
    #[serde(default)]
    pub entrypoints: Vec<EntrypointSpec>,

    /// Build settings.
    #[serde(default)]
    pub build: BuildSection,

    /// The external transform command.
    pub transform: Option<TransformSection>,

    /// Assets copied into the output directory after the build.
    #[serde(default)]
    pub assets: Vec<AssetCopy>,
}

/// The `[build]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Output directory, relative to the workspace root.
    pub output_dir: PathBuf,
    /// Whether to compute declaration (`.d.ts`) entrypoint paths.
    pub declaration: bool,
    /// Whether to empty the output directory before the transform.
    pub clean_output: bool,
    /// Workspace root the whole build runs under.
    pub root: PathBuf,
    /// Optional deno.json to fill in package name, version, and entrypoints.
    pub module_config: Option<PathBuf>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("nodejs"),
            declaration: true,
            clean_output: false,
            root: PathBuf::from("."),
            module_config: None,
        }
    }
}

/// The `[transform]` section: how to invoke the external compiler.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformSection {
    /// Program to run.
    pub command: String,
    /// Arguments placed before the generated plan-file path.
    #[serde(default)]
    pub args: Vec<String>,
    /// Free-form options forwarded to the transformer inside the plan file.
    #[serde(default)]
    pub options: toml::Table,
}

/// One asset entry: a bare path copied to the same relative location, or an
/// explicit from/to pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AssetCopy {
    Path(String),
    FromTo { from: String, to: Option<String> },
}

impl Config {
    /// Convert the `[package]` table into a manifest document.
    pub fn metadata_document(&self) -> Metadata {
        Metadata(
            self.package
                .iter()
                .map(|(key, value)| (key.clone(), toml_to_json(value.clone())))
                .collect(),
        )
    }

    /// Convert the `[transform]` options table into a JSON value for the
    /// plan file.
    pub fn transform_options(&self) -> Value {
        match &self.transform {
            Some(section) => toml_to_json(toml::Value::Table(section.options.clone())),
            None => Value::Null,
        }
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

/// A repack.toml file with both raw content and parsed configuration.
pub struct RepackToml {
    path: PathBuf,
    content: String,
    config: Config,
}

impl RepackToml {
    /// Open and parse a repack.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let filename = path.display().to_string();
        let config = parse_str_with_filename(&content, &filename)?;

        Ok(Self {
            path,
            content,
            config,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the raw content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the parsed configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Parse a repack.toml from a string (uses "repack.toml" as the filename)
pub fn parse_str(content: &str) -> Result<Config> {
    parse_str_with_filename(content, "repack.toml")
}

/// Parse a repack.toml from a string with a custom filename for error
/// reporting
pub fn parse_str_with_filename(content: &str, filename: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| Error::parse(e, content, filename))
}
