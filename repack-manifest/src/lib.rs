// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Configuration, entrypoint resolution, and package manifest synthesis for
//! repack.
//!
//! This crate owns everything declarative about a build: the `repack.toml`
//! schema, the validation and resolution of entrypoint declarations into a
//! build plan plus manifest fields, the deterministic key-order utility, and
//! the synthesis of the final `package.json` document.

mod config;
mod entrypoint;
mod error;
mod metadata;
mod module_config;
mod sort;

pub use config::{
    AssetCopy, BuildSection, Config, RepackToml, TransformSection, parse_str,
    parse_str_with_filename,
};
pub use entrypoint::{
    BuildPlanEntry, EntrypointFields, EntrypointKind, EntrypointSpec, ExportEntry, ExportTarget,
    ResolvedSurface, resolve_entrypoints,
};
pub use error::{Error, Result};
pub use metadata::{MANIFEST_KEY_ORDER, Metadata, SynthesizeOptions, synthesize};
pub use module_config::ModuleConfig;
pub use sort::{RestPlacement, SortOptions, SortOrder, sort_keys};
