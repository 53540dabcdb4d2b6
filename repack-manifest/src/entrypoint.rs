//! Entrypoint declarations and their resolution into a build plan and
//! package manifest fields.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A declared entrypoint of the package.
///
/// Use `.` as the name of the default export entrypoint; it becomes the
/// package `main`/`module`/`types` in addition to its `exports` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct EntrypointSpec {
    /// Name of the entrypoint.
    pub name: String,
    /// Relative source file path under the workspace root.
    pub path: String,
    /// Whether this is an executable (`bin`) entrypoint.
    #[serde(default)]
    pub executable: bool,
}

/// The kind of a build-plan entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrypointKind {
    Bin,
    Export,
}

/// One entry of the build plan handed to the external transformer.
///
/// `path` is the original declared source path; the transformer performs its
/// own path resolution.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlanEntry {
    pub kind: EntrypointKind,
    pub name: String,
    pub path: String,
}

/// Conditional import targets of one `exports` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<String>,
    pub default: String,
}

/// One entry of the manifest `exports` map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportEntry {
    pub import: ExportTarget,
}

/// Manifest fields derived from the resolved entrypoints.
///
/// `None` means the field is absent from the package surface; the
/// synthesizer removes such keys from the document rather than writing
/// empty mappings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntrypointFields {
    pub bin: Option<IndexMap<String, String>>,
    pub main: Option<String>,
    pub module: Option<String>,
    pub exports: Option<IndexMap<String, ExportEntry>>,
    pub types: Option<String>,
}

/// Result of resolving the declared entrypoints.
#[derive(Debug, Clone)]
pub struct ResolvedSurface {
    /// Build plan for the external transformer.
    pub plan: Vec<BuildPlanEntry>,
    /// Manifest fields to merge into the package document.
    pub fields: EntrypointFields,
}

/// An entrypoint with its output paths computed.
#[derive(Debug, Clone)]
struct ResolvedEntrypoint {
    name: String,
    path_script: String,
    path_declaration: Option<String>,
}

/// Validate the declared entrypoints and derive the build plan plus the
/// manifest fields.
///
/// Fails when `specs` is empty, when an executable name starts with `.`, or
/// when names repeat within the executable or the export partition. An
/// executable and an export may share a name. The whole resolution either
/// fails or returns a complete, self-consistent result; nothing is mutated.
pub fn resolve_entrypoints(specs: &[EntrypointSpec], declaration: bool) -> Result<ResolvedSurface> {
    if specs.is_empty() {
        return Err(Box::new(Error::EmptyEntrypoints));
    }

    let (executable_specs, export_specs): (Vec<&EntrypointSpec>, Vec<&EntrypointSpec>) =
        specs.iter().partition(|spec| spec.executable);

    for spec in &executable_specs {
        if spec.name.starts_with('.') {
            return Err(Box::new(Error::ExecutableName {
                name: spec.name.clone(),
            }));
        }
    }
    check_distinct(&executable_specs, "executable")?;
    check_distinct(&export_specs, "export")?;

    let resolve = |spec: &EntrypointSpec| ResolvedEntrypoint {
        name: spec.name.clone(),
        path_script: rewrite_source_extension(&spec.path, ".js"),
        path_declaration: declaration.then(|| rewrite_source_extension(&spec.path, ".d.ts")),
    };

    // The `.` export is the package default; it feeds main/module/types and
    // stays out of the lexicographic sort of the named entries.
    let mut named: Vec<ResolvedEntrypoint> = export_specs.iter().map(|s| resolve(s)).collect();
    let default_entry = named
        .iter()
        .position(|entry| entry.name == ".")
        .map(|index| named.remove(index));
    named.sort_by(|a, b| a.name.cmp(&b.name));

    let mut exports: IndexMap<String, ExportEntry> = named
        .iter()
        .map(|entry| (entry.name.clone(), export_entry(entry)))
        .collect();
    if let Some(default) = &default_entry {
        exports.insert(default.name.clone(), export_entry(default));
    }

    let mut executables: Vec<ResolvedEntrypoint> =
        executable_specs.iter().map(|s| resolve(s)).collect();
    executables.sort_by(|a, b| a.name.cmp(&b.name));
    let bin: IndexMap<String, String> = executables
        .iter()
        .map(|entry| (entry.name.clone(), entry.path_script.clone()))
        .collect();

    let fields = EntrypointFields {
        bin: (!bin.is_empty()).then_some(bin),
        main: default_entry.as_ref().map(|e| e.path_script.clone()),
        module: default_entry.as_ref().map(|e| e.path_script.clone()),
        exports: (!exports.is_empty()).then_some(exports),
        types: default_entry.as_ref().and_then(|e| e.path_declaration.clone()),
    };

    let plan = specs
        .iter()
        .map(|spec| BuildPlanEntry {
            kind: if spec.executable {
                EntrypointKind::Bin
            } else {
                EntrypointKind::Export
            },
            name: spec.name.clone(),
            path: spec.path.clone(),
        })
        .collect();

    Ok(ResolvedSurface { plan, fields })
}

fn export_entry(entry: &ResolvedEntrypoint) -> ExportEntry {
    ExportEntry {
        import: ExportTarget {
            types: entry.path_declaration.clone(),
            default: entry.path_script.clone(),
        },
    }
}

fn check_distinct(specs: &[&EntrypointSpec], kind: &'static str) -> Result<()> {
    let mut seen = HashSet::new();
    for spec in specs {
        if !seen.insert(spec.name.as_str()) {
            return Err(Box::new(Error::DuplicateEntrypoint {
                kind,
                name: spec.name.clone(),
            }));
        }
    }
    Ok(())
}

/// Rewrite a trailing `.ts`/`.tsx` source extension to `replacement` and
/// prefix the path with `./`. Paths without a source extension are only
/// prefixed.
fn rewrite_source_extension(path: &str, replacement: &str) -> String {
    match path
        .strip_suffix(".tsx")
        .or_else(|| path.strip_suffix(".ts"))
    {
        Some(stem) => format!("./{stem}{replacement}"),
        None => format!("./{path}"),
    }
}
