//! The build pipeline: validate, transform, clean up, relocate, synthesize.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr, bail};
use repack_core::{
    Move, Relocation, copy_path, empty_dir, ensure_dir, prune_empty_dirs, remove_path, snapshot,
};
use repack_manifest::{SynthesizeOptions, resolve_entrypoints, synthesize};

use crate::cwd::ScopedCwd;
use crate::options::BuildOptions;
use crate::transform::{TransformRequest, Transformer};

/// Subdirectory that receives the transformer's module-format output.
const MODULE_OUTPUT_SUBDIR: &str = "esm";

/// Transformer byproducts removed from the output root before relocation.
const CLEANUP_SUBPATHS: &[&str] = &[
    ".npmignore",
    "esm/package.json",
    "esm/package-lock.json",
    "package-lock.json",
    "script",
    "src",
    "types",
];

/// Summary of a completed build.
#[derive(Debug)]
pub struct BuildReport {
    /// Files relocated from the module output subtree into the output root.
    pub relocated: usize,
    /// Best-effort cleanup problems; never fatal.
    pub warnings: Vec<String>,
    /// Path of the synthesized manifest, relative to the workspace root.
    pub manifest_path: PathBuf,
}

/// Run the whole packaging pipeline.
///
/// Ordering is strict: validate → transform → cleanup → relocate →
/// synthesize manifest → copy assets. Validation happens before any
/// filesystem mutation, so an invalid surface leaves the output root
/// untouched. The working directory is scoped to `options.root` for the
/// duration and restored on every exit path. Once the transformer has run,
/// a fatal error may leave the output root partially relocated; individual
/// phases are consistent, the run as a whole is not atomic.
pub fn build(options: &BuildOptions, transformer: &dyn Transformer) -> Result<BuildReport> {
    let surface = resolve_entrypoints(&options.entrypoints, options.declaration)?;

    let _cwd = ScopedCwd::enter(&options.root)?;

    ensure_dir(&options.output_dir)?;
    if options.clean_output {
        empty_dir(&options.output_dir)?;
    }

    let request = TransformRequest {
        entrypoints: &surface.plan,
        out_dir: &options.output_dir,
        declaration: options.declaration,
        options: &options.transform_options,
    };
    transformer
        .transform(&request)
        .wrap_err("transform failed")?;

    let mut warnings = Vec::new();
    cleanup_byproducts(&options.output_dir, &mut warnings);

    let relocated = flatten_module_output(&options.output_dir)?;

    let manifest_path = options.output_dir.join("package.json");
    synthesize(
        &manifest_path,
        &options.metadata,
        &surface.fields,
        &SynthesizeOptions {
            indent: &options.indent,
            ..SynthesizeOptions::default()
        },
    )?;

    copy_assets(&options.output_dir, &options.assets)?;

    Ok(BuildReport {
        relocated,
        warnings,
        manifest_path,
    })
}

/// Remove known transformer byproducts. Missing paths are fine; a removal
/// failure becomes a warning and the remaining paths are still attempted.
fn cleanup_byproducts(out_dir: &Path, warnings: &mut Vec<String>) {
    for subpath in CLEANUP_SUBPATHS {
        let path = out_dir.join(subpath);
        if let Err(err) = remove_path(&path) {
            warnings.push(format!("failed to remove {}: {err:#}", path.display()));
        }
    }
}

/// Move every file under the module output subtree up into the output root,
/// then drop the emptied subtree skeleton.
fn flatten_module_output(out_dir: &Path) -> Result<usize> {
    let module_dir = out_dir.join(MODULE_OUTPUT_SUBDIR);
    if !module_dir.is_dir() {
        return Ok(0);
    }

    // One immutable snapshot drives both phases; live directory state is
    // never re-read mid-stage.
    let entries = snapshot(&module_dir, true)?;
    let relocation = Relocation::prepare(out_dir, &entries);
    let moves: Vec<Move> = entries
        .iter()
        .filter(|entry| entry.is_file)
        .map(|entry| Move {
            source: entry.path_absolute.clone(),
            destination: out_dir.join(&entry.path_relative),
        })
        .collect();

    let staged = relocation.stage(&moves).wrap_err("staging failed")?;
    let committed = relocation.commit().wrap_err("commit failed")?;
    if committed != staged.len() {
        bail!(
            "relocation committed {committed} files but staged {}",
            staged.len()
        );
    }

    prune_empty_dirs(&module_dir)?;
    Ok(staged.len())
}

fn copy_assets(out_dir: &Path, assets: &[crate::options::AssetSpec]) -> Result<()> {
    for asset in assets {
        copy_path(&asset.from, &out_dir.join(&asset.to))
            .wrap_err_with(|| format!("failed to copy asset {}", asset.from.display()))?;
    }
    Ok(())
}
