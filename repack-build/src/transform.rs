//! The external transform collaborator boundary.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use eyre::{Result, WrapErr, bail};
use repack_manifest::BuildPlanEntry;
use serde::Serialize;

/// Everything the external compiler needs for one run.
///
/// The transformer is expected to populate two regions under `out_dir`:
/// module-format output nested under `esm/`, and other artifact kinds at the
/// root itself.
#[derive(Debug, Serialize)]
pub struct TransformRequest<'a> {
    /// Entrypoints to compile, with their original declared source paths.
    pub entrypoints: &'a [BuildPlanEntry],
    /// Output root, relative to the workspace root.
    pub out_dir: &'a Path,
    /// Whether declaration files are expected.
    pub declaration: bool,
    /// Free-form options forwarded verbatim.
    pub options: &'a serde_json::Value,
}

/// The source-to-JavaScript compiler collaborator.
pub trait Transformer {
    /// Compile the requested entrypoints into the output directory.
    fn transform(&self, request: &TransformRequest<'_>) -> Result<()>;
}

/// Runs an external command with the serialized transform request.
///
/// The request is written to a temporary JSON plan file whose path is
/// appended after the configured arguments. A non-zero exit status fails the
/// build.
pub struct CommandTransformer {
    program: String,
    args: Vec<String>,
}

impl CommandTransformer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Transformer for CommandTransformer {
    fn transform(&self, request: &TransformRequest<'_>) -> Result<()> {
        let mut plan_file =
            tempfile::NamedTempFile::new().wrap_err("failed to create the plan file")?;
        serde_json::to_writer_pretty(&mut plan_file, request)
            .wrap_err("failed to serialize the transform request")?;
        plan_file
            .flush()
            .wrap_err("failed to flush the plan file")?;

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(plan_file.path())
            .status()
            .wrap_err_with(|| format!("failed to launch transformer '{}'", self.program))?;
        if !status.success() {
            bail!("transformer '{}' exited with {status}", self.program);
        }
        Ok(())
    }
}
