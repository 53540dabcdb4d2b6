//! Build command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from a completed build.
#[derive(Debug)]
pub struct BuildSummary {
    /// Package name from the manifest document.
    pub package_name: Option<String>,

    /// Package version from the manifest document.
    pub package_version: Option<String>,

    /// Files relocated into the output root.
    pub relocated: usize,

    /// Best-effort cleanup problems.
    pub warnings: Vec<String>,

    /// Output directory, relative to the workspace root.
    pub output_dir: PathBuf,

    /// Synthesized manifest path, relative to the workspace root.
    pub manifest_path: PathBuf,
}

impl Report for BuildSummary {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }

        if let Some(name) = &self.package_name {
            let version = self.package_version.as_deref().unwrap_or("0.0.0");
            out.preformatted(&format!("{} v{}", name, version));
            out.newline();
        }

        out.key_value("Packaged", &self.output_dir.display().to_string());
        out.key_value(
            "Relocated files",
            &self.relocated.to_string(),
        );
        out.key_value("Manifest", &self.manifest_path.display().to_string());
    }
}
