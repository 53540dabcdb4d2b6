//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// One validated entrypoint, as declared.
#[derive(Debug)]
pub struct EntrypointLine {
    pub executable: bool,
    pub name: String,
    pub path: String,
}

/// Report data from a successful check.
#[derive(Debug)]
pub struct CheckSummary {
    /// Path of the validated configuration file.
    pub config_path: PathBuf,

    /// Package name from the manifest document.
    pub package_name: Option<String>,

    /// Package version from the manifest document.
    pub package_version: Option<String>,

    /// Whether declaration paths will be generated.
    pub declaration: bool,

    /// The validated entrypoints.
    pub entrypoints: Vec<EntrypointLine>,
}

impl Report for CheckSummary {
    fn render(&self, out: &mut dyn Output) {
        out.preformatted(&format!("✓ {} is valid", self.config_path.display()));
        out.newline();

        if let Some(name) = &self.package_name {
            let version = self.package_version.as_deref().unwrap_or("0.0.0");
            out.preformatted(&format!("{} v{}", name, version));
            out.newline();
        }

        out.section(&format!("Entrypoints ({})", self.entrypoints.len()));
        for entry in &self.entrypoints {
            let kind = if entry.executable { "bin" } else { "export" };
            out.list_item(&format!("{} {} ({})", entry.name, entry.path, kind));
        }
        out.newline();

        out.key_value(
            "Declarations",
            if self.declaration { "enabled" } else { "disabled" },
        );
    }
}
