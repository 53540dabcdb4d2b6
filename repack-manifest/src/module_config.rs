//! Package metadata sourced from a `deno.json` module config.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::entrypoint::EntrypointSpec;
use crate::{Error, Result};

/// A parsed `deno.json`, exposing the properties repack consumes.
#[derive(Debug)]
pub struct ModuleConfig {
    path: PathBuf,
    document: serde_json::Map<String, Value>,
}

impl ModuleConfig {
    /// Open and parse a module config file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let document: Value = serde_json::from_str(&content).map_err(|e| {
            Box::new(Error::Json {
                path: path.clone(),
                source: e,
            })
        })?;
        let Value::Object(document) = document else {
            return Err(Error::config(format!(
                "'{}' is not a valid configuration file",
                path.display()
            )));
        };
        Ok(Self { path, document })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The declared package name.
    pub fn name(&self) -> Result<&str> {
        self.string_property("name")
    }

    /// The declared package version.
    pub fn version(&self) -> Result<&str> {
        self.string_property("version")
    }

    /// Entrypoint specs derived from the `exports` map. Paths lose their
    /// leading `./`; every entry is a (non-executable) export.
    pub fn exports(&self) -> Result<Vec<EntrypointSpec>> {
        let Some(Value::Object(exports)) = self.document.get("exports") else {
            return Err(Box::new(Error::ModuleConfig {
                path: self.path.clone(),
                property: "exports".to_string(),
            }));
        };
        exports
            .iter()
            .map(|(name, value)| {
                let path = value.as_str().ok_or_else(|| {
                    Error::config(format!(
                        "{} (property 'exports.{}' of '{}') is not a valid export",
                        value,
                        name,
                        self.path.display()
                    ))
                })?;
                Ok(EntrypointSpec {
                    name: name.clone(),
                    path: path.strip_prefix("./").unwrap_or(path).to_string(),
                    executable: false,
                })
            })
            .collect()
    }

    fn string_property(&self, property: &str) -> Result<&str> {
        self.document
            .get(property)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Box::new(Error::ModuleConfig {
                    path: self.path.clone(),
                    property: property.to_string(),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write_config(content: &str) -> (TempDir, ModuleConfig) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("deno.json");
        std::fs::write(&path, content).unwrap();
        let config = ModuleConfig::open(&path).unwrap();
        (temp, config)
    }

    #[test]
    fn test_reads_name_version_and_exports() {
        let (_temp, config) = write_config(
            r#"{
                "name": "@scope/pkg",
                "version": "2.0.1",
                "exports": {
                    ".": "./mod.ts",
                    "./helpers": "./src/helpers.ts"
                }
            }"#,
        );

        assert_eq!(config.name().unwrap(), "@scope/pkg");
        assert_eq!(config.version().unwrap(), "2.0.1");

        let exports = config.exports().unwrap();
        assert_eq!(exports.len(), 2);
        assert_eq!(exports[0].name, ".");
        assert_eq!(exports[0].path, "mod.ts");
        assert!(!exports[0].executable);
        assert_eq!(exports[1].path, "src/helpers.ts");
    }

    #[test]
    fn test_missing_name_is_a_config_error() {
        let (_temp, config) = write_config(r#"{"version": "1.0.0"}"#);

        let err = config.name().unwrap_err();
        assert!(matches!(*err, Error::ModuleConfig { ref property, .. } if property == "name"));
    }

    #[test]
    fn test_missing_exports_is_a_config_error() {
        let (_temp, config) = write_config(r#"{"name": "x", "version": "1.0.0"}"#);

        let err = config.exports().unwrap_err();
        assert!(matches!(*err, Error::ModuleConfig { ref property, .. } if property == "exports"));
    }

    #[test]
    fn test_non_string_export_rejected() {
        let (_temp, config) = write_config(r#"{"exports": {".": {"import": "./mod.ts"}}}"#);

        let err = config.exports().unwrap_err();
        assert!(matches!(*err, Error::Config { .. }));
    }

    #[test]
    fn test_non_object_document_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("deno.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = ModuleConfig::open(&path).unwrap_err();
        assert!(matches!(*err, Error::Config { .. }));
    }
}
