//! The package manifest document and its synthesis.

use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entrypoint::EntrypointFields;
use crate::sort::{SortOptions, sort_keys};
use crate::{Error, Result};

/// Canonical top-level key order of a synthesized package manifest. Keys not
/// listed sort after these, alphabetically.
pub const MANIFEST_KEY_ORDER: &[&str] = &[
    "name",
    "version",
    "description",
    "keywords",
    "homepage",
    "bugs",
    "license",
    "author",
    "contributors",
    "funding",
    "files",
    "type",
    "bin",
    "main",
    "module",
    "exports",
    "types",
    "man",
    "repository",
    "scripts",
    "config",
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "bundleDependencies",
    "optionalDependencies",
    "overrides",
    "engines",
    "os",
    "cpu",
    "private",
    "publishConfig",
];

/// An open-ended package manifest document: ordered keys, loosely typed
/// values. Caller-supplied fields pass through verbatim; only the handful of
/// entrypoint fields are ever computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(pub IndexMap<String, Value>);

impl Metadata {
    /// Read a manifest document from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| {
            Box::new(Error::Json {
                path: path.to_path_buf(),
                source: e,
            })
        })
    }

    /// String value of a top-level field, if present.
    pub fn string_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Insert fields from `base` that this document does not have yet.
    /// Existing keys keep their values.
    pub fn fill_missing(&mut self, base: &Metadata) {
        for (key, value) in &base.0 {
            if !self.0.contains_key(key) {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    /// Serialize as pretty JSON with the given indentation, no trailing
    /// newline.
    pub fn to_json_string(&self, indent: &str) -> String {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)
            .expect("a manifest document serializes without error");
        String::from_utf8(buf).expect("the JSON serializer emits UTF-8")
    }
}

impl EntrypointFields {
    /// Apply these fields to a manifest document: present fields overwrite
    /// the document's values, absent fields are removed outright. An empty
    /// package surface never leaves stale `bin`/`exports`/`main` keys behind.
    pub fn apply(&self, document: &mut Metadata) {
        set_or_remove(document, "bin", self.bin.as_ref().map(to_value));
        set_or_remove(
            document,
            "main",
            self.main.as_ref().map(|v| Value::String(v.clone())),
        );
        set_or_remove(
            document,
            "module",
            self.module.as_ref().map(|v| Value::String(v.clone())),
        );
        set_or_remove(document, "exports", self.exports.as_ref().map(to_value));
        set_or_remove(
            document,
            "types",
            self.types.as_ref().map(|v| Value::String(v.clone())),
        );
    }
}

fn set_or_remove(document: &mut Metadata, key: &str, value: Option<Value>) {
    match value {
        Some(value) => {
            document.0.insert(key.to_string(), value);
        }
        None => {
            document.0.shift_remove(key);
        }
    }
}

fn to_value<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).expect("entrypoint fields serialize without error")
}

/// Options for [`synthesize`].
#[derive(Debug, Clone)]
pub struct SynthesizeOptions<'a> {
    /// Indentation of the written document.
    pub indent: &'a str,
    /// Top-level key priority order.
    pub key_order: &'a [&'a str],
}

impl Default for SynthesizeOptions<'_> {
    fn default() -> Self {
        Self {
            indent: "\t",
            key_order: MANIFEST_KEY_ORDER,
        }
    }
}

/// Merge the entrypoint fields into the manifest document at `path` and
/// rewrite it with canonical key order and stable formatting.
///
/// The document is read from disk when present, otherwise started from
/// `base`; fields `base` carries that the on-disk document lacks are filled
/// in either way. `type` is forced to `"module"`. The write goes through a
/// temporary file in the same directory and a rename, so the original
/// document is untouched unless the whole merged document lands.
pub fn synthesize(
    path: &Path,
    base: &Metadata,
    fields: &EntrypointFields,
    options: &SynthesizeOptions<'_>,
) -> Result<Metadata> {
    let mut document = if path.exists() {
        Metadata::read(path)?
    } else {
        Metadata::default()
    };
    document.fill_missing(base);
    fields.apply(&mut document);
    document
        .0
        .insert("type".to_string(), Value::String("module".to_string()));

    let sort_options = SortOptions::with_specified(options.key_order.iter().copied());
    let document = Metadata(sort_keys(&document.0, &sort_options));

    write_atomic(path, &document.to_json_string(options.indent))?;
    Ok(document)
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut file = tempfile::NamedTempFile::new_in(dir.unwrap_or(Path::new(".")))
        .map_err(|e| Error::io(path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::io(path, e))?;
    file.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use indexmap::indexmap;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::entrypoint::{EntrypointSpec, resolve_entrypoints};

    fn specs(raw: &[(&str, &str, bool)]) -> Vec<EntrypointSpec> {
        raw.iter()
            .map(|(name, path, executable)| EntrypointSpec {
                name: name.to_string(),
                path: path.to_string(),
                executable: *executable,
            })
            .collect()
    }

    fn document_keys(document: &Metadata) -> Vec<&str> {
        document.0.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_apply_overwrites_and_removes() {
        let mut document = Metadata(indexmap! {
            "name".to_string() => json!("pkg"),
            "main".to_string() => json!("./stale.js"),
            "bin".to_string() => json!({"old": "./old.js"}),
        });
        let surface = resolve_entrypoints(&specs(&[(".", "mod.ts", false)]), true).unwrap();

        surface.fields.apply(&mut document);

        assert_eq!(document.string_field("main"), Some("./mod.js"));
        assert_eq!(document.string_field("types"), Some("./mod.d.ts"));
        // No executables declared, so the stale bin table goes away.
        assert!(!document.0.contains_key("bin"));
    }

    #[test]
    fn test_synthesize_creates_document_from_base() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        let base = Metadata(indexmap! {
            "version".to_string() => json!("1.2.3"),
            "name".to_string() => json!("demo"),
            "license".to_string() => json!("MIT"),
        });
        let surface = resolve_entrypoints(&specs(&[(".", "mod.ts", false)]), true).unwrap();

        let document =
            synthesize(&path, &base, &surface.fields, &SynthesizeOptions::default()).unwrap();

        assert_eq!(
            document_keys(&document),
            ["name", "version", "license", "type", "main", "module", "exports", "types"]
        );
        assert_eq!(document.string_field("type"), Some("module"));
        assert!(path.is_file());
    }

    #[test]
    fn test_synthesize_merges_existing_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        std::fs::write(
            &path,
            r#"{"dependencies": {"left-pad": "^1.0.0"}, "name": "emitted", "main": "./stale.js"}"#,
        )
        .unwrap();
        let base = Metadata(indexmap! {
            "name".to_string() => json!("configured"),
            "version".to_string() => json!("0.1.0"),
        });
        let surface = resolve_entrypoints(&specs(&[(".", "mod.ts", false)]), false).unwrap();

        let document =
            synthesize(&path, &base, &surface.fields, &SynthesizeOptions::default()).unwrap();

        // The emitted document wins for keys it already carries.
        assert_eq!(document.string_field("name"), Some("emitted"));
        // Base fields the emitted document lacks are filled in.
        assert_eq!(document.string_field("version"), Some("0.1.0"));
        assert_eq!(document.string_field("main"), Some("./mod.js"));
        assert!(document.0.get("dependencies").is_some());
        // No declarations requested.
        assert!(!document.0.contains_key("types"));
    }

    #[test]
    fn test_synthesize_orders_unknown_keys_last() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        let base = Metadata(indexmap! {
            "zebra".to_string() => json!(true),
            "name".to_string() => json!("demo"),
            "aardvark".to_string() => json!(false),
            "engines".to_string() => json!({"node": ">=18"}),
        });
        let surface = resolve_entrypoints(&specs(&[("cli", "cli.ts", true)]), true).unwrap();

        let document =
            synthesize(&path, &base, &surface.fields, &SynthesizeOptions::default()).unwrap();

        assert_eq!(
            document_keys(&document),
            ["name", "type", "bin", "engines", "aardvark", "zebra"]
        );
    }

    #[test]
    fn test_to_json_string_indentation() {
        let document = Metadata(indexmap! {
            "name".to_string() => json!("demo"),
            "engines".to_string() => json!({"node": ">=18"}),
        });

        let rendered = document.to_json_string("  ");
        insta::assert_snapshot!(rendered, @r#"
{
  "name": "demo",
  "engines": {
    "node": ">=18"
  }
}
"#);
    }

    #[test]
    fn test_write_is_atomic_over_existing_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        std::fs::write(&path, "{\"name\": \"old\"}").unwrap();
        let base = Metadata(indexmap! { "name".to_string() => json!("ignored") });
        let surface = resolve_entrypoints(&specs(&[(".", "mod.ts", false)]), true).unwrap();

        synthesize(&path, &base, &surface.fields, &SynthesizeOptions::default()).unwrap();

        let reread = Metadata::read(&path).unwrap();
        assert_eq!(reread.string_field("name"), Some("old"));
        assert_eq!(reread.string_field("type"), Some("module"));
    }

    #[test]
    fn test_read_rejects_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        std::fs::write(&path, "not json").unwrap();

        let err = Metadata::read(&path).unwrap_err();
        assert!(matches!(*err, Error::Json { .. }));
    }
}
