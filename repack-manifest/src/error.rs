use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for repack-manifest operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("check that the file exists and is readable"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse repack.toml")]
    #[diagnostic(code(repack::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse '{path}'")]
    #[diagnostic(code(repack::json_error))]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(repack::config_error))]
    Config { message: String },

    #[error("'{path}' does not contain a valid '{property}' property")]
    #[diagnostic(code(repack::module_config))]
    ModuleConfig { path: PathBuf, property: String },

    #[error("no entrypoints declared")]
    #[diagnostic(
        code(repack::no_entrypoints),
        help("add at least one [[entrypoints]] entry, or point [build] module_config at a deno.json with an `exports` map")
    )]
    EmptyEntrypoints,

    #[error("duplicate {kind} entrypoint '{name}'")]
    #[diagnostic(
        code(repack::duplicate_entrypoint),
        help("entrypoint names must be unique within the {kind} partition")
    )]
    DuplicateEntrypoint { kind: &'static str, name: String },

    #[error("executable entrypoint '{name}' must not start with '.'")]
    #[diagnostic(
        code(repack::executable_name),
        help("the '.' prefix is reserved for the default export entrypoint")
    )]
    ExecutableName { name: String },
}

impl Error {
    /// Create a parse error from a toml error with source context
    pub fn parse(source: toml::de::Error, src: &str, filename: &str) -> Box<Self> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: NamedSource::new(filename, src.to_string()),
            span,
            source,
        })
    }

    /// Create a configuration error from a message
    pub fn config(message: impl Into<String>) -> Box<Self> {
        Box::new(Error::Config {
            message: message.into(),
        })
    }

    /// Create an IO error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Box<Self> {
        Box::new(Error::Io {
            path: path.into(),
            source,
        })
    }
}
