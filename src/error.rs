//! Error types for the generation pipeline.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
  #[error("I/O error on '{}': {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The specification is not valid JSON/YAML or not an OpenAPI document.
  #[error("Failed to parse specification '{}': {reason}", path.display())]
  Parse { path: PathBuf, reason: String },

  /// A `$ref` points at something that does not exist or cannot be loaded.
  #[error("Unresolved reference '{reference}': {reason}")]
  UnresolvedReference { reference: String, reason: String },

  /// A chain of `$ref`s leads back to itself.
  #[error("Cyclic reference: {}", chain.join(" -> "))]
  CyclicReference { chain: Vec<String> },

  /// A schema could not be turned into a TypeScript declaration.
  #[error("Failed to compile {kind} schema for operation '{operation_id}': {reason}")]
  SchemaCompilation {
    operation_id: String,
    kind: String,
    reason: String,
  },

  #[error("Duplicate operationId '{operation_id}' ({first} and {second})")]
  DuplicateOperationId {
    operation_id: String,
    first: String,
    second: String,
  },

  #[error("Unsupported HTTP method '{0}'")]
  UnsupportedMethod(String),

  /// A directive expression failed to compile or render.
  #[error("Template error in '{}'", path.display())]
  Template {
    path: PathBuf,
    #[source]
    source: tera::Error,
  },

  /// A template invoked itself, directly or through other templates.
  #[error("Template cycle: {}", chain.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" -> "))]
  TemplateCycle { chain: Vec<PathBuf> },
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Error::Io {
      path: path.into(),
      source,
    }
  }
}
