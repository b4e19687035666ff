//! Generator configuration.

use std::path::PathBuf;

pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// What to do when one operation's schema cannot be compiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemaErrorPolicy {
  #[default]
  Abort,
  /// Drop the operation, log a warning and keep going.
  Skip,
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
  /// Media type whose request/response schemas are turned into types.
  pub content_type: String,
  /// Directory holding `api.ts`, `endpoint.ts` and the copied boilerplate.
  pub templates_dir: PathBuf,
  pub schema_errors: SchemaErrorPolicy,
}

impl GeneratorConfig {
  pub fn bundled_templates_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"))
  }
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    GeneratorConfig {
      content_type: DEFAULT_CONTENT_TYPE.to_string(),
      templates_dir: GeneratorConfig::bundled_templates_dir(),
      schema_errors: SchemaErrorPolicy::default(),
    }
  }
}
