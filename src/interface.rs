//! Per-operation interface files under `src/schema`.

use std::fmt;
use std::path::PathBuf;

use openapiv3::{ReferenceOr, Schema};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::naming::{kebab_case, upper_first};
use crate::typescript::{schema_to_typescript, TypeStyle};

pub const BANNER: &str = "// generated by oas-typescript-codegen\n// tslint:disable:array-type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InterfaceKind {
  RequestInput,
  Response,
}

impl fmt::Display for InterfaceKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      InterfaceKind::RequestInput => write!(f, "RequestInput"),
      InterfaceKind::Response => write!(f, "Response"),
    }
  }
}

/// `I` + upper-first operation id + kind, e.g. `IListUsersResponse`.
pub fn interface_name(operation_id: &str, kind: InterfaceKind) -> String {
  format!("I{}{}", upper_first(operation_id), kind)
}

/// Kebab-cased operation id + kind, e.g. `list-users-response`.
pub fn interface_file_name(operation_id: &str, kind: InterfaceKind) -> String {
  kebab_case(&format!("{operation_id}{kind}"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedInterface {
  pub interface_name: String,
  pub file_name: String,
  pub import_statement: String,
}

/// A declaration that compiled successfully but has not been written yet.
#[derive(Debug)]
pub struct CompiledInterface {
  pub interface: GeneratedInterface,
  pub content: String,
}

#[derive(Debug, Clone)]
pub struct InterfaceCompiler {
  schema_dir: PathBuf,
}

impl InterfaceCompiler {
  pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
    InterfaceCompiler {
      schema_dir: schema_dir.into(),
    }
  }

  /// Compile without touching the filesystem.
  pub fn prepare(
    &self,
    operation_id: &str,
    kind: InterfaceKind,
    schema: &ReferenceOr<Schema>,
  ) -> Result<CompiledInterface> {
    let name = interface_name(operation_id, kind);
    let file_name = interface_file_name(operation_id, kind);

    let declaration = schema_to_typescript(name.clone(), schema, Some(TypeStyle::generated()))
      .map_err(|e| Error::SchemaCompilation {
        operation_id: operation_id.to_string(),
        kind: kind.to_string(),
        reason: e.to_string(),
      })?;

    Ok(CompiledInterface {
      interface: GeneratedInterface {
        import_statement: format!("import {{ {name} }} from './schema/{file_name}'"),
        interface_name: name,
        file_name,
      },
      content: format!("{BANNER}\n\n{declaration}\n"),
    })
  }

  pub async fn write(&self, compiled: &CompiledInterface) -> Result<GeneratedInterface> {
    let path = self
      .schema_dir
      .join(format!("{}.ts", compiled.interface.file_name));
    tokio::fs::write(&path, &compiled.content)
      .await
      .map_err(|e| Error::io(&path, e))?;

    debug!(
      interface = %compiled.interface.interface_name,
      path = %path.display(),
      "Wrote interface."
    );
    Ok(compiled.interface.clone())
  }

  pub async fn compile(
    &self,
    operation_id: &str,
    kind: InterfaceKind,
    schema: &ReferenceOr<Schema>,
  ) -> Result<GeneratedInterface> {
    let compiled = self.prepare(operation_id, kind, schema)?;
    self.write(&compiled).await
  }
}
