//! Specification loading and `$ref` dereferencing.
//!
//! The raw document is parsed into a `serde_json::Value`, every reference is
//! replaced by a copy of the subtree it points at, and only then is the result
//! deserialized into the typed OpenAPI model. External references are resolved
//! relative to the document that contains them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use openapiv3::OpenAPI;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{Error, Result};

pub async fn load_specification(path: &Path) -> Result<OpenAPI> {
  let bytes = tokio::fs::read(path)
    .await
    .map_err(|e| Error::io(path, e))?;
  let raw = parse_document(path, &bytes)?;
  let resolved = resolve_references(path, raw)?;

  serde_json::from_value(resolved).map_err(|e| Error::Parse {
    path: path.to_path_buf(),
    reason: format!("not a valid OpenAPI document: {e}"),
  })
}

/// Parse JSON, or YAML when the file extension says so.
pub fn parse_document(path: &Path, bytes: &[u8]) -> Result<Value> {
  let is_yaml = path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

  let parse_error = |reason: String| Error::Parse {
    path: path.to_path_buf(),
    reason,
  };

  if is_yaml {
    // Go through serde_yaml::Value so non-string keys (`200:`) become strings.
    let yaml: serde_yaml::Value =
      serde_yaml::from_slice(bytes).map_err(|e| parse_error(e.to_string()))?;
    serde_json::to_value(yaml).map_err(|e| parse_error(e.to_string()))
  } else {
    serde_json::from_slice(bytes).map_err(|e| parse_error(e.to_string()))
  }
}

/// Replace every `$ref` in `document` (loaded from `path`) with its target.
pub fn resolve_references(path: &Path, document: Value) -> Result<Value> {
  let mut resolver = Resolver::default();
  resolver.documents.insert(path.to_path_buf(), document.clone());

  let mut chain = Vec::new();
  let resolved = resolver.resolve_value(&document, path, &mut chain)?;

  debug!(
    path = %path.display(),
    references = resolver.resolved.len(),
    documents = resolver.documents.len(),
    "Resolved specification references."
  );
  Ok(resolved)
}

#[derive(Debug, Default)]
struct Resolver {
  /// Parsed documents by path, the root included.
  documents: HashMap<PathBuf, Value>,
  /// Fully resolved targets by `document#pointer`.
  resolved: HashMap<String, Value>,
}

impl Resolver {
  fn resolve_value(&mut self, value: &Value, base: &Path, chain: &mut Vec<String>) -> Result<Value> {
    match value {
      Value::Object(object) => {
        if let Some(Value::String(reference)) = object.get("$ref") {
          return self.resolve_reference(reference, base, chain);
        }

        let mut resolved = Map::with_capacity(object.len());
        for (key, child) in object {
          resolved.insert(key.clone(), self.resolve_value(child, base, chain)?);
        }
        Ok(Value::Object(resolved))
      }
      Value::Array(items) => items
        .iter()
        .map(|item| self.resolve_value(item, base, chain))
        .collect::<Result<Vec<Value>>>()
        .map(Value::Array),
      other => Ok(other.clone()),
    }
  }

  fn resolve_reference(&mut self, reference: &str, base: &Path, chain: &mut Vec<String>) -> Result<Value> {
    let (location, fragment) = match reference.split_once('#') {
      Some((location, fragment)) => (location, fragment),
      None => (reference, ""),
    };

    if location.starts_with("http://") || location.starts_with("https://") {
      return Err(Error::UnresolvedReference {
        reference: reference.to_string(),
        reason: "remote references are not supported".to_string(),
      });
    }

    let document_path = if location.is_empty() {
      base.to_path_buf()
    } else {
      base
        .parent()
        .map(|dir| dir.join(location))
        .unwrap_or_else(|| PathBuf::from(location))
    };

    let key = format!("{}#{}", document_path.display(), fragment);
    if chain.contains(&key) {
      let mut cycle = chain.clone();
      cycle.push(key);
      return Err(Error::CyclicReference { chain: cycle });
    }
    if let Some(hit) = self.resolved.get(&key) {
      return Ok(hit.clone());
    }

    let target = self.lookup(reference, &document_path, fragment)?;
    trace!(reference, "Expanding reference.");

    chain.push(key.clone());
    let resolved = self.resolve_value(&target, &document_path, chain);
    chain.pop();
    let resolved = resolved?;

    self.resolved.insert(key, resolved.clone());
    Ok(resolved)
  }

  fn lookup(&mut self, reference: &str, document_path: &Path, fragment: &str) -> Result<Value> {
    if !self.documents.contains_key(document_path) {
      let bytes = std::fs::read(document_path).map_err(|e| Error::UnresolvedReference {
        reference: reference.to_string(),
        reason: format!("cannot read '{}': {e}", document_path.display()),
      })?;
      let document = parse_document(document_path, &bytes)?;
      debug!(path = %document_path.display(), "Loaded external document.");
      self.documents.insert(document_path.to_path_buf(), document);
    }

    let pointer = percent_decode(fragment);
    if !pointer.is_empty() && !pointer.starts_with('/') {
      return Err(Error::UnresolvedReference {
        reference: reference.to_string(),
        reason: "only JSON pointer fragments are supported".to_string(),
      });
    }

    self
      .documents
      .get(document_path)
      .and_then(|document| document.pointer(&pointer))
      .cloned()
      .ok_or_else(|| Error::UnresolvedReference {
        reference: reference.to_string(),
        reason: "target does not exist".to_string(),
      })
  }
}

fn percent_decode(input: &str) -> String {
  let bytes = input.as_bytes();
  let mut decoded = Vec::with_capacity(bytes.len());
  let mut i = 0;
  while i < bytes.len() {
    if bytes[i] == b'%' && i + 2 < bytes.len() {
      let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
      if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
        decoded.push(byte);
        i += 3;
        continue;
      }
    }
    decoded.push(bytes[i]);
    i += 1;
  }
  String::from_utf8_lossy(&decoded).into_owned()
}
