//! Endpoint extraction from a resolved OpenAPI document.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use openapiv3::{
  OpenAPI, Operation, Parameter, ParameterData, ParameterSchemaOrContent, PathItem, ReferenceOr,
  Schema, StatusCode,
};
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, trace, warn};

use crate::config::{GeneratorConfig, SchemaErrorPolicy};
use crate::definitions::{DefinitionEntry, DefinitionTable};
use crate::error::{Error, Result};
use crate::interface::{CompiledInterface, GeneratedInterface, InterfaceCompiler, InterfaceKind};

static PATH_PLACEHOLDER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

/// Supported HTTP methods, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
  Get,
  Head,
  Post,
  Put,
  Patch,
  Delete,
}

impl HttpMethod {
  pub const ALL: [HttpMethod; 6] = [
    HttpMethod::Get,
    HttpMethod::Head,
    HttpMethod::Post,
    HttpMethod::Put,
    HttpMethod::Patch,
    HttpMethod::Delete,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      HttpMethod::Get => "get",
      HttpMethod::Head => "head",
      HttpMethod::Post => "post",
      HttpMethod::Put => "put",
      HttpMethod::Patch => "patch",
      HttpMethod::Delete => "delete",
    }
  }

  fn operation<'a>(&self, item: &'a PathItem) -> Option<&'a Operation> {
    match self {
      HttpMethod::Get => item.get.as_ref(),
      HttpMethod::Head => item.head.as_ref(),
      HttpMethod::Post => item.post.as_ref(),
      HttpMethod::Put => item.put.as_ref(),
      HttpMethod::Patch => item.patch.as_ref(),
      HttpMethod::Delete => item.delete.as_ref(),
    }
  }
}

impl fmt::Display for HttpMethod {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for HttpMethod {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    HttpMethod::ALL
      .into_iter()
      .find(|method| method.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| Error::UnsupportedMethod(s.to_string()))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
  pub operation_id: String,
  pub path: String,
  pub method: HttpMethod,
  pub summary: Option<String>,
  pub description: Option<String>,
  pub deprecated: bool,
  pub tags: Vec<String>,
  /// Argument list of the generated method: path variables, then `params`.
  pub args: String,
  pub request_type: Option<String>,
  /// Interface name, or `{}` when the operation has no typed response.
  pub response_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedOperation {
  pub operation_id: String,
  pub path: String,
  pub method: HttpMethod,
  pub reason: String,
}

#[derive(Debug, Default)]
pub struct Extraction {
  pub endpoints: Vec<Endpoint>,
  pub definitions: DefinitionTable,
  pub imports: Vec<String>,
  pub interfaces: Vec<GeneratedInterface>,
  pub skipped: Vec<SkippedOperation>,
}

/// Names of the `{placeholder}` segments of `path`, left to right.
pub fn path_arguments(path: &str) -> Vec<String> {
  PATH_PLACEHOLDER
    .captures_iter(path)
    .map(|captures| captures[1].to_string())
    .collect()
}

fn resolved<'a, T>(value: &'a ReferenceOr<T>) -> Result<&'a T> {
  match value {
    ReferenceOr::Item(item) => Ok(item),
    ReferenceOr::Reference { reference } => Err(Error::UnresolvedReference {
      reference: reference.clone(),
      reason: "reference survived resolution".to_string(),
    }),
  }
}

fn parameter_data(parameter: &Parameter) -> &ParameterData {
  match parameter {
    Parameter::Query { parameter_data, .. }
    | Parameter::Header { parameter_data, .. }
    | Parameter::Path { parameter_data, .. }
    | Parameter::Cookie { parameter_data, .. } => parameter_data,
  }
}

#[derive(Debug)]
pub struct EndpointExtractor<'a> {
  content_type: &'a str,
  policy: SchemaErrorPolicy,
  compiler: &'a InterfaceCompiler,
}

impl<'a> EndpointExtractor<'a> {
  pub fn new(config: &'a GeneratorConfig, compiler: &'a InterfaceCompiler) -> Self {
    EndpointExtractor {
      content_type: &config.content_type,
      policy: config.schema_errors,
      compiler,
    }
  }

  /// Walk every path and supported method, compiling and writing interfaces
  /// as operations are found.
  pub async fn extract(&self, spec: &OpenAPI) -> Result<Extraction> {
    let mut extraction = Extraction::default();

    for (path, item) in spec.paths.iter() {
      let item = resolved(item)?;

      for method in HttpMethod::ALL {
        let Some(operation) = method.operation(item) else {
          continue;
        };
        self
          .extract_operation(path, method, operation, &item.parameters, &mut extraction)
          .await?;
      }
    }

    Ok(extraction)
  }

  async fn extract_operation(
    &self,
    path: &str,
    method: HttpMethod,
    operation: &Operation,
    path_parameters: &[ReferenceOr<Parameter>],
    extraction: &mut Extraction,
  ) -> Result<()> {
    let operation_id = match operation.operation_id.as_deref() {
      Some(id) if !id.is_empty() => id,
      _ => {
        trace!(path, %method, "Skipping operation without operationId.");
        return Ok(());
      }
    };

    if let Some(first) = extraction.definitions.get(operation_id) {
      return Err(Error::DuplicateOperationId {
        operation_id: operation_id.to_string(),
        first: format!("{} {}", first.method.as_str().to_uppercase(), first.path),
        second: format!("{} {}", method.as_str().to_uppercase(), path),
      });
    }

    let (request, response) = match self.prepare(operation_id, operation, path_parameters) {
      Ok(pair) => pair,
      Err(err @ Error::SchemaCompilation { .. }) if self.policy == SchemaErrorPolicy::Skip => {
        warn!(operation_id, path, %method, error = %err, "Skipping operation.");
        extraction.skipped.push(SkippedOperation {
          operation_id: operation_id.to_string(),
          path: path.to_string(),
          method,
          reason: err.to_string(),
        });
        return Ok(());
      }
      Err(err) => return Err(err),
    };

    let mut request_type = None;
    if let Some(compiled) = &request {
      let generated = self.compiler.write(compiled).await?;
      request_type = Some(generated.interface_name.clone());
      extraction.imports.push(generated.import_statement.clone());
      extraction.interfaces.push(generated);
    }

    let mut response_type = "{}".to_string();
    if let Some(compiled) = &response {
      let generated = self.compiler.write(compiled).await?;
      response_type = generated.interface_name.clone();
      extraction.imports.push(generated.import_statement.clone());
      extraction.interfaces.push(generated);
    }

    let mut args: Vec<String> = path_arguments(path)
      .into_iter()
      .map(|name| format!("{name}: string"))
      .collect();
    if let Some(request_type) = &request_type {
      args.push(format!("params: {request_type}"));
    }

    extraction.definitions.insert(
      operation_id,
      DefinitionEntry {
        path: path.to_string(),
        method,
      },
    );

    debug!(operation_id, path, %method, "Extracted endpoint.");
    extraction.endpoints.push(Endpoint {
      operation_id: operation_id.to_string(),
      path: path.to_string(),
      method,
      summary: operation.summary.clone(),
      description: operation.description.clone(),
      deprecated: operation.deprecated,
      tags: operation.tags.clone(),
      args: args.join(", "),
      request_type,
      response_type,
    });

    Ok(())
  }

  /// Compile both declarations of an operation before anything is written.
  fn prepare(
    &self,
    operation_id: &str,
    operation: &Operation,
    path_parameters: &[ReferenceOr<Parameter>],
  ) -> Result<(Option<CompiledInterface>, Option<CompiledInterface>)> {
    let request = self
      .request_schema(operation_id, operation, path_parameters)?
      .map(|schema| {
        self
          .compiler
          .prepare(operation_id, InterfaceKind::RequestInput, &schema)
      })
      .transpose()?;

    let response = self
      .response_schema(operation)?
      .map(|schema| {
        self
          .compiler
          .prepare(operation_id, InterfaceKind::Response, &schema)
      })
      .transpose()?;

    Ok((request, response))
  }

  /// The request body schema for the configured content type, or else an
  /// object synthesized from the query parameters.
  pub fn request_schema(
    &self,
    operation_id: &str,
    operation: &Operation,
    path_parameters: &[ReferenceOr<Parameter>],
  ) -> Result<Option<ReferenceOr<Schema>>> {
    if let Some(body) = &operation.request_body {
      let body = resolved(body)?;
      if let Some(schema) = body
        .content
        .get(self.content_type)
        .and_then(|media| media.schema.as_ref())
      {
        return Ok(Some(schema.clone()));
      }
    }

    self.query_schema(operation_id, operation, path_parameters)
  }

  fn query_schema(
    &self,
    operation_id: &str,
    operation: &Operation,
    path_parameters: &[ReferenceOr<Parameter>],
  ) -> Result<Option<ReferenceOr<Schema>>> {
    // Operation-level parameters override path-level ones with the same name and location.
    let mut merged: Vec<&Parameter> = Vec::new();
    for parameter in path_parameters.iter().chain(operation.parameters.iter()) {
      let parameter = resolved(parameter)?;
      let existing = merged.iter().position(|known| {
        std::mem::discriminant(*known) == std::mem::discriminant(parameter)
          && parameter_data(known).name == parameter_data(parameter).name
      });
      match existing {
        Some(index) => merged[index] = parameter,
        None => merged.push(parameter),
      }
    }

    let queries: Vec<&ParameterData> = merged
      .into_iter()
      .filter_map(|parameter| match parameter {
        Parameter::Query { parameter_data, .. } => Some(parameter_data),
        _ => None,
      })
      .collect();
    if queries.is_empty() {
      return Ok(None);
    }

    let synthesis_error = |reason: String| Error::SchemaCompilation {
      operation_id: operation_id.to_string(),
      kind: InterfaceKind::RequestInput.to_string(),
      reason,
    };

    let mut properties = Map::new();
    for query in &queries {
      let schema = match &query.format {
        ParameterSchemaOrContent::Schema(schema) => Some(schema),
        ParameterSchemaOrContent::Content(content) => content
          .get(self.content_type)
          .and_then(|media| media.schema.as_ref()),
      };
      let schema_json = match schema {
        Some(schema) => serde_json::to_value(schema).map_err(|e| synthesis_error(e.to_string()))?,
        None => json!({}),
      };
      properties.insert(query.name.clone(), schema_json);
    }

    let required: Vec<Value> = queries
      .iter()
      .filter(|query| query.required)
      .map(|query| Value::String(query.name.clone()))
      .collect();

    let schema_json = json!({
      "type": "object",
      "properties": properties,
      "required": required,
      "additionalProperties": false
    });

    serde_json::from_value(schema_json)
      .map(|schema| Some(ReferenceOr::Item(schema)))
      .map_err(|e| synthesis_error(e.to_string()))
  }

  /// The schema of the lowest explicit 2xx response, else of `2XX`, else of
  /// `default`.
  pub fn response_schema(&self, operation: &Operation) -> Result<Option<ReferenceOr<Schema>>> {
    let responses = &operation.responses;
    let explicit = responses
      .responses
      .iter()
      .filter_map(|(code, response)| match code {
        StatusCode::Code(code) if (200..300).contains(code) => Some((*code, response)),
        _ => None,
      })
      .min_by_key(|(code, _)| *code)
      .map(|(_, response)| response);
    let range = responses
      .responses
      .iter()
      .find(|(code, _)| matches!(code, StatusCode::Range(2)))
      .map(|(_, response)| response);

    let Some(response) = explicit.or(range).or(responses.default.as_ref()) else {
      return Ok(None);
    };
    let response = resolved(response)?;

    Ok(
      response
        .content
        .get(self.content_type)
        .and_then(|media| media.schema.clone()),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resolver::resolve_references;
  use std::path::Path;

  fn spec(json: &str) -> OpenAPI {
    let raw: Value = serde_json::from_str(json).expect("Could not deserialize document");
    let resolved = resolve_references(Path::new("spec.json"), raw).expect("Could not resolve document");
    serde_json::from_value(resolved).expect("Could not deserialize open api")
  }

  fn operation(json: &str) -> Operation {
    serde_json::from_str(json).expect("Could not deserialize operation")
  }

  #[test]
  fn test_path_arguments_in_order() {
    assert_eq!(path_arguments("/users/{id}/posts/{postId}"), vec!["id", "postId"]);
    assert!(path_arguments("/health").is_empty());
  }

  #[test]
  fn test_method_parsing() {
    assert_eq!("GET".parse::<HttpMethod>().expect("get is supported"), HttpMethod::Get);
    assert_eq!("patch".parse::<HttpMethod>().expect("patch is supported"), HttpMethod::Patch);
    assert!(matches!(
      "options".parse::<HttpMethod>(),
      Err(Error::UnsupportedMethod(method)) if method == "options"
    ));
  }

  #[test]
  fn test_query_synthesis() {
    let config = GeneratorConfig::default();
    let compiler = InterfaceCompiler::new("unused");
    let extractor = EndpointExtractor::new(&config, &compiler);
    let op = operation(
      r#"{
        "operationId": "searchUsers",
        "parameters": [
          { "name": "q", "in": "query", "required": true, "schema": { "type": "string" } },
          { "name": "limit", "in": "query", "schema": { "type": "integer" } },
          { "name": "X-Trace", "in": "header", "schema": { "type": "string" } }
        ],
        "responses": {}
      }"#,
    );

    let schema = extractor
      .request_schema("searchUsers", &op, &[])
      .expect("Could not derive request schema")
      .expect("Expected a synthesized schema");
    let schema_json = serde_json::to_value(&schema).expect("Could not serialize schema");

    assert_eq!(schema_json["type"], json!("object"));
    assert_eq!(schema_json["required"], json!(["q"]));
    assert_eq!(schema_json["additionalProperties"], json!(false));
    let properties = schema_json["properties"]
      .as_object()
      .expect("Expected properties");
    assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["q", "limit"]);
  }

  #[test]
  fn test_request_body_wins_over_query() {
    let config = GeneratorConfig::default();
    let compiler = InterfaceCompiler::new("unused");
    let extractor = EndpointExtractor::new(&config, &compiler);
    let op = operation(
      r#"{
        "operationId": "createUser",
        "parameters": [{ "name": "dryRun", "in": "query", "schema": { "type": "boolean" } }],
        "requestBody": {
          "content": { "application/json": { "schema": { "type": "object", "properties": { "name": { "type": "string" } } } } }
        },
        "responses": {}
      }"#,
    );

    let schema = extractor
      .request_schema("createUser", &op, &[])
      .expect("Could not derive request schema")
      .expect("Expected the body schema");
    let schema_json = serde_json::to_value(&schema).expect("Could not serialize schema");

    assert!(schema_json["properties"].get("name").is_some());
    assert!(schema_json["properties"].get("dryRun").is_none());
  }

  #[test]
  fn test_no_request_schema_without_body_or_query() {
    let config = GeneratorConfig::default();
    let compiler = InterfaceCompiler::new("unused");
    let extractor = EndpointExtractor::new(&config, &compiler);
    let op = operation(
      r#"{
        "operationId": "getUser",
        "parameters": [{ "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }],
        "requestBody": { "content": { "text/plain": { "schema": { "type": "string" } } } },
        "responses": {}
      }"#,
    );

    assert!(extractor
      .request_schema("getUser", &op, &[])
      .expect("Could not derive request schema")
      .is_none());
  }

  #[test]
  fn test_operation_level_parameter_overrides_path_level() {
    let config = GeneratorConfig::default();
    let compiler = InterfaceCompiler::new("unused");
    let extractor = EndpointExtractor::new(&config, &compiler);
    let path_parameters: Vec<ReferenceOr<Parameter>> = serde_json::from_str(
      r#"[
        { "name": "page", "in": "query", "schema": { "type": "integer" } },
        { "name": "lang", "in": "query", "schema": { "type": "string" } }
      ]"#,
    )
    .expect("Could not deserialize parameters");
    let op = operation(
      r#"{
        "operationId": "listPosts",
        "parameters": [{ "name": "page", "in": "query", "required": true, "schema": { "type": "string" } }],
        "responses": {}
      }"#,
    );

    let schema = extractor
      .request_schema("listPosts", &op, &path_parameters)
      .expect("Could not derive request schema")
      .expect("Expected a synthesized schema");
    let schema_json = serde_json::to_value(&schema).expect("Could not serialize schema");

    assert_eq!(schema_json["required"], json!(["page"]));
    assert_eq!(schema_json["properties"]["page"]["type"], json!("string"));
    assert_eq!(schema_json["properties"]["lang"]["type"], json!("string"));
  }

  fn response_description(extractor: &EndpointExtractor, op: &Operation) -> Option<String> {
    extractor
      .response_schema(op)
      .expect("Could not derive response schema")
      .and_then(|schema| match schema {
        ReferenceOr::Item(schema) => schema.schema_data.description,
        ReferenceOr::Reference { .. } => None,
      })
  }

  #[test]
  fn test_response_code_precedence() {
    let config = GeneratorConfig::default();
    let compiler = InterfaceCompiler::new("unused");
    let extractor = EndpointExtractor::new(&config, &compiler);

    let created_and_default = operation(
      r#"{
        "responses": {
          "default": { "description": "error", "content": { "application/json": { "schema": { "type": "object", "description": "S2" } } } },
          "201": { "description": "created", "content": { "application/json": { "schema": { "type": "object", "description": "S1" } } } }
        }
      }"#,
    );
    assert_eq!(
      response_description(&extractor, &created_and_default).as_deref(),
      Some("S1")
    );

    let only_default = operation(
      r#"{
        "responses": {
          "404": { "description": "missing", "content": { "application/json": { "schema": { "type": "object", "description": "S404" } } } },
          "default": { "description": "error", "content": { "application/json": { "schema": { "type": "object", "description": "S2" } } } }
        }
      }"#,
    );
    assert_eq!(
      response_description(&extractor, &only_default).as_deref(),
      Some("S2")
    );

    let neither = operation(r#"{ "responses": { "404": { "description": "missing" } } }"#);
    assert!(extractor
      .response_schema(&neither)
      .expect("Could not derive response schema")
      .is_none());
  }

  #[test]
  fn test_lowest_explicit_success_code_wins() {
    let config = GeneratorConfig::default();
    let compiler = InterfaceCompiler::new("unused");
    let extractor = EndpointExtractor::new(&config, &compiler);

    let out_of_order = operation(
      r#"{
        "responses": {
          "204": { "description": "empty", "content": { "application/json": { "schema": { "type": "object", "description": "S204" } } } },
          "200": { "description": "ok", "content": { "application/json": { "schema": { "type": "object", "description": "S200" } } } }
        }
      }"#,
    );
    assert_eq!(
      response_description(&extractor, &out_of_order).as_deref(),
      Some("S200")
    );

    let range_and_code = operation(
      r#"{
        "responses": {
          "2XX": { "description": "any success", "content": { "application/json": { "schema": { "type": "object", "description": "S2XX" } } } },
          "201": { "description": "created", "content": { "application/json": { "schema": { "type": "object", "description": "S201" } } } }
        }
      }"#,
    );
    assert_eq!(
      response_description(&extractor, &range_and_code).as_deref(),
      Some("S201")
    );

    let range_only = operation(
      r#"{
        "responses": {
          "default": { "description": "error", "content": { "application/json": { "schema": { "type": "object", "description": "SDEF" } } } },
          "2XX": { "description": "any success", "content": { "application/json": { "schema": { "type": "object", "description": "S2XX" } } } }
        }
      }"#,
    );
    assert_eq!(
      response_description(&extractor, &range_only).as_deref(),
      Some("S2XX")
    );
  }

  #[test]
  fn test_response_without_matching_content_type() {
    let config = GeneratorConfig::default();
    let compiler = InterfaceCompiler::new("unused");
    let extractor = EndpointExtractor::new(&config, &compiler);
    let op = operation(
      r#"{ "responses": { "200": { "description": "ok", "content": { "text/csv": { "schema": { "type": "string" } } } } } }"#,
    );

    assert!(extractor
      .response_schema(&op)
      .expect("Could not derive response schema")
      .is_none());
  }

  #[tokio::test]
  async fn test_extract_args_and_filtering() {
    let dir = tempfile::tempdir().expect("Could not create temp dir");
    let config = GeneratorConfig::default();
    let compiler = InterfaceCompiler::new(dir.path());
    let extractor = EndpointExtractor::new(&config, &compiler);
    let spec = spec(
      r##"{
        "openapi": "3.0.3",
        "info": { "title": "Blog", "version": "1.0.0" },
        "paths": {
          "/users/{id}/posts/{postId}": {
            "put": {
              "operationId": "updatePost",
              "requestBody": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Post" } } } },
              "responses": { "200": { "description": "ok", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Post" } } } } }
            },
            "delete": {
              "responses": { "204": { "description": "deleted" } }
            }
          }
        },
        "components": {
          "schemas": {
            "Post": { "type": "object", "properties": { "title": { "type": "string" } } }
          }
        }
      }"##,
    );

    let extraction = extractor.extract(&spec).await.expect("Could not extract");

    assert_eq!(extraction.endpoints.len(), 1);
    let endpoint = &extraction.endpoints[0];
    assert_eq!(endpoint.operation_id, "updatePost");
    assert_eq!(
      endpoint.args,
      "id: string, postId: string, params: IUpdatePostRequestInput"
    );
    assert_eq!(endpoint.response_type, "IUpdatePostResponse");
    assert_eq!(
      extraction.imports,
      vec![
        "import { IUpdatePostRequestInput } from './schema/update-post-request-input'",
        "import { IUpdatePostResponse } from './schema/update-post-response'",
      ]
    );
    assert_eq!(extraction.definitions.len(), 1);
    assert!(dir.path().join("update-post-request-input.ts").exists());
    assert_eq!(std::fs::read_dir(dir.path()).expect("Could not list dir").count(), 2);
  }

  #[tokio::test]
  async fn test_duplicate_operation_id_is_rejected() {
    let dir = tempfile::tempdir().expect("Could not create temp dir");
    let config = GeneratorConfig::default();
    let compiler = InterfaceCompiler::new(dir.path());
    let extractor = EndpointExtractor::new(&config, &compiler);
    let spec = spec(
      r#"{
        "openapi": "3.0.3",
        "info": { "title": "Dup", "version": "1.0.0" },
        "paths": {
          "/a": { "get": { "operationId": "fetch", "responses": {} } },
          "/b": { "post": { "operationId": "fetch", "responses": {} } }
        }
      }"#,
    );

    let err = extractor.extract(&spec).await.unwrap_err();

    match err {
      Error::DuplicateOperationId {
        operation_id,
        first,
        second,
      } => {
        assert_eq!(operation_id, "fetch");
        assert_eq!(first, "GET /a");
        assert_eq!(second, "POST /b");
      }
      other => panic!("expected a duplicate operationId error, got {other}"),
    }
  }

  #[tokio::test]
  async fn test_skip_policy_drops_the_whole_operation() {
    let dir = tempfile::tempdir().expect("Could not create temp dir");
    let config = GeneratorConfig {
      schema_errors: SchemaErrorPolicy::Skip,
      ..GeneratorConfig::default()
    };
    let compiler = InterfaceCompiler::new(dir.path());
    let extractor = EndpointExtractor::new(&config, &compiler);
    let spec = spec(
      r#"{
        "openapi": "3.0.3",
        "info": { "title": "Skip", "version": "1.0.0" },
        "paths": {
          "/bad": {
            "post": {
              "operationId": "bad",
              "requestBody": { "content": { "application/json": { "schema": { "type": "string" } } } },
              "responses": { "200": { "description": "ok", "content": { "application/json": { "schema": { "not": { "type": "string" } } } } } }
            }
          },
          "/good": { "get": { "operationId": "good", "responses": {} } }
        }
      }"#,
    );

    let extraction = extractor.extract(&spec).await.expect("Could not extract");

    assert_eq!(extraction.endpoints.len(), 1);
    assert_eq!(extraction.endpoints[0].operation_id, "good");
    assert_eq!(extraction.endpoints[0].response_type, "{}");
    assert_eq!(extraction.skipped.len(), 1);
    assert_eq!(extraction.skipped[0].operation_id, "bad");
    assert!(extraction.definitions.get("bad").is_none());
    assert_eq!(std::fs::read_dir(dir.path()).expect("Could not list dir").count(), 0);
  }
}
