//! Output orchestration: load, extract, render, write.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use openapiv3::Info;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::definitions::format_source;
use crate::error::{Error, Result};
use crate::extract::{EndpointExtractor, SkippedOperation};
use crate::interface::InterfaceCompiler;
use crate::naming::kebab_case;
use crate::resolver::load_specification;
use crate::template::{Evaluator, TemplateStore};

/// Files copied verbatim from the templates root, with their destination
/// relative to the output directory.
const BOILERPLATE: [(&str, &str); 3] = [
  ("base.ts", "src/base.ts"),
  ("tsconfig.json", "tsconfig.json"),
  ("gitignore", ".gitignore"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
  pub endpoints: usize,
  pub interfaces: usize,
  pub skipped: Vec<SkippedOperation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest<'a> {
  name: String,
  version: &'a str,
  description: String,
  private: bool,
  main: &'static str,
  types: &'static str,
  scripts: BTreeMap<&'static str, &'static str>,
  dependencies: BTreeMap<&'static str, &'static str>,
  dev_dependencies: BTreeMap<&'static str, &'static str>,
}

impl<'a> PackageManifest<'a> {
  fn new(info: &'a Info) -> Self {
    let description = info
      .description
      .as_deref()
      .filter(|description| !description.trim().is_empty())
      .unwrap_or(&info.title);

    PackageManifest {
      name: format!("{}-sdk", kebab_case(&info.title)),
      version: &info.version,
      description: format!("{description} (auto generated sdk by oas-typescript-codegen)"),
      private: true,
      main: "dist/api.js",
      types: "types/api.d.ts",
      scripts: BTreeMap::from([("build", "tsc -p .")]),
      dependencies: BTreeMap::from([("axios", "^1.6.0")]),
      dev_dependencies: BTreeMap::from([("typescript", "latest")]),
    }
  }
}

#[derive(Debug)]
pub struct Generator {
  config: GeneratorConfig,
  store: Arc<TemplateStore>,
}

impl Generator {
  pub fn new(config: GeneratorConfig) -> Self {
    Generator {
      config,
      store: Arc::new(TemplateStore::new()),
    }
  }

  /// Stops at the first error. Files written before it stay on disk.
  pub async fn generate(&self, input: &Path, out_dir: &Path) -> Result<GenerationReport> {
    let schema_dir = out_dir.join("src").join("schema");
    tokio::fs::create_dir_all(&schema_dir)
      .await
      .map_err(|e| Error::io(&schema_dir, e))?;

    info!(input = %input.display(), "Loading specification.");
    let spec = load_specification(input).await?;

    let compiler = InterfaceCompiler::new(&schema_dir);
    let extraction = EndpointExtractor::new(&self.config, &compiler)
      .extract(&spec)
      .await?;
    info!(
      endpoints = extraction.endpoints.len(),
      interfaces = extraction.interfaces.len(),
      skipped = extraction.skipped.len(),
      "Extracted endpoints."
    );

    let raw_definitions = extraction.definitions.to_source();
    let definitions = match format_source(&raw_definitions) {
      Ok(formatted) => formatted,
      Err(e) => {
        warn!(error = %e, "Could not format the definition table, using it as is.");
        raw_definitions
      }
    };

    let exports: Vec<String> = extraction
      .interfaces
      .iter()
      .map(|interface| {
        format!(
          "export {{ {} }} from './schema/{}'",
          interface.interface_name, interface.file_name
        )
      })
      .collect();

    let data = json!({
      "title": spec.info.title,
      "version": spec.info.version,
      "imports": extraction.imports,
      "exports": exports,
      "definitions": definitions,
      "endpoints": extraction.endpoints,
    });

    let evaluator = Evaluator::new(self.store.clone(), &self.config.templates_dir);
    let source = evaluator.evaluate(&self.config.templates_dir.join("api.ts"), &data)?;
    debug!(
      compiled_expressions = self.store.compile_count(),
      "Rendered api.ts."
    );

    for (template, destination) in BOILERPLATE {
      let from = self.config.templates_dir.join(template);
      let to = out_dir.join(destination);
      tokio::fs::copy(&from, &to)
        .await
        .map_err(|e| Error::io(&from, e))?;
      debug!(from = %from.display(), to = %to.display(), "Copied boilerplate.");
    }

    let api_path = out_dir.join("src").join("api.ts");
    tokio::fs::write(&api_path, source)
      .await
      .map_err(|e| Error::io(&api_path, e))?;

    let manifest_path = out_dir.join("package.json");
    let manifest = serde_json::to_string_pretty(&PackageManifest::new(&spec.info)).map_err(|e| {
      Error::io(
        &manifest_path,
        std::io::Error::new(std::io::ErrorKind::InvalidData, e),
      )
    })?;
    tokio::fs::write(&manifest_path, manifest)
      .await
      .map_err(|e| Error::io(&manifest_path, e))?;

    info!(out_dir = %out_dir.display(), "Wrote client package.");
    Ok(GenerationReport {
      endpoints: extraction.endpoints.len(),
      interfaces: extraction.interfaces.len(),
      skipped: extraction.skipped,
    })
  }
}
