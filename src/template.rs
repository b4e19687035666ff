//! Directive substitution for the TypeScript templates.
//!
//! A template is plain text containing single-line directives of the form
//! `/* {{ <expression> }} */`. Each expression is a Tera fragment rendered
//! against the caller's data; its output replaces the whole directive and the
//! text around it is left as is. Expressions may call
//! `template(path="...", data=...)` to evaluate another template from the
//! same root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use regex::Regex;
use serde_json::{Map, Value};
use tera::{Context, Function, Tera};
use tracing::trace;

use crate::error::{Error, Result};

static DIRECTIVE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"/\* \{\{ (.+?) \}\} \*/").expect("directive pattern is valid"));

/// Name under which every expression is registered in its own `Tera`.
const EXPRESSION: &str = "directive";

/// Raw template text by path and compiled expressions by their source text.
#[derive(Debug, Default)]
pub struct TemplateStore {
  files: Mutex<HashMap<PathBuf, Arc<str>>>,
  expressions: Mutex<HashMap<String, Arc<Tera>>>,
  compiled: AtomicUsize,
}

impl TemplateStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn load(&self, path: &Path) -> Result<Arc<str>> {
    let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(text) = files.get(path) {
      return Ok(text.clone());
    }

    let text: Arc<str> = std::fs::read_to_string(path)
      .map_err(|e| Error::io(path, e))?
      .into();
    trace!(path = %path.display(), "Loaded template.");
    files.insert(path.to_path_buf(), text.clone());
    Ok(text)
  }

  pub fn compile(&self, expression: &str) -> tera::Result<Arc<Tera>> {
    let mut expressions = self
      .expressions
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    if let Some(tera) = expressions.get(expression) {
      return Ok(tera.clone());
    }

    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.register_filter("lines", lines);
    tera.register_filter("jsdoc", jsdoc);
    tera.add_raw_template(EXPRESSION, expression)?;

    let tera = Arc::new(tera);
    expressions.insert(expression.to_string(), tera.clone());
    self.compiled.fetch_add(1, Ordering::Relaxed);
    Ok(tera)
  }

  /// Number of expressions compiled so far. Cache hits do not count.
  pub fn compile_count(&self) -> usize {
    self.compiled.load(Ordering::Relaxed)
  }
}

#[derive(Debug, Clone)]
pub struct Evaluator {
  store: Arc<TemplateStore>,
  root: PathBuf,
}

impl Evaluator {
  /// `root` is the directory `template()` paths are resolved against.
  pub fn new(store: Arc<TemplateStore>, root: impl Into<PathBuf>) -> Self {
    Evaluator {
      store,
      root: root.into(),
    }
  }

  pub fn store(&self) -> &TemplateStore {
    &self.store
  }

  /// Render the template at `path` with `data`, which must be a JSON object.
  pub fn evaluate(&self, path: &Path, data: &Value) -> Result<String> {
    self.evaluate_in(path, data, &[])
  }

  fn evaluate_in(&self, path: &Path, data: &Value, chain: &[PathBuf]) -> Result<String> {
    if chain.iter().any(|entered| entered == path) {
      let mut cycle = chain.to_vec();
      cycle.push(path.to_path_buf());
      return Err(Error::TemplateCycle { chain: cycle });
    }

    let raw = self.store.load(path)?;
    let context = Context::from_value(data.clone()).map_err(|source| Error::Template {
      path: path.to_path_buf(),
      source,
    })?;

    let mut chain = chain.to_vec();
    chain.push(path.to_path_buf());

    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for captures in DIRECTIVE.captures_iter(&raw) {
      let (Some(directive), Some(expression)) = (captures.get(0), captures.get(1)) else {
        continue;
      };
      out.push_str(&raw[last..directive.start()]);
      out.push_str(&self.render(path, expression.as_str(), &context, &chain)?);
      last = directive.end();
    }
    out.push_str(&raw[last..]);

    Ok(out)
  }

  fn render(
    &self,
    path: &Path,
    expression: &str,
    context: &Context,
    chain: &[PathBuf],
  ) -> Result<String> {
    let compiled = self
      .store
      .compile(expression)
      .map_err(|source| Error::Template {
        path: path.to_path_buf(),
        source,
      })?;

    // The shared instance stays untouched; the clone carries this call's chain.
    let mut tera = Tera::clone(&compiled);
    tera.register_function(
      "template",
      SubTemplate {
        evaluator: self.clone(),
        chain: chain.to_vec(),
      },
    );

    tera
      .render(EXPRESSION, context)
      .map_err(|source| match nested_cycle(&source) {
        Some(chain) => Error::TemplateCycle { chain },
        None => Error::Template {
          path: path.to_path_buf(),
          source,
        },
      })
  }
}

/// The `template(path, data)` function available to expressions.
struct SubTemplate {
  evaluator: Evaluator,
  chain: Vec<PathBuf>,
}

impl Function for SubTemplate {
  fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let path = args
      .get("path")
      .and_then(Value::as_str)
      .ok_or_else(|| tera::Error::msg("`template` requires a string `path` argument"))?;
    let data = args
      .get("data")
      .cloned()
      .unwrap_or_else(|| Value::Object(Map::new()));

    self
      .evaluator
      .evaluate_in(&self.evaluator.root.join(path), &data, &self.chain)
      .map(Value::String)
      .map_err(|e| tera::Error::chain(format!("Failed to evaluate '{path}'"), e))
  }

  fn is_safe(&self) -> bool {
    true
  }
}

fn nested_cycle(err: &tera::Error) -> Option<Vec<PathBuf>> {
  let mut source = std::error::Error::source(err);
  while let Some(current) = source {
    if let Some(Error::TemplateCycle { chain }) = current.downcast_ref::<Error>() {
      return Some(chain.clone());
    }
    source = current.source();
  }
  None
}

fn lines(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
  let items = value
    .as_array()
    .ok_or_else(|| tera::Error::msg("Filter `lines` expects an array"))?;

  let joined = items
    .iter()
    .map(|item| match item {
      Value::String(s) => s.clone(),
      other => other.to_string(),
    })
    .collect::<Vec<String>>()
    .join("\n");
  Ok(Value::String(joined))
}

/// Turn a summary into a JSDoc block indented by `indent` spaces.
///
/// Optional `description` and `deprecated` arguments add a paragraph and a
/// `@deprecated` tag. Renders nothing when there is nothing to document.
fn jsdoc(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
  let indent = " ".repeat(args.get("indent").and_then(Value::as_u64).unwrap_or(0) as usize);

  let mut paragraphs: Vec<&str> = Vec::new();
  for text in [value.as_str(), args.get("description").and_then(Value::as_str)]
    .into_iter()
    .flatten()
  {
    if !text.trim().is_empty() {
      paragraphs.push(text.trim());
    }
  }
  if args.get("deprecated").and_then(Value::as_bool) == Some(true) {
    paragraphs.push("@deprecated");
  }
  if paragraphs.is_empty() {
    return Ok(Value::String(String::new()));
  }

  let mut out = format!("{indent}/**\n");
  for (i, paragraph) in paragraphs.iter().enumerate() {
    if i > 0 {
      out.push_str(&format!("{indent} *\n"));
    }
    for line in paragraph.lines() {
      let line = line.trim_end().replace("*/", "*\\/");
      if line.is_empty() {
        out.push_str(&format!("{indent} *\n"));
      } else {
        out.push_str(&format!("{indent} * {line}\n"));
      }
    }
  }
  out.push_str(&format!("{indent} */\n"));
  Ok(Value::String(out))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Could not write template");
    path
  }

  fn evaluator(dir: &Path) -> Evaluator {
    Evaluator::new(Arc::new(TemplateStore::new()), dir)
  }

  #[test]
  fn test_directives_are_replaced_in_place() {
    let dir = tempfile::tempdir().expect("Could not create temp dir");
    let main = write(
      dir.path(),
      "main.ts",
      "// header\nconst a = /* {{ {{ name }} }} */, b = /* {{ {{ template(path=\"part.ts\", data=item) }} }} */\n// footer\n",
    );
    write(dir.path(), "part.ts", "[/* {{ {{ value }} }} */]");

    let rendered = evaluator(dir.path())
      .evaluate(&main, &json!({ "name": "Api", "item": { "value": 42 } }))
      .expect("Could not evaluate");

    assert_eq!(rendered, "// header\nconst a = Api, b = [42]\n// footer\n");
  }

  #[test]
  fn test_text_without_directives_is_untouched() {
    let dir = tempfile::tempdir().expect("Could not create temp dir");
    let text = "/* {{ not closed\n}} */ {{ plain }}\n";
    let main = write(dir.path(), "main.ts", text);

    let rendered = evaluator(dir.path())
      .evaluate(&main, &json!({}))
      .expect("Could not evaluate");

    assert_eq!(rendered, text);
  }

  #[test]
  fn test_expressions_compile_once() {
    let dir = tempfile::tempdir().expect("Could not create temp dir");
    let main = write(dir.path(), "main.ts", "/* {{ {{ name }} }} */");
    let evaluator = evaluator(dir.path());

    let first = evaluator
      .evaluate(&main, &json!({ "name": "first" }))
      .expect("Could not evaluate");
    let second = evaluator
      .evaluate(&main, &json!({ "name": "second" }))
      .expect("Could not evaluate");

    assert_eq!(first, "first");
    assert_eq!(second, "second");
    assert_eq!(evaluator.store().compile_count(), 1);
  }

  #[test]
  fn test_loops_and_lines_filter() {
    let dir = tempfile::tempdir().expect("Could not create temp dir");
    let main = write(
      dir.path(),
      "main.ts",
      "/* {{ {{ imports | lines }} }} */\n/* {{ {% for e in endpoints %}{{ template(path=\"e.ts\", data=e) }}{% endfor %} }} */\n",
    );
    write(dir.path(), "e.ts", "<e>/* {{ {{ id }} }} */</e>");

    let rendered = evaluator(dir.path())
      .evaluate(
        &main,
        &json!({
          "imports": ["import { A } from './a'", "import { B } from './b'"],
          "endpoints": [{ "id": "one" }, { "id": "two" }]
        }),
      )
      .expect("Could not evaluate");

    assert_eq!(
      rendered,
      "import { A } from './a'\nimport { B } from './b'\n<e>one</e><e>two</e>\n"
    );
  }

  #[test]
  fn test_jsdoc_filter() {
    let dir = tempfile::tempdir().expect("Could not create temp dir");
    let main = write(
      dir.path(),
      "main.ts",
      "/* {{ {{ summary | jsdoc(indent=2, description=description, deprecated=deprecated) }} }} */x",
    );
    let evaluator = evaluator(dir.path());

    let documented = evaluator
      .evaluate(
        &main,
        &json!({ "summary": "List users", "description": "Paged.\nNewest first.", "deprecated": true }),
      )
      .expect("Could not evaluate");
    let expected = r#"  /**
   * List users
   *
   * Paged.
   * Newest first.
   *
   * @deprecated
   */
x"#;
    assert_eq!(documented, expected);

    let bare = evaluator
      .evaluate(&main, &json!({ "summary": null, "description": null, "deprecated": false }))
      .expect("Could not evaluate");
    assert_eq!(bare, "x");
  }

  #[test]
  fn test_template_cycle_is_detected() {
    let dir = tempfile::tempdir().expect("Could not create temp dir");
    let a = write(dir.path(), "a.ts", "/* {{ {{ template(path=\"b.ts\") }} }} */");
    let b = write(dir.path(), "b.ts", "/* {{ {{ template(path=\"a.ts\") }} }} */");

    let err = evaluator(dir.path()).evaluate(&a, &json!({})).unwrap_err();

    match err {
      Error::TemplateCycle { chain } => assert_eq!(chain, vec![a.clone(), b, a]),
      other => panic!("expected a template cycle, got {other}"),
    }
  }

  #[test]
  fn test_missing_template_is_io_error() {
    let dir = tempfile::tempdir().expect("Could not create temp dir");

    let err = evaluator(dir.path())
      .evaluate(&dir.path().join("missing.ts"), &json!({}))
      .unwrap_err();

    assert!(matches!(err, Error::Io { .. }), "{err}");
  }

  #[test]
  fn test_bad_expression_names_the_file() {
    let dir = tempfile::tempdir().expect("Could not create temp dir");
    let main = write(dir.path(), "main.ts", "/* {{ {% if %} }} */");

    let err = evaluator(dir.path()).evaluate(&main, &json!({})).unwrap_err();

    match err {
      Error::Template { path, .. } => assert_eq!(path, main),
      other => panic!("expected a template error, got {other}"),
    }
  }
}
