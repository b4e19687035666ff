use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use oas_typescript_codegen::{Generator, GeneratorConfig, SchemaErrorPolicy, DEFAULT_CONTENT_TYPE};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Generate a TypeScript client package from an OpenAPI document.
#[derive(Debug, Parser)]
#[command(name = "oas-typescript-codegen", version, about)]
struct Cli {
  /// OpenAPI document (JSON, or YAML with a .yaml/.yml extension)
  input: Option<PathBuf>,

  /// Directory the client package is written to
  output: Option<PathBuf>,

  /// Media type whose schemas become request and response types
  #[arg(long, default_value = DEFAULT_CONTENT_TYPE)]
  content_type: String,

  /// Directory with api.ts, endpoint.ts and the copied boilerplate
  #[arg(long)]
  templates: Option<PathBuf>,

  /// Skip operations whose schemas cannot be compiled instead of failing
  #[arg(long)]
  skip_invalid_schemas: bool,
}

fn is_plain_level(value: &str) -> bool {
  matches!(
    value.to_ascii_lowercase().as_str(),
    "trace" | "debug" | "info" | "warn" | "error" | "off"
  )
}

fn init_tracing() {
  let crate_root = module_path!();

  // OAS_CODEGEN_LOG takes a plain level or a full filter spec
  let filter = match std::env::var("OAS_CODEGEN_LOG") {
    Ok(level) if is_plain_level(&level) => format!("{crate_root}={level}"),
    Ok(spec) => spec,
    Err(_) => format!("{crate_root}=info"),
  };

  let fmt_layer = tracing_subscriber::fmt::layer()
    .with_writer(std::io::stderr)
    .with_target(false)
    .with_filter(EnvFilter::new(filter));

  if tracing_subscriber::registry()
    .with(fmt_layer)
    .try_init()
    .is_err()
  {
    eprintln!("Warning: tracing subscriber already initialized");
  }
}

fn print_error_chain(err: &dyn std::error::Error) {
  eprintln!("Error: {err}");
  let mut source = err.source();
  while let Some(cause) = source {
    eprintln!("  caused by: {cause}");
    source = cause.source();
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(e) => {
      let _ = e.print();
      return if e.use_stderr() {
        ExitCode::FAILURE
      } else {
        ExitCode::SUCCESS
      };
    }
  };

  let (Some(input), Some(output)) = (cli.input, cli.output) else {
    eprintln!("Usage: oas-typescript-codegen <input> <output>");
    eprintln!("Both the OpenAPI document and the output directory are required.");
    return ExitCode::FAILURE;
  };

  init_tracing();

  let mut config = GeneratorConfig {
    content_type: cli.content_type,
    ..GeneratorConfig::default()
  };
  if let Some(templates) = cli.templates {
    config.templates_dir = templates;
  }
  if cli.skip_invalid_schemas {
    config.schema_errors = SchemaErrorPolicy::Skip;
  }

  match Generator::new(config).generate(&input, &output).await {
    Ok(report) => {
      for skipped in &report.skipped {
        eprintln!(
          "Skipped {} ({} {}): {}",
          skipped.operation_id,
          skipped.method.as_str().to_uppercase(),
          skipped.path,
          skipped.reason
        );
      }
      println!("Generated.");
      ExitCode::SUCCESS
    }
    Err(e) => {
      print_error_chain(&e);
      ExitCode::FAILURE
    }
  }
}
