//! Generate a typed TypeScript client package from an OpenAPI document.
//!
//! The pipeline loads and dereferences the document ([`resolver`]), walks its
//! operations ([`extract`]), compiles request and response schemas into
//! TypeScript declarations ([`typescript`], [`interface`]) and renders the
//! client source from directive templates ([`template`]). [`Generator`] runs
//! the whole thing.

pub mod config;
pub mod definitions;
pub mod error;
pub mod extract;
pub mod generator;
pub mod interface;
pub mod naming;
pub mod resolver;
pub mod template;
pub mod typescript;

pub use config::{GeneratorConfig, SchemaErrorPolicy, DEFAULT_CONTENT_TYPE};
pub use error::{Error, Result};
pub use extract::{Endpoint, HttpMethod, SkippedOperation};
pub use generator::{GenerationReport, Generator};
pub use template::{Evaluator, TemplateStore};
pub use typescript::{schema_to_typescript, TypeStyle};
