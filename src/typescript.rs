//! JSON Schema → TypeScript declaration compiler.
//!
//! A schema is first lowered into a small type tree (`TsType`) and then
//! printed according to a `TypeStyle`. The printer only ever sees fully
//! dereferenced schemas; a `$ref` reaching it is an error.

use std::fmt;

use openapiv3::{
  AdditionalProperties, BooleanType, IntegerType, NumberType, ReferenceOr, Schema, SchemaKind,
  StringType, Type,
};
use serde_json::Value;
use thiserror::Error;

use crate::naming::{property_key, quote_string};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeStyle {
  pub single_quote: bool,
  pub semi: bool,
  pub tab_width: usize,
  pub bracket_spacing: bool,
  pub prefer_unknown_over_any: bool,
}

impl TypeStyle {
  /// Style used for every file the generator writes.
  pub fn generated() -> Self {
    TypeStyle {
      single_quote: true,
      semi: false,
      tab_width: 2,
      bracket_spacing: true,
      prefer_unknown_over_any: true,
    }
  }

  fn quote(&self) -> char {
    if self.single_quote {
      '\''
    } else {
      '"'
    }
  }

  fn terminator(&self) -> &'static str {
    if self.semi {
      ";"
    } else {
      ""
    }
  }

  fn indent(&self, depth: usize) -> String {
    " ".repeat(self.tab_width * depth)
  }
}

impl Default for TypeStyle {
  fn default() -> Self {
    TypeStyle {
      single_quote: false,
      semi: true,
      tab_width: 2,
      bracket_spacing: true,
      prefer_unknown_over_any: false,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
  #[error("unresolved reference '{0}'")]
  UnresolvedReference(String),
  #[error("unsupported schema construct '{0}'")]
  Unsupported(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrimitiveType {
  String,
  Number,
  Boolean,
  Null,
  Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnionOrIntersection {
  Union,
  Intersection,
}

#[derive(Debug, Clone)]
enum Literal {
  String(String),
  Raw(String),
}

#[derive(Debug, Clone)]
enum TsType {
  Primitive(PrimitiveType),
  Literal(Literal),
  Array(Box<TsType>),
  Object(TypeObject),
  Composite {
    link: UnionOrIntersection,
    types: Vec<TsType>,
  },
}

#[derive(Debug, Clone)]
struct TypeObject {
  properties: Vec<ObjectProperty>,
  index: Option<Box<TsType>>,
}

#[derive(Debug, Clone)]
struct ObjectProperty {
  name: String,
  ty: TsType,
  required: bool,
  description: Option<String>,
  deprecated: bool,
}

/// A named top-level declaration, printed through `Display`.
#[derive(Debug)]
pub struct TypeInterface {
  name: String,
  style: TypeStyle,
  description: Option<String>,
  ty: TsType,
}

impl TypeInterface {
  fn render(&self, ty: &TsType, depth: usize) -> String {
    match ty {
      TsType::Primitive(primitive) => self.primitive(*primitive).to_string(),
      TsType::Literal(Literal::String(value)) => quote_string(value, self.style.quote()),
      TsType::Literal(Literal::Raw(value)) => value.clone(),
      TsType::Array(inner) => {
        let rendered = self.render(inner, depth);
        if needs_parens(inner) {
          format!("({rendered})[]")
        } else {
          format!("{rendered}[]")
        }
      }
      TsType::Object(object) => self.render_object(object, depth),
      TsType::Composite { link, types } => {
        let mut members: Vec<String> = Vec::with_capacity(types.len());
        for member in types {
          let rendered = self.render(member, depth);
          let rendered = match member {
            TsType::Composite {
              link: inner_link,
              types: inner_types,
            } if inner_link != link && inner_types.len() > 1 => {
              format!("({rendered})")
            }
            _ => rendered,
          };
          if !members.contains(&rendered) {
            members.push(rendered);
          }
        }
        members.join(match link {
          UnionOrIntersection::Union => " | ",
          UnionOrIntersection::Intersection => " & ",
        })
      }
    }
  }

  fn primitive(&self, primitive: PrimitiveType) -> &'static str {
    match primitive {
      PrimitiveType::String => "string",
      PrimitiveType::Number => "number",
      PrimitiveType::Boolean => "boolean",
      PrimitiveType::Null => "null",
      PrimitiveType::Any => {
        if self.style.prefer_unknown_over_any {
          "unknown"
        } else {
          "any"
        }
      }
    }
  }

  fn render_object(&self, object: &TypeObject, depth: usize) -> String {
    if object.properties.is_empty() {
      return match &object.index {
        None => "{}".to_string(),
        Some(index) => {
          let pad = if self.style.bracket_spacing { " " } else { "" };
          format!("{{{pad}[k: string]: {}{pad}}}", self.render(index, depth))
        }
      };
    }

    let inner = self.style.indent(depth + 1);
    let terminator = self.style.terminator();
    let mut lines = Vec::with_capacity(object.properties.len() + 2);

    for property in &object.properties {
      if let Some(comment) =
        self.doc_comment(property.description.as_deref(), property.deprecated, &inner)
      {
        lines.push(comment);
      }
      lines.push(format!(
        "{}{}{}: {}{}",
        inner,
        property_key(&property.name, self.style.quote()),
        if property.required { "" } else { "?" },
        self.render(&property.ty, depth + 1),
        terminator
      ));
    }

    if let Some(index) = &object.index {
      lines.push(format!(
        "{}[k: string]: {}{}",
        inner,
        self.render(index, depth + 1),
        terminator
      ));
    }

    format!("{{\n{}\n{}}}", lines.join("\n"), self.style.indent(depth))
  }

  fn doc_comment(&self, description: Option<&str>, deprecated: bool, indent: &str) -> Option<String> {
    let mut body: Vec<&str> = description
      .map(|d| d.trim().lines().collect())
      .unwrap_or_default();
    if deprecated {
      body.push("@deprecated");
    }
    if body.is_empty() {
      return None;
    }

    let mut comment = format!("{indent}/**\n");
    for line in body {
      let line = line.replace("*/", "*\\/");
      if line.trim().is_empty() {
        comment.push_str(&format!("{indent} *\n"));
      } else {
        comment.push_str(&format!("{indent} * {}\n", line.trim_end()));
      }
    }
    comment.push_str(&format!("{indent} */"));
    Some(comment)
  }
}

impl fmt::Display for TypeInterface {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    if let Some(comment) = self.doc_comment(self.description.as_deref(), false, "") {
      writeln!(f, "{comment}")?;
    }

    match &self.ty {
      TsType::Object(object) => {
        write!(f, "export interface {} {}", self.name, self.render_object(object, 0))
      }
      other => write!(
        f,
        "export type {} = {}{}",
        self.name,
        self.render(other, 0),
        self.style.terminator()
      ),
    }
  }
}

fn needs_parens(ty: &TsType) -> bool {
  matches!(ty, TsType::Composite { types, .. } if types.len() > 1)
}

trait HasEnumeration {
  type ReturnType;
  fn get_enumeration(&self) -> &Vec<Option<Self::ReturnType>>;
  fn to_literal(value: &Self::ReturnType) -> Literal;
}

impl HasEnumeration for StringType {
  type ReturnType = String;
  fn get_enumeration(&self) -> &Vec<Option<Self::ReturnType>> {
    &self.enumeration
  }
  fn to_literal(value: &Self::ReturnType) -> Literal {
    Literal::String(value.clone())
  }
}

impl HasEnumeration for NumberType {
  type ReturnType = f64;
  fn get_enumeration(&self) -> &Vec<Option<Self::ReturnType>> {
    &self.enumeration
  }
  fn to_literal(value: &Self::ReturnType) -> Literal {
    Literal::Raw(value.to_string())
  }
}

impl HasEnumeration for IntegerType {
  type ReturnType = i64;
  fn get_enumeration(&self) -> &Vec<Option<Self::ReturnType>> {
    &self.enumeration
  }
  fn to_literal(value: &Self::ReturnType) -> Literal {
    Literal::Raw(value.to_string())
  }
}

impl HasEnumeration for BooleanType {
  type ReturnType = bool;
  fn get_enumeration(&self) -> &Vec<Option<Self::ReturnType>> {
    &self.enumeration
  }
  fn to_literal(value: &Self::ReturnType) -> Literal {
    Literal::Raw(value.to_string())
  }
}

/// The primitive itself, or a literal union when the schema is an enum.
fn primitive_or_enum<T: HasEnumeration>(type_with_enum: &T, primitive: PrimitiveType) -> TsType {
  let enumeration = type_with_enum.get_enumeration();
  if enumeration.is_empty() {
    return TsType::Primitive(primitive);
  }

  let literals = enumeration
    .iter()
    .map(|value| match value {
      Some(value) => TsType::Literal(T::to_literal(value)),
      None => TsType::Primitive(PrimitiveType::Null),
    })
    .collect();
  union(literals)
}

fn json_literal(value: &Value) -> TsType {
  match value {
    Value::Null => TsType::Primitive(PrimitiveType::Null),
    Value::String(s) => TsType::Literal(Literal::String(s.clone())),
    Value::Number(_) | Value::Bool(_) => TsType::Literal(Literal::Raw(value.to_string())),
    Value::Array(_) | Value::Object(_) => TsType::Primitive(PrimitiveType::Any),
  }
}

fn union(types: Vec<TsType>) -> TsType {
  composite(UnionOrIntersection::Union, types)
}

fn composite(link: UnionOrIntersection, mut types: Vec<TsType>) -> TsType {
  match types.len() {
    0 => TsType::Primitive(PrimitiveType::Any),
    1 => types.remove(0),
    _ => TsType::Composite { link, types },
  }
}

trait SchemaLike {
  fn as_schema(&self) -> &Schema;
}

impl SchemaLike for Schema {
  fn as_schema(&self) -> &Schema {
    self
  }
}

impl SchemaLike for Box<Schema> {
  fn as_schema(&self) -> &Schema {
    self.as_ref()
  }
}

fn item<T: SchemaLike>(schema: &ReferenceOr<T>) -> Result<&Schema, SchemaError> {
  match schema {
    ReferenceOr::Item(schema) => Ok(schema.as_schema()),
    ReferenceOr::Reference { reference } => {
      Err(SchemaError::UnresolvedReference(reference.clone()))
    }
  }
}

fn object_type<'a>(
  properties: impl IntoIterator<Item = (&'a String, &'a ReferenceOr<Box<Schema>>)>,
  required: &[String],
  additional: Option<&AdditionalProperties>,
) -> Result<TsType, SchemaError> {
  let properties = properties
    .into_iter()
    .map(|(name, value)| {
      let schema = item(value)?;
      Ok(ObjectProperty {
        name: name.clone(),
        ty: schema_to_type(value)?,
        required: required.contains(name),
        description: schema.schema_data.description.clone(),
        deprecated: schema.schema_data.deprecated,
      })
    })
    .collect::<Result<Vec<ObjectProperty>, SchemaError>>()?;

  let index = match additional {
    None | Some(AdditionalProperties::Any(true)) => {
      Some(Box::new(TsType::Primitive(PrimitiveType::Any)))
    }
    Some(AdditionalProperties::Any(false)) => None,
    Some(AdditionalProperties::Schema(schema)) => Some(Box::new(schema_to_type(schema.as_ref())?)),
  };

  Ok(TsType::Object(TypeObject { properties, index }))
}

fn composite_of(
  schemas: &[ReferenceOr<Schema>],
  link: UnionOrIntersection,
) -> Result<TsType, SchemaError> {
  let types = schemas
    .iter()
    .map(schema_to_type)
    .collect::<Result<Vec<TsType>, SchemaError>>()?;
  Ok(composite(link, types))
}

fn schema_to_type<T: SchemaLike>(schema: &ReferenceOr<T>) -> Result<TsType, SchemaError> {
  let schema = item(schema)?;

  let base = match &schema.schema_kind {
    SchemaKind::Type(Type::String(string_type)) => {
      primitive_or_enum(string_type, PrimitiveType::String)
    }
    SchemaKind::Type(Type::Number(number_type)) => {
      primitive_or_enum(number_type, PrimitiveType::Number)
    }
    SchemaKind::Type(Type::Integer(integer_type)) => {
      primitive_or_enum(integer_type, PrimitiveType::Number)
    }
    SchemaKind::Type(Type::Boolean(boolean_type)) => {
      primitive_or_enum(boolean_type, PrimitiveType::Boolean)
    }
    SchemaKind::Type(Type::Array(array)) => match &array.items {
      Some(items) => TsType::Array(Box::new(schema_to_type(items)?)),
      None => TsType::Array(Box::new(TsType::Primitive(PrimitiveType::Any))),
    },
    SchemaKind::Type(Type::Object(object)) => object_type(
      &object.properties,
      &object.required,
      object.additional_properties.as_ref(),
    )?,
    SchemaKind::OneOf { one_of } => composite_of(one_of, UnionOrIntersection::Union)?,
    SchemaKind::AnyOf { any_of } => composite_of(any_of, UnionOrIntersection::Union)?,
    SchemaKind::AllOf { all_of } => composite_of(all_of, UnionOrIntersection::Intersection)?,
    SchemaKind::Not { .. } => return Err(SchemaError::Unsupported("not")),
    SchemaKind::Any(any) => {
      if !any.properties.is_empty() || any.additional_properties.is_some() {
        object_type(&any.properties, &any.required, any.additional_properties.as_ref())?
      } else if !any.enumeration.is_empty() {
        union(any.enumeration.iter().map(json_literal).collect())
      } else if let Some(items) = &any.items {
        TsType::Array(Box::new(schema_to_type(items)?))
      } else {
        TsType::Primitive(PrimitiveType::Any)
      }
    }
  };

  if !schema.schema_data.nullable {
    return Ok(base);
  }
  Ok(match base {
    TsType::Composite {
      link: UnionOrIntersection::Union,
      mut types,
    } => {
      types.push(TsType::Primitive(PrimitiveType::Null));
      union(types)
    }
    other => union(vec![other, TsType::Primitive(PrimitiveType::Null)]),
  })
}

pub fn schema_to_typescript(
  name: String,
  schema: &ReferenceOr<Schema>,
  style: Option<TypeStyle>,
) -> Result<TypeInterface, SchemaError> {
  let description = item(schema)?.schema_data.description.clone();

  Ok(TypeInterface {
    name,
    style: style.unwrap_or_default(),
    description,
    ty: schema_to_type(schema)?,
  })
}
