//! The `operationId → { path, method }` table embedded in `api.ts`.
//!
//! The table is first serialized as compact object-literal source and then run
//! through [`format_source`], a small formatter for the subset of JavaScript
//! literals the table can contain.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use serde::Serialize;

use crate::extract::HttpMethod;
use crate::naming::{property_key, quote_string};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionEntry {
  pub path: String,
  pub method: HttpMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionTable {
  entries: Vec<(String, DefinitionEntry)>,
}

impl DefinitionTable {
  pub fn get(&self, operation_id: &str) -> Option<&DefinitionEntry> {
    self
      .entries
      .iter()
      .find(|(id, _)| id == operation_id)
      .map(|(_, entry)| entry)
  }

  /// Add or replace the entry for `operation_id`, keeping its first position.
  pub fn insert(&mut self, operation_id: &str, entry: DefinitionEntry) {
    match self.entries.iter_mut().find(|(id, _)| id == operation_id) {
      Some((_, existing)) => *existing = entry,
      None => self.entries.push((operation_id.to_string(), entry)),
    }
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &DefinitionEntry)> {
    self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
  }

  /// Compact source of the table wrapped in parentheses, e.g.
  /// `({ getUser: { path: "/users/{id}", method: "get" } })`.
  pub fn to_source(&self) -> String {
    let entries = self
      .iter()
      .map(|(id, entry)| {
        format!(
          "{}: {{ path: {}, method: {} }}",
          property_key(id, '"'),
          quote_string(&entry.path, '"'),
          quote_string(entry.method.as_str(), '"'),
        )
      })
      .collect::<Vec<String>>();

    if entries.is_empty() {
      "({})".to_string()
    } else {
      format!("({{ {} }})", entries.join(", "))
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
  pub offset: usize,
  pub reason: String,
}

impl fmt::Display for FormatError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{} at offset {}", self.reason, self.offset)
  }
}

impl std::error::Error for FormatError {}

#[derive(Debug, Clone, PartialEq)]
enum Token {
  Punct(char),
  Str(String),
  Word(String),
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, FormatError> {
  let mut tokens = Vec::new();
  let mut chars = source.char_indices().peekable();

  while let Some(&(offset, c)) = chars.peek() {
    match c {
      c if c.is_whitespace() => {
        chars.next();
      }
      '{' | '}' | '[' | ']' | '(' | ')' | ':' | ',' => {
        chars.next();
        tokens.push((offset, Token::Punct(c)));
      }
      '\'' | '"' => {
        chars.next();
        tokens.push((offset, Token::Str(read_string(&mut chars, c, offset)?)));
      }
      c if c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '-' | '+') => {
        let mut word = String::new();
        while let Some(&(_, c)) = chars.peek() {
          if c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '-' | '+') {
            word.push(c);
            chars.next();
          } else {
            break;
          }
        }
        tokens.push((offset, Token::Word(word)));
      }
      other => {
        return Err(FormatError {
          offset,
          reason: format!("unexpected character '{other}'"),
        })
      }
    }
  }

  Ok(tokens)
}

fn read_string(
  chars: &mut Peekable<CharIndices>,
  quote: char,
  start: usize,
) -> Result<String, FormatError> {
  let mut value = String::new();
  while let Some((_, c)) = chars.next() {
    match c {
      '\\' => match chars.next() {
        Some((_, 'n')) => value.push('\n'),
        Some((_, 'r')) => value.push('\r'),
        Some((_, 't')) => value.push('\t'),
        Some((_, escaped)) => value.push(escaped),
        None => break,
      },
      c if c == quote => return Ok(value),
      c => value.push(c),
    }
  }
  Err(FormatError {
    offset: start,
    reason: "unterminated string".to_string(),
  })
}

#[derive(Debug)]
enum Node {
  Object(Vec<(String, Node)>),
  Array(Vec<Node>),
  Group(Box<Node>),
  Str(String),
  Word(String),
}

struct Parser {
  tokens: Vec<(usize, Token)>,
  position: usize,
  end: usize,
}

impl Parser {
  fn offset(&self) -> usize {
    self
      .tokens
      .get(self.position)
      .map(|(offset, _)| *offset)
      .unwrap_or(self.end)
  }

  fn error(&self, reason: impl Into<String>) -> FormatError {
    FormatError {
      offset: self.offset(),
      reason: reason.into(),
    }
  }

  fn advance(&mut self) -> Option<Token> {
    let token = self.tokens.get(self.position).map(|(_, token)| token.clone());
    self.position += 1;
    token
  }

  fn peek_is(&self, punct: char) -> bool {
    matches!(self.tokens.get(self.position), Some((_, Token::Punct(c))) if *c == punct)
  }

  fn expect(&mut self, punct: char) -> Result<(), FormatError> {
    if self.peek_is(punct) {
      self.position += 1;
      Ok(())
    } else {
      Err(self.error(format!("expected '{punct}'")))
    }
  }

  fn value(&mut self) -> Result<Node, FormatError> {
    match self.advance() {
      Some(Token::Punct('{')) => self.object(),
      Some(Token::Punct('[')) => self.array(),
      Some(Token::Punct('(')) => {
        let inner = self.value()?;
        self.expect(')')?;
        Ok(Node::Group(Box::new(inner)))
      }
      Some(Token::Str(value)) => Ok(Node::Str(value)),
      Some(Token::Word(word)) => Ok(Node::Word(word)),
      Some(Token::Punct(c)) => {
        self.position -= 1;
        Err(self.error(format!("unexpected '{c}'")))
      }
      None => Err(self.error("unexpected end of input")),
    }
  }

  fn object(&mut self) -> Result<Node, FormatError> {
    let mut members = Vec::new();
    loop {
      if self.peek_is('}') {
        self.position += 1;
        return Ok(Node::Object(members));
      }
      let key = match self.advance() {
        Some(Token::Str(key)) | Some(Token::Word(key)) => key,
        _ => {
          self.position -= 1;
          return Err(self.error("expected a property key"));
        }
      };
      self.expect(':')?;
      members.push((key, self.value()?));
      if !self.peek_is('}') {
        self.expect(',')?;
      }
    }
  }

  fn array(&mut self) -> Result<Node, FormatError> {
    let mut items = Vec::new();
    loop {
      if self.peek_is(']') {
        self.position += 1;
        return Ok(Node::Array(items));
      }
      items.push(self.value()?);
      if !self.peek_is(']') {
        self.expect(',')?;
      }
    }
  }
}

fn emit(node: &Node, depth: usize, out: &mut String) {
  let indent = "  ".repeat(depth);
  match node {
    Node::Object(members) if members.is_empty() => out.push_str("{}"),
    Node::Object(members) => {
      out.push_str("{\n");
      for (key, value) in members {
        out.push_str(&indent);
        out.push_str("  ");
        out.push_str(&property_key(key, '\''));
        out.push_str(": ");
        emit(value, depth + 1, out);
        out.push_str(",\n");
      }
      out.push_str(&indent);
      out.push('}');
    }
    Node::Array(items) if items.is_empty() => out.push_str("[]"),
    Node::Array(items) => {
      out.push_str("[\n");
      for item in items {
        out.push_str(&indent);
        out.push_str("  ");
        emit(item, depth + 1, out);
        out.push_str(",\n");
      }
      out.push_str(&indent);
      out.push(']');
    }
    Node::Group(inner) => {
      out.push('(');
      emit(inner, depth, out);
      out.push(')');
    }
    Node::Str(value) => out.push_str(&quote_string(value, '\'')),
    Node::Word(word) => out.push_str(word),
  }
}

/// Re-emit a literal expression in canonical layout.
pub fn format_source(source: &str) -> Result<String, FormatError> {
  let mut parser = Parser {
    tokens: tokenize(source)?,
    position: 0,
    end: source.len(),
  };
  let node = parser.value()?;
  if parser.position < parser.tokens.len() {
    return Err(parser.error("trailing input"));
  }

  let mut out = String::with_capacity(source.len() * 2);
  emit(&node, 0, &mut out);
  Ok(out)
}
