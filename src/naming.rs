//! Naming helpers shared by the emitters.

/// Split an identifier into words on separators, case changes and digit runs.
///
/// `listUsersV2` → `list`, `Users`, `V`, `2`; `HTMLParser` → `HTML`, `Parser`.
pub fn split_words(input: &str) -> Vec<String> {
  let chars: Vec<char> = input.chars().collect();
  let mut words = Vec::new();
  let mut current = String::new();

  for (i, &c) in chars.iter().enumerate() {
    if !c.is_alphanumeric() {
      if !current.is_empty() {
        words.push(std::mem::take(&mut current));
      }
      continue;
    }

    if !current.is_empty() {
      let prev = chars[i - 1];
      let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
      let boundary = (prev.is_lowercase() && c.is_uppercase())
        || (prev.is_alphabetic() != c.is_alphabetic())
        || (prev.is_uppercase() && c.is_uppercase() && next_is_lower);
      if boundary {
        words.push(std::mem::take(&mut current));
      }
    }
    current.push(c);
  }

  if !current.is_empty() {
    words.push(current);
  }
  words
}

pub fn kebab_case(input: &str) -> String {
  split_words(input)
    .iter()
    .map(|word| word.to_lowercase())
    .collect::<Vec<String>>()
    .join("-")
}

pub fn upper_first(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    None => String::new(),
  }
}

/// Whether `name` can be used unquoted as a JavaScript property key.
pub fn is_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  match chars.next() {
    Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
      chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    }
    _ => false,
  }
}

/// Render `value` as a JavaScript string literal delimited by `quote`.
pub fn quote_string(value: &str, quote: char) -> String {
  let mut out = String::with_capacity(value.len() + 2);
  out.push(quote);
  for c in value.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      c if c == quote => {
        out.push('\\');
        out.push(c);
      }
      c => out.push(c),
    }
  }
  out.push(quote);
  out
}

pub fn property_key(name: &str, quote: char) -> String {
  if is_identifier(name) {
    name.to_string()
  } else {
    quote_string(name, quote)
  }
}
