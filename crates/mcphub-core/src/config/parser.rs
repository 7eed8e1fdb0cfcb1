//! Store document parsing with helpful error messages.
//!
//! Normalizes every accepted input shape into one canonical mapping of
//! alias to [`ServerOverride`].

use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::schema::{PACKAGE_KEYS, SERVERS_KEY, ServerOverride};
use crate::error::{Error, Result};

/// A parsed store file.
///
/// Root members other than the server mapping are kept in `extra` so that
/// rewriting the file never drops content the user put there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreDocument {
    pub servers: IndexMap<String, ServerOverride>,
    /// Root members next to `mcpServers`, written back unchanged
    pub extra: Map<String, Value>,
}

impl StoreDocument {
    /// Serialize into the canonical wrapped document.
    pub fn to_json(&self) -> Result<String> {
        render(&self.servers, &self.extra)
    }
}

/// Read and normalize a store file.
pub fn parse_store(path: &Path) -> Result<IndexMap<String, ServerOverride>> {
    parse_store_document(path).map(|document| document.servers)
}

/// Normalize store content.
///
/// Accepts the canonical `{"mcpServers": {...}}` root as well as a bare
/// alias map, and per-alias values that are either an object or a
/// one-element array holding the object.
pub fn parse_store_str(content: &str, path: &Path) -> Result<IndexMap<String, ServerOverride>> {
    parse_document_str(content, path).map(|document| document.servers)
}

/// Read a store file, keeping root members outside the server mapping.
pub fn parse_store_document(path: &Path) -> Result<StoreDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_document_str(&content, path)
}

pub fn parse_document_str(content: &str, path: &Path) -> Result<StoreDocument> {
    if content.trim().is_empty() {
        return Ok(StoreDocument::default());
    }

    let root: Value = serde_json::from_str(content).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        message: json_error_message(&e, content),
    })?;

    let Value::Object(root) = root else {
        return Err(Error::ConfigParse {
            path: path.to_path_buf(),
            message: "expected a JSON object at the document root".to_string(),
        });
    };

    let (servers, extra) = split_root(root, path)?;

    let mut normalized = IndexMap::with_capacity(servers.len());
    for (alias, value) in servers {
        let entry = normalize_entry(&alias, value)?;
        normalized.insert(alias, entry);
    }
    Ok(StoreDocument {
        servers: normalized,
        extra,
    })
}

/// Split the root into the server mapping and everything else.
///
/// A root without `mcpServers` is a bare alias map and has no extras.
fn split_root(
    mut root: Map<String, Value>,
    path: &Path,
) -> Result<(Map<String, Value>, Map<String, Value>)> {
    let Some(servers) = root.remove(SERVERS_KEY) else {
        return Ok((root, Map::new()));
    };

    if !root.is_empty() {
        let kept: Vec<&str> = root.keys().map(String::as_str).collect();
        tracing::warn!(
            path = %path.display(),
            keys = ?kept,
            "top-level keys outside '{}' are not used as servers; they are kept as-is",
            SERVERS_KEY
        );
    }

    match servers {
        Value::Object(map) => Ok((map, root)),
        Value::Null => Ok((Map::new(), root)),
        _ => Err(Error::ConfigParse {
            path: path.to_path_buf(),
            message: format!("expected '{}' to be a JSON object", SERVERS_KEY),
        }),
    }
}

fn normalize_entry(alias: &str, value: Value) -> Result<ServerOverride> {
    let object = match value {
        Value::Object(object) => object,
        Value::Array(mut items) => {
            if items.len() != 1 {
                return Err(Error::schema(
                    alias,
                    format!(
                        "each alias must have exactly one configuration, found {}",
                        items.len()
                    ),
                ));
            }
            match items.remove(0) {
                Value::Object(object) => object,
                other => {
                    return Err(Error::schema(
                        alias,
                        format!("expected a configuration object, found {}", kind_of(&other)),
                    ));
                }
            }
        }
        other => {
            return Err(Error::schema(
                alias,
                format!("expected a configuration object, found {}", kind_of(&other)),
            ));
        }
    };

    let spellings: Vec<&str> = PACKAGE_KEYS
        .iter()
        .copied()
        .filter(|key| object.contains_key(*key))
        .collect();
    if spellings.len() > 1 {
        return Err(Error::schema(
            alias,
            format!("package given more than once ({})", spellings.join(", ")),
        ));
    }

    serde_json::from_value(Value::Object(object))
        .map_err(|e| Error::schema(alias, e.to_string()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serialize servers into the canonical store document.
pub fn to_json(servers: &IndexMap<String, ServerOverride>) -> Result<String> {
    render(servers, &Map::new())
}

fn render(
    servers: &IndexMap<String, ServerOverride>,
    extra: &Map<String, Value>,
) -> Result<String> {
    let mut root = Map::with_capacity(extra.len() + 1);
    root.insert(SERVERS_KEY.to_string(), serde_json::to_value(servers)?);
    for (key, value) in extra {
        root.insert(key.clone(), value.clone());
    }

    let mut out = serde_json::to_string_pretty(&Value::Object(root))?;
    out.push('\n');
    Ok(out)
}

/// Describe a JSON syntax error with the surrounding source lines.
pub(crate) fn json_error_message(error: &serde_json::Error, content: &str) -> String {
    let line = error.line();
    if line == 0 {
        return format!("JSON parsing error: {}", error);
    }
    format!(
        "JSON parsing error at line {}, column {}:\n{}\n\nError: {}",
        line,
        error.column(),
        line_context(content, line),
        error
    )
}

/// Describe a TOML syntax error with the surrounding source lines.
pub(crate) fn toml_error_message(error: &toml::de::Error, content: &str) -> String {
    let line = error
        .span()
        .map(|span| content[..span.start.min(content.len())].matches('\n').count() + 1);

    match line {
        Some(line) => format!(
            "TOML parsing error at line {}:\n{}\n\nError: {}",
            line,
            line_context(content, line),
            error.message()
        ),
        None => format!("TOML parsing error: {}", error),
    }
}

/// Lines around `line_num` (1-based) with the target line marked.
fn line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());
    if start >= end {
        return String::new();
    }

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
