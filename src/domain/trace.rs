use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::time::Instant;

const REDACTED: &str = "*****";

/// Object keys whose values are always replaced, whatever their shape.
const SECRET_KEYS: &[&str] = &["token"];

/// Known credential shapes. This is configuration data, not logic: the list
/// will drift as token formats evolve and can be extended without touching
/// the sanitizer itself.
const SECRET_PREFIXES: &[&str] = &[
    "ghp_",
    "gho_",
    "ghu_",
    "ghs_",
    "ghr_",
    "github_pat_",
    "Bearer ",
];

/// Diagnostic record of the collaborator calls a procedure made, in call
/// order, with timestamps taken from a monotonic clock so entries can be used
/// for latency analysis.
///
/// The trace is append-only and order-preserving. Recording under a name that
/// already exists overwrites the entry in place, keeping its original
/// position; two distinct calls that share a name therefore collapse into
/// one entry. Traces are attached to log records only and never rendered to
/// HTTP clients.
#[derive(Debug, Clone)]
pub struct CallTrace {
    origin: Instant,
    calls: IndexMap<String, TraceEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TraceEntry {
    content: Value,
    elapsed_micros: u128,
}

impl TraceEntry {
    pub fn content(&self) -> &Value {
        &self.content
    }
}

impl CallTrace {
    /// Every trace starts with a synthetic `init` entry so it is never empty
    /// and always carries its origin point.
    pub fn new() -> Self {
        let origin = Instant::now();
        let mut calls = IndexMap::new();
        calls.insert(
            "init".to_string(),
            TraceEntry {
                content: json!({}),
                elapsed_micros: 0,
            },
        );

        Self { origin, calls }
    }

    pub fn record(&mut self, name: &str, content: Value) {
        self.calls.insert(
            name.to_string(),
            TraceEntry {
                content: sanitize(&content),
                elapsed_micros: self.origin.elapsed().as_micros(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&TraceEntry> {
        self.calls.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.calls.keys().map(|key| key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl Default for CallTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for CallTrace {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.calls.len()))?;
        for (name, entry) in &self.calls {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

/// Recursively redact anything credential-shaped before it reaches a log
/// sink. Trace content is arbitrary collaborator output, so every `Value`
/// shape must pass through without panicking.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::String(text) => {
            if looks_like_credential(text) {
                Value::String(REDACTED.to_string())
            } else {
                value.clone()
            }
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        Value::Object(fields) => {
            let mut sanitized = serde_json::Map::with_capacity(fields.len());
            for (key, field) in fields {
                if SECRET_KEYS.contains(&key.as_str()) {
                    sanitized.insert(key.clone(), Value::String(REDACTED.to_string()));
                } else {
                    sanitized.insert(key.clone(), sanitize(field));
                }
            }
            Value::Object(sanitized)
        }
        _ => value.clone(),
    }
}

fn looks_like_credential(text: &str) -> bool {
    SECRET_PREFIXES
        .iter()
        .any(|prefix| text.starts_with(prefix))
}
