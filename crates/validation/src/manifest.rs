//! Build manifest ("metadata") recognition.
//!
//! A manifest may arrive in three shapes: as a plain JSON document, as a JSON string whose
//! value is the document (double encoding), or embedded verbatim as an escaped string inside
//! some other JSON document (e.g. a build artifact with a `"metadata"` field). Each shape is
//! tried in that order; the first that qualifies wins.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const SOLIDITY: &str = "Solidity";

/// Compiler-produced description of one compilation unit.
///
/// Only `sources` and `settings.compilationTarget` are interpreted; everything else is kept
/// opaque so the manifest serializes back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildManifest {
    pub language: String,
    pub compiler: Value,
    #[serde(default)]
    pub settings: ManifestSettings,
    #[serde(default)]
    pub sources: BTreeMap<String, ManifestSource>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ManifestSettings {
    #[serde(rename = "compilationTarget", default)]
    pub compilation_target: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestSource {
    #[serde(default)]
    pub keccak256: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BuildManifest {
    /// The single `(compiled path, contract name)` pair, if exactly one is declared.
    #[must_use]
    pub fn compilation_target(&self) -> Option<(&str, &str)> {
        let mut targets = self.settings.compilation_target.iter();
        match (targets.next(), targets.next()) {
            (Some((path, name)), None) => Some((path.as_str(), name.as_str().unwrap_or_default())),
            _ => None,
        }
    }
}

/// Outcome of inspecting one decoded entry
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Manifest(Box<BuildManifest>),
    /// Looks like a manifest but cannot be used; carries the reason.
    Malformed(String),
    NotManifest,
}

/// Classifies `text` as a usable manifest, a malformed one, or something else.
#[must_use]
pub fn detect(text: &str) -> Detection {
    let Some(value) = find_manifest_value(text) else {
        return Detection::NotManifest;
    };

    let manifest: BuildManifest = match serde_json::from_value(value) {
        Ok(manifest) => manifest,
        Err(err) => return Detection::Malformed(format!("unreadable manifest: {err}")),
    };

    let targets = manifest.settings.compilation_target.len();
    if targets != 1 {
        return Detection::Malformed(format!(
            "settings.compilationTarget declares {targets} entries, expected exactly 1"
        ));
    }

    Detection::Manifest(Box::new(manifest))
}

fn find_manifest_value(text: &str) -> Option<Value> {
    if let Some(value) = parse_qualifying(text) {
        return Some(value);
    }

    let embedded = nested_manifest_pattern().find(text)?;
    parse_qualifying(embedded.as_str())
}

/// Parses `text`, unwrapping one level of string encoding when the outer value is a string.
fn parse_qualifying(text: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(text).ok()?;
    if is_manifest(&value) {
        return Some(value);
    }

    let Value::String(inner) = value else {
        return None;
    };
    let inner: Value = serde_json::from_str(&inner).ok()?;
    is_manifest(&inner).then_some(inner)
}

fn is_manifest(value: &Value) -> bool {
    let language_matches = value
        .get("language")
        .and_then(Value::as_str)
        .is_some_and(|language| language == SOLIDITY);
    language_matches && value.get("compiler").is_some_and(is_non_empty)
}

fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Bool(true) | Value::Number(_) => true,
    }
}

/// Matches a canonical manifest serialized as an escaped JSON string, quotes included.
fn nested_manifest_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""\{\\"compiler\\":\{\\"version\\".*?\},\\"version\\":1\}""#)
            .unwrap_or_else(|err| unreachable!("nested manifest pattern is valid: {err}"))
    })
}
