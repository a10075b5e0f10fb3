use std::collections::BTreeMap;

use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// A decoded text entry of a submission.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, JsonSchema)]
pub struct PathContent {
    pub path: String,
    pub content: String,
}

impl PathContent {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Locator for a source that could not be resolved locally.
///
/// `urls` are copied verbatim from the manifest (`bzz-raw://`, `dweb:/ipfs/`, ...) so an
/// external fetcher can retrieve the content and check it against `keccak256`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct MissingSource {
    pub keccak256: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ContractReport {
    pub manifest_path: String,
    pub compiled_path: String,
    pub name: String,
    pub valid: bool,
    /// Declared source path -> path of the entry it was resolved to.
    #[serde(default)]
    pub found: BTreeMap<String, String>,
    #[serde(default)]
    pub missing: BTreeMap<String, MissingSource>,
    #[serde(default)]
    pub invalid: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct SubmissionReport {
    pub schema_version: u32,
    pub contracts: Vec<ContractReport>,
    #[serde(default)]
    pub unused: Vec<String>,
    #[serde(default)]
    pub ignored: Vec<String>,
}

impl SubmissionReport {
    #[must_use]
    pub fn new(contracts: Vec<ContractReport>) -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            contracts,
            unused: Vec::new(),
            ignored: Vec::new(),
        }
    }

    #[must_use]
    pub fn all_valid(&self) -> bool {
        self.contracts.iter().all(|contract| contract.valid)
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
