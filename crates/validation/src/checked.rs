use std::collections::BTreeMap;
use std::fmt::Write as _;

use metacheck_protocol::{ContractReport, MissingSource, PathContent};

use crate::manifest::BuildManifest;
use crate::resolver::SourcePartition;

/// One manifest together with the outcome of resolving its sources
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedContract {
    manifest_path: String,
    manifest: BuildManifest,
    found_sources: BTreeMap<String, PathContent>,
    missing_sources: BTreeMap<String, MissingSource>,
    invalid_sources: BTreeMap<String, String>,
}

impl CheckedContract {
    #[must_use]
    pub fn new(
        manifest_path: impl Into<String>,
        manifest: BuildManifest,
        partition: SourcePartition,
    ) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            manifest,
            found_sources: partition.found,
            missing_sources: partition.missing,
            invalid_sources: partition.invalid,
        }
    }

    #[must_use]
    pub fn manifest_path(&self) -> &str {
        &self.manifest_path
    }

    #[must_use]
    pub const fn manifest(&self) -> &BuildManifest {
        &self.manifest
    }

    #[must_use]
    pub const fn found_sources(&self) -> &BTreeMap<String, PathContent> {
        &self.found_sources
    }

    #[must_use]
    pub const fn missing_sources(&self) -> &BTreeMap<String, MissingSource> {
        &self.missing_sources
    }

    #[must_use]
    pub const fn invalid_sources(&self) -> &BTreeMap<String, String> {
        &self.invalid_sources
    }

    /// Path of the compiled entry file, from `settings.compilationTarget`.
    #[must_use]
    pub fn compiled_path(&self) -> &str {
        self.manifest
            .compilation_target()
            .map_or("", |(path, _)| path)
    }

    /// Name of the compiled contract, from `settings.compilationTarget`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.manifest
            .compilation_target()
            .map_or("", |(_, name)| name)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.missing_sources.is_empty() && self.invalid_sources.is_empty()
    }

    /// Identity line followed by one line per missing or invalid source.
    #[must_use]
    pub fn info(&self) -> String {
        let mut out = format!(
            "{}:{} (manifest {})",
            self.compiled_path(),
            self.name(),
            self.manifest_path
        );
        if !self.missing_sources.is_empty() {
            let _ = write!(out, "\n  {} missing:", self.missing_sources.len());
            for (path, missing) in &self.missing_sources {
                let _ = write!(out, "\n    {path} (keccak256: {})", missing.keccak256);
            }
        }
        if !self.invalid_sources.is_empty() {
            let _ = write!(out, "\n  {} invalid:", self.invalid_sources.len());
            for (path, reason) in &self.invalid_sources {
                let _ = write!(out, "\n    {path}: {reason}");
            }
        }
        out
    }

    #[must_use]
    pub fn to_report(&self) -> ContractReport {
        ContractReport {
            manifest_path: self.manifest_path.clone(),
            compiled_path: self.compiled_path().to_string(),
            name: self.name().to_string(),
            valid: self.is_valid(),
            found: self
                .found_sources
                .iter()
                .map(|(declared, content)| (declared.clone(), content.path.clone()))
                .collect(),
            missing: self.missing_sources.clone(),
            invalid: self.invalid_sources.clone(),
        }
    }
}

/// Joins the diagnostics of every invalid contract into one message.
#[must_use]
pub fn aggregate_info(contracts: &[CheckedContract]) -> Option<String> {
    let invalid: Vec<String> = contracts
        .iter()
        .filter(|contract| !contract.is_valid())
        .map(CheckedContract::info)
        .collect();
    if invalid.is_empty() {
        return None;
    }
    Some(format!(
        "{} of {} contracts have unresolved sources:\n{}",
        invalid.len(),
        contracts.len(),
        invalid.join("\n")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn contract(partition: SourcePartition) -> CheckedContract {
        let manifest: BuildManifest = serde_json::from_value(json!({
            "language": "Solidity",
            "compiler": {"version": "0.8.19"},
            "settings": {"compilationTarget": {"contracts/Token.sol": "Token"}},
            "sources": {"contracts/Token.sol": {"keccak256": "0x01"}},
        }))
        .unwrap();
        CheckedContract::new("bundle/metadata.json", manifest, partition)
    }

    #[test]
    fn valid_contract_reports_identity_only() {
        let mut partition = SourcePartition::default();
        partition.found.insert(
            "contracts/Token.sol".to_string(),
            PathContent::new("upload/Token.sol", "contract Token {}"),
        );
        let checked = contract(partition);

        assert!(checked.is_valid());
        assert_eq!(checked.compiled_path(), "contracts/Token.sol");
        assert_eq!(checked.name(), "Token");
        assert_eq!(
            checked.info(),
            "contracts/Token.sol:Token (manifest bundle/metadata.json)"
        );
        assert_eq!(aggregate_info(&[checked.clone()]), None);

        let report = checked.to_report();
        assert!(report.valid);
        assert_eq!(
            report.found.get("contracts/Token.sol").map(String::as_str),
            Some("upload/Token.sol")
        );
    }

    #[test]
    fn invalid_contract_lists_missing_and_invalid_sources() {
        let mut partition = SourcePartition::default();
        partition.missing.insert(
            "contracts/Token.sol".to_string(),
            MissingSource {
                keccak256: "0x01".to_string(),
                urls: vec![],
            },
        );
        partition
            .invalid
            .insert("lib/Math.sol".to_string(), "hash mismatch".to_string());
        let checked = contract(partition);

        assert!(!checked.is_valid());
        assert_eq!(
            checked.info(),
            "contracts/Token.sol:Token (manifest bundle/metadata.json)\n  \
             1 missing:\n    contracts/Token.sol (keccak256: 0x01)\n  \
             1 invalid:\n    lib/Math.sol: hash mismatch"
        );

        let message = aggregate_info(&[checked.clone(), contract(SourcePartition::default())])
            .unwrap();
        assert!(message.starts_with("1 of 2 contracts have unresolved sources:\n"));
        assert!(message.ends_with(&checked.info()));
    }
}
