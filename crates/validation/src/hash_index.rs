use std::collections::HashMap;

use metacheck_protocol::PathContent;
use sha3::{Digest, Keccak256};

/// Keccak-256 of `content`, rendered as `0x` + 64 lowercase hex characters.
#[must_use]
pub fn keccak256(content: &str) -> String {
    let mut hasher = Keccak256::new();
    hasher.update(content.as_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

/// Canonical form of a declared digest: trimmed, lowercase, `0x`-prefixed.
#[must_use]
pub fn normalize_digest(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    if lowered.starts_with("0x") {
        lowered
    } else {
        format!("0x{lowered}")
    }
}

/// Indexed content together with how many manifest sources resolved to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountableContent {
    pub content: PathContent,
    pub uses: usize,
}

/// Digest -> content index over the non-manifest files of one submission.
#[derive(Debug, Default)]
pub struct HashIndex {
    entries: HashMap<String, CountableContent>,
}

impl HashIndex {
    /// Indexes `files` by digest. A later file with the same digest replaces the earlier one.
    #[must_use]
    pub fn build(files: impl IntoIterator<Item = PathContent>) -> Self {
        let mut entries = HashMap::new();
        for file in files {
            let digest = keccak256(&file.content);
            if let Some(previous) = entries.insert(
                digest,
                CountableContent {
                    content: file,
                    uses: 0,
                },
            ) {
                log::debug!(
                    "Duplicate content {} replaced by a later file",
                    previous.content.path
                );
            }
        }
        Self { entries }
    }

    /// Looks up a declared digest and counts the hit.
    pub fn claim(&mut self, declared: &str) -> Option<&PathContent> {
        let entry = self.entries.get_mut(&normalize_digest(declared))?;
        entry.uses += 1;
        Some(&entry.content)
    }

    #[must_use]
    pub fn get(&self, digest: &str) -> Option<&CountableContent> {
        self.entries.get(&normalize_digest(digest))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Files no manifest resolved to, ordered by path.
    #[must_use]
    pub fn unused(&self) -> Vec<PathContent> {
        let mut unused: Vec<PathContent> = self
            .entries
            .values()
            .filter(|entry| entry.uses == 0)
            .map(|entry| entry.content.clone())
            .collect();
        unused.sort_by(|a, b| a.path.cmp(&b.path));
        unused
    }
}
