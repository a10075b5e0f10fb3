use std::collections::BTreeMap;

use metacheck_protocol::{MissingSource, PathContent};

use crate::hash_index::{keccak256, normalize_digest, HashIndex};
use crate::manifest::{BuildManifest, ManifestSource};

pub const INLINE_HASH_MISMATCH: &str =
    "hash mismatch: keccak256 of the inline content differs from the declared keccak256";

/// Where each declared source of one manifest ended up.
///
/// Every declared path lands in exactly one of the three maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePartition {
    pub found: BTreeMap<String, PathContent>,
    pub missing: BTreeMap<String, MissingSource>,
    pub invalid: BTreeMap<String, String>,
}

/// Resolves every source declared by `manifest`, counting index hits.
///
/// Inline content is authoritative: when its digest does not match, the source is invalid and
/// the index is not consulted for it.
pub fn resolve_sources(manifest: &BuildManifest, index: &mut HashIndex) -> SourcePartition {
    let mut partition = SourcePartition::default();

    for (path, source) in &manifest.sources {
        match &source.content {
            Some(content) => resolve_inline(&mut partition, path, source, content),
            None => match index.claim(&source.keccak256) {
                Some(found) => {
                    partition.found.insert(path.clone(), found.clone());
                }
                None => {
                    partition.missing.insert(
                        path.clone(),
                        MissingSource {
                            keccak256: source.keccak256.clone(),
                            urls: source.urls.clone(),
                        },
                    );
                }
            },
        }
    }

    partition
}

fn resolve_inline(
    partition: &mut SourcePartition,
    path: &str,
    source: &ManifestSource,
    content: &str,
) {
    if keccak256(content) == normalize_digest(&source.keccak256) {
        partition
            .found
            .insert(path.to_string(), PathContent::new(path, content));
    } else {
        partition
            .invalid
            .insert(path.to_string(), INLINE_HASH_MISMATCH.to_string());
    }
}
