//! # Metacheck Validation
//!
//! Finds Solidity build manifests ("metadata") in a submission and reconstructs the exact
//! set of source files each one was compiled from.
//!
//! ## Pipeline
//!
//! ```text
//! Paths / buffers
//!     │
//!     ├──> Archive Expander (zip, nested zip)
//!     │      └─> Flat raw entries
//!     │
//!     ├──> Manifest Detector (plain, double-encoded, nested)
//!     │      └─> Manifests + other files
//!     │
//!     ├──> Hash Index (keccak256 -> file, usage count)
//!     │
//!     └──> Source Resolver (per manifest)
//!            └─> CheckedContract { found, missing, invalid }
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use metacheck_validation::validate_from_paths;
//!
//! fn main() -> metacheck_validation::Result<()> {
//!     let mut ignored = Vec::new();
//!     let contracts = validate_from_paths(&["/path/to/upload"], Some(&mut ignored))?;
//!
//!     for contract in &contracts {
//!         println!("{} valid={}", contract.info(), contract.is_valid());
//!     }
//!     Ok(())
//! }
//! ```

mod archive;
mod checked;
mod config;
mod error;
mod hash_index;
mod manifest;
mod resolver;
mod submission;
mod validate;
mod walk;

pub use archive::{open_archive, ArchiveExpander};
pub use checked::{aggregate_info, CheckedContract};
pub use config::ValidationConfig;
pub use error::{Result, ValidationError};
pub use hash_index::{keccak256, normalize_digest, CountableContent, HashIndex};
pub use manifest::{detect, BuildManifest, Detection, ManifestSettings, ManifestSource};
pub use metacheck_protocol::{MissingSource, PathContent};
pub use resolver::{resolve_sources, SourcePartition, INLINE_HASH_MISMATCH};
pub use submission::{RawEntry, SubmittedFiles};
pub use validate::{
    validate_from_buffers, validate_from_paths, CollectedPaths, Validation, Validator,
};
pub use walk::{collect_files, walk_tree, TreeVisitor};
