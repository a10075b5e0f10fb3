use std::path::{Path, PathBuf};

use metacheck_protocol::{PathContent, SubmissionReport};

use crate::archive::ArchiveExpander;
use crate::checked::{aggregate_info, CheckedContract};
use crate::config::ValidationConfig;
use crate::error::{Result, ValidationError};
use crate::hash_index::HashIndex;
use crate::manifest::{detect, BuildManifest, Detection};
use crate::resolver::resolve_sources;
use crate::submission::{RawEntry, SubmittedFiles};
use crate::walk::collect_files;

/// Checked contracts of one submission plus the files none of them used
#[derive(Debug, Clone)]
pub struct Validation {
    pub contracts: Vec<CheckedContract>,
    pub unused: Vec<PathContent>,
}

impl Validation {
    #[must_use]
    pub fn report(&self, ignored: &[PathBuf]) -> SubmissionReport {
        let mut report =
            SubmissionReport::new(self.contracts.iter().map(CheckedContract::to_report).collect());
        report.unused = self.unused.iter().map(|file| file.path.clone()).collect();
        report.ignored = ignored
            .iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect();
        report
    }
}

/// Files gathered from caller-supplied paths
#[derive(Debug, Clone, Default)]
pub struct CollectedPaths {
    pub files: Vec<RawEntry>,
    pub ignored: Vec<PathBuf>,
}

/// Runs the expand -> detect -> index -> resolve pipeline over one submission
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::from_env())
    }
}

impl Validator {
    #[must_use]
    pub const fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Reads every file below each existing path; missing top-level paths are set aside.
    pub fn collect_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<CollectedPaths> {
        let mut collected = CollectedPaths::default();
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                log::warn!("Ignoring missing path {}", path.display());
                collected.ignored.push(path.to_path_buf());
                continue;
            }
            collected.files.extend(collect_files(path)?);
        }
        Ok(collected)
    }

    pub fn validate_from_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
        ignoring: Option<&mut Vec<PathBuf>>,
    ) -> Result<Vec<CheckedContract>> {
        let collected = self.collect_paths(paths)?;
        if let Some(ignoring) = ignoring {
            ignoring.extend(collected.ignored);
        }
        self.validate_from_buffers(collected.files, None)
    }

    pub fn validate_from_buffers(
        &self,
        files: impl Into<SubmittedFiles>,
        unused: Option<&mut Vec<PathContent>>,
    ) -> Result<Vec<CheckedContract>> {
        let validation = self.validate(files)?;
        if let Some(unused) = unused {
            unused.extend(validation.unused);
        }
        Ok(validation.contracts)
    }

    pub fn validate(&self, files: impl Into<SubmittedFiles>) -> Result<Validation> {
        self.config.validate()?;
        let entries = files.into().into_entries();
        let expanded = ArchiveExpander::new(&self.config).expand(entries)?;
        let decoded = expanded.into_iter().map(RawEntry::decode);

        let (manifests, others) = split_manifests(decoded)?;
        let mut index = HashIndex::build(others);

        let contracts: Vec<CheckedContract> = manifests
            .into_iter()
            .map(|(path, manifest)| {
                let partition = resolve_sources(&manifest, &mut index);
                CheckedContract::new(path, manifest, partition)
            })
            .collect();

        let unused = index.unused();
        log::info!(
            "Checked {} contracts against {} indexed files ({} unused)",
            contracts.len(),
            index.len(),
            unused.len()
        );
        if let Some(message) = aggregate_info(&contracts) {
            log::info!("{message}");
        }

        Ok(Validation { contracts, unused })
    }
}

/// Separates usable manifests from the remaining files.
///
/// Malformed manifests are dropped; they only become an error when nothing usable is left.
fn split_manifests(
    files: impl Iterator<Item = PathContent>,
) -> Result<(Vec<(String, BuildManifest)>, Vec<PathContent>)> {
    let mut manifests = Vec::new();
    let mut malformed: Vec<(String, String)> = Vec::new();
    let mut others = Vec::new();

    for file in files {
        match detect(&file.content) {
            Detection::Manifest(manifest) => {
                log::debug!("Detected manifest {}", file.path);
                manifests.push((file.path, *manifest));
            }
            Detection::Malformed(reason) => malformed.push((file.path, reason)),
            Detection::NotManifest => others.push(file),
        }
    }

    if manifests.is_empty() {
        if malformed.is_empty() {
            return Err(ValidationError::NoManifest);
        }
        return Err(ValidationError::MalformedCompilationTarget {
            paths: malformed.into_iter().map(|(path, _)| path).collect(),
        });
    }

    for (path, reason) in &malformed {
        log::warn!("Skipping malformed manifest {path}: {reason}");
    }

    Ok((manifests, others))
}

/// [`Validator::validate_from_paths`] with configuration taken from the environment.
pub fn validate_from_paths<P: AsRef<Path>>(
    paths: &[P],
    ignoring: Option<&mut Vec<PathBuf>>,
) -> Result<Vec<CheckedContract>> {
    Validator::default().validate_from_paths(paths, ignoring)
}

/// [`Validator::validate_from_buffers`] with configuration taken from the environment.
pub fn validate_from_buffers(
    files: impl Into<SubmittedFiles>,
    unused: Option<&mut Vec<PathContent>>,
) -> Result<Vec<CheckedContract>> {
    Validator::default().validate_from_buffers(files, unused)
}
