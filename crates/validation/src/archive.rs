use std::fs;
use std::io::Cursor;
use std::path::{Component, Path};

use zip::result::{ZipError, ZipResult};
use zip::ZipArchive;

use crate::config::ValidationConfig;
use crate::error::{Result, ValidationError};
use crate::submission::RawEntry;
use crate::walk::{read_existing, walk_tree, TreeVisitor};

/// Opens `bytes` as a zip archive. Any error means "not an archive".
pub fn open_archive(bytes: &[u8]) -> ZipResult<ZipArchive<Cursor<&[u8]>>> {
    ZipArchive::new(Cursor::new(bytes))
}

/// Flattens zip archives (including nested ones) into their member files
pub struct ArchiveExpander<'a> {
    config: &'a ValidationConfig,
}

impl<'a> ArchiveExpander<'a> {
    #[must_use]
    pub const fn new(config: &'a ValidationConfig) -> Self {
        Self { config }
    }

    /// Replaces every archive in `entries` by its member files, one nesting level per round.
    pub fn expand(&self, entries: Vec<RawEntry>) -> Result<Vec<RawEntry>> {
        let limit = self.config.max_archive_depth;
        let mut expanded = Vec::with_capacity(entries.len());
        let mut pending = entries;
        let mut depth = 0usize;

        while !pending.is_empty() {
            let mut extracted = Vec::new();
            for entry in pending {
                if open_archive(&entry.bytes).is_err() {
                    expanded.push(entry);
                    continue;
                }
                if depth >= limit {
                    return Err(ValidationError::ArchiveTooDeep {
                        path: entry.path,
                        limit,
                    });
                }
                extracted.extend(self.extract(&entry)?);
            }
            pending = extracted;
            depth += 1;
        }

        Ok(expanded)
    }

    fn extract(&self, entry: &RawEntry) -> Result<Vec<RawEntry>> {
        let archive_path = entry.path.as_str();
        let archive_error = |source: ZipError| ValidationError::Archive {
            path: archive_path.to_string(),
            source,
        };
        let mut archive = open_archive(&entry.bytes).map_err(archive_error)?;
        let scratch = tempfile::Builder::new()
            .prefix(&self.config.scratch_prefix)
            .tempdir_in(&self.config.scratch_root)?;

        archive.extract(scratch.path()).map_err(archive_error)?;

        let mut reader = ScratchReader {
            root: scratch.path(),
            archive_path,
            entries: Vec::new(),
        };
        walk_tree(scratch.path(), &mut reader)?;
        let entries = reader.entries;

        log::debug!(
            "Expanded archive {archive_path} into {} files",
            entries.len()
        );
        if let Err(err) = scratch.close() {
            log::warn!("Failed to remove scratch area for {archive_path}: {err}");
        }
        Ok(entries)
    }
}

/// Reads extracted files and drops each scratch sub-directory once it has been read.
struct ScratchReader<'a> {
    root: &'a Path,
    archive_path: &'a str,
    entries: Vec<RawEntry>,
}

impl TreeVisitor for ScratchReader<'_> {
    fn visit_file(&mut self, path: &Path) -> Result<()> {
        let bytes = read_existing(path)?;
        let name = format!("{}/{}", self.archive_path, member_name(self.root, path));
        self.entries.push(RawEntry::new(name, bytes));
        Ok(())
    }

    fn leave_dir(&mut self, dir: &Path, depth: usize) -> Result<()> {
        // The root belongs to the TempDir guard.
        if depth > 0 {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }
}

fn member_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
