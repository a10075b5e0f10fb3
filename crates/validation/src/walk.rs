use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, ValidationError};
use crate::submission::RawEntry;

/// Callbacks for a depth-first walk over a filesystem tree
pub trait TreeVisitor {
    /// Called for every regular file, in file-name order within a directory.
    fn visit_file(&mut self, path: &Path) -> Result<()>;

    /// Called once all children of `dir` have been visited. `depth` is 0 for the walk root.
    fn leave_dir(&mut self, _dir: &Path, _depth: usize) -> Result<()> {
        Ok(())
    }
}

/// Walks `root` depth-first, failing fast on the first missing path.
///
/// Symbolic links below the root are not followed.
pub fn walk_tree(root: &Path, visitor: &mut impl TreeVisitor) -> Result<()> {
    if !root.exists() {
        return Err(ValidationError::PathNotFound(root.to_path_buf()));
    }

    let walker = WalkDir::new(root)
        .contents_first(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(ValidationError::from_walk)?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            visitor.leave_dir(entry.path(), entry.depth())?;
        } else if file_type.is_file() {
            log::trace!("Visiting {}", entry.path().display());
            visitor.visit_file(entry.path())?;
        } else {
            log::debug!("Skipping non-regular entry {}", entry.path().display());
        }
    }
    Ok(())
}

/// Reads every regular file below `root` into a raw entry named by its full path.
pub fn collect_files(root: &Path) -> Result<Vec<RawEntry>> {
    let mut collector = FileCollector::default();
    walk_tree(root, &mut collector)?;
    Ok(collector.entries)
}

#[derive(Default)]
struct FileCollector {
    entries: Vec<RawEntry>,
}

impl TreeVisitor for FileCollector {
    fn visit_file(&mut self, path: &Path) -> Result<()> {
        let bytes = read_existing(path)?;
        self.entries
            .push(RawEntry::new(path.to_string_lossy().into_owned(), bytes));
        Ok(())
    }
}

/// Reads a file the walk has just seen; a vanished file is `PathNotFound`, not a plain IO error.
pub(crate) fn read_existing(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            ValidationError::PathNotFound(PathBuf::from(path))
        } else {
            ValidationError::IoError(err)
        }
    })
}
