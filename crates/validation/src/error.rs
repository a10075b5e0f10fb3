use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Paths listed by name in a malformed-target error before switching to a count.
const MAX_NAMED_PATHS: usize = 5;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("No metadata manifest found in submission")]
    NoManifest,

    #[error("{}", describe_malformed(.paths))]
    MalformedCompilationTarget { paths: Vec<String> },

    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Failed to extract archive {path}: {source}")]
    Archive {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive {path} is nested deeper than {limit} levels")]
    ArchiveTooDeep { path: String, limit: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ValidationError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Maps a traversal error to `PathNotFound` when the entry vanished mid-walk.
    pub(crate) fn from_walk(err: walkdir::Error) -> Self {
        let vanished = err
            .io_error()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound);
        if vanished {
            if let Some(path) = err.path() {
                return Self::PathNotFound(path.to_path_buf());
            }
        }
        Self::WalkError(err)
    }
}

fn describe_malformed(paths: &[String]) -> String {
    if paths.len() > MAX_NAMED_PATHS {
        format!(
            "{} metadata manifests must declare exactly one compilation target",
            paths.len()
        )
    } else {
        format!(
            "Metadata manifest must declare exactly one compilation target: {}",
            paths.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_error_names_few_paths() {
        let err = ValidationError::MalformedCompilationTarget {
            paths: vec!["a/metadata.json".to_string(), "b/metadata.json".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("a/metadata.json, b/metadata.json"), "{msg}");
    }

    #[test]
    fn malformed_error_counts_many_paths() {
        let paths = (0..7).map(|i| format!("m{i}.json")).collect();
        let msg = ValidationError::MalformedCompilationTarget { paths }.to_string();
        assert!(msg.starts_with("7 metadata manifests"), "{msg}");
        assert!(!msg.contains("m0.json"));
    }
}
