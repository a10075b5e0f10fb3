use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Result, ValidationError};

const SCRATCH_DIR_ENV: &str = "METACHECK_SCRATCH_DIR";
const MAX_ARCHIVE_DEPTH_ENV: &str = "METACHECK_MAX_ARCHIVE_DEPTH";

const DEFAULT_SCRATCH_PREFIX: &str = "metacheck-";
const DEFAULT_MAX_ARCHIVE_DEPTH: usize = 8;
const MAX_ARCHIVE_DEPTH_CEILING: usize = 64;

/// Configuration for one validation call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Directory under which archive scratch areas are created
    pub scratch_root: PathBuf,

    /// Name prefix of each scratch area; a random suffix is appended per call
    pub scratch_prefix: String,

    /// How many levels of zip-inside-zip are expanded before giving up
    pub max_archive_depth: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            scratch_root: std::env::temp_dir(),
            scratch_prefix: DEFAULT_SCRATCH_PREFIX.to_string(),
            max_archive_depth: DEFAULT_MAX_ARCHIVE_DEPTH,
        }
    }
}

impl ValidationConfig {
    /// Defaults overridden by `METACHECK_*` environment variables.
    ///
    /// Blank or unparsable values fall back to the default instead of failing.
    #[must_use]
    pub fn from_env() -> Self {
        let scratch = std::env::var(SCRATCH_DIR_ENV).ok();
        let depth = std::env::var(MAX_ARCHIVE_DEPTH_ENV).ok();
        Self::from_overrides(scratch.as_deref(), depth.as_deref())
    }

    fn from_overrides(scratch_root: Option<&str>, max_depth: Option<&str>) -> Self {
        let defaults = Self::default();
        let scratch_root = scratch_root
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or(defaults.scratch_root, PathBuf::from);
        Self {
            scratch_root,
            scratch_prefix: defaults.scratch_prefix,
            max_archive_depth: parse_archive_depth(max_depth, defaults.max_archive_depth),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)
            .map_err(|err| ValidationError::invalid_config(format!("TOML parse error: {err}")))?;
        config.max_archive_depth = config
            .max_archive_depth
            .clamp(1, MAX_ARCHIVE_DEPTH_CEILING);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scratch_prefix.trim().is_empty() {
            return Err(ValidationError::invalid_config(
                "scratch_prefix must not be empty",
            ));
        }
        if self.max_archive_depth == 0 {
            return Err(ValidationError::invalid_config(
                "max_archive_depth must be at least 1",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = root.into();
        self
    }

    #[must_use]
    pub fn with_max_archive_depth(mut self, depth: usize) -> Self {
        self.max_archive_depth = depth.clamp(1, MAX_ARCHIVE_DEPTH_CEILING);
        self
    }
}

fn parse_archive_depth(raw: Option<&str>, default_value: usize) -> usize {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default_value)
        .clamp(1, MAX_ARCHIVE_DEPTH_CEILING)
}
