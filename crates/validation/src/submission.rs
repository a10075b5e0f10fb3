use std::collections::{BTreeMap, HashMap};

use metacheck_protocol::PathContent;

/// A submitted file before decoding; may itself be a zip archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub path: String,
    pub bytes: Vec<u8>,
}

impl RawEntry {
    pub fn new(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }

    /// Decodes the bytes as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn decode(self) -> PathContent {
        let content = match String::from_utf8(self.bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        };
        PathContent::new(self.path, content)
    }
}

/// The two shapes a buffer submission can arrive in
#[derive(Debug, Clone)]
pub enum SubmittedFiles {
    Entries(Vec<RawEntry>),
    Named(BTreeMap<String, Vec<u8>>),
}

impl SubmittedFiles {
    #[must_use]
    pub fn into_entries(self) -> Vec<RawEntry> {
        match self {
            Self::Entries(entries) => entries,
            Self::Named(named) => named
                .into_iter()
                .map(|(path, bytes)| RawEntry::new(path, bytes))
                .collect(),
        }
    }
}

impl From<Vec<RawEntry>> for SubmittedFiles {
    fn from(entries: Vec<RawEntry>) -> Self {
        Self::Entries(entries)
    }
}

impl From<BTreeMap<String, Vec<u8>>> for SubmittedFiles {
    fn from(named: BTreeMap<String, Vec<u8>>) -> Self {
        Self::Named(named)
    }
}

impl From<HashMap<String, Vec<u8>>> for SubmittedFiles {
    fn from(named: HashMap<String, Vec<u8>>) -> Self {
        Self::Named(named.into_iter().collect())
    }
}
