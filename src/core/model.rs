use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::metadata::RepositoryDescriptor;

/// Opaque commit identifier within one repository's history.
///
/// Ordering is supplied by the connector, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitId(pub String);

impl CommitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// How one file changed within one commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
}

/// One file's change record within a Revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// File path relative to the repository root
    pub path: PathBuf,

    /// How the file changed in this commit
    pub change_type: ChangeType,

    /// Content fingerprint at this commit, when the file could be fetched and parsed
    pub fingerprint: Option<String>,
}

/// The eligible changed files associated with one commit.
///
/// Only created when at least one changed file qualified; empty Revisions
/// never surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub commit: CommitId,
    pub files: Vec<ChangedFile>,
}

impl Revision {
    pub fn new(commit: CommitId, files: Vec<ChangedFile>) -> Self {
        Self { commit, files }
    }
}

/// Complete evolution model for one repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub repository: RepositoryDescriptor,
    pub revisions: Vec<Revision>,
}

impl Project {
    /// Pure assembly step; emitted exactly once per repository regardless of
    /// how many per-commit failures occurred during the walk.
    pub fn assemble(repository: RepositoryDescriptor, revisions: Vec<Revision>) -> Self {
        Self {
            repository,
            revisions,
        }
    }
}
