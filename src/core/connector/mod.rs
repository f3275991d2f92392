//! Version-control read access
//!
//! The walker only ever sees this trait; different VCS backends are separate
//! implementations selected at configuration time.

mod git;

pub use git::GitConnector;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::core::model::{ChangeType, CommitId};
use crate::error::Result;

/// Read-only access to one repository's history
pub trait Connector {
    /// Identifier of the newest commit
    fn most_recent_commit_id(&self) -> Result<CommitId>;

    /// Every commit id, ordered newest to oldest
    fn all_commit_ids(&self) -> Result<Vec<CommitId>>;

    /// Paths of all files present in the snapshot at `commit`
    fn snapshot_files(&self, commit: &CommitId) -> Result<BTreeSet<PathBuf>>;

    /// Per-file change map for `commit`, diffed against its first parent
    fn commit_file_changes(&self, commit: &CommitId) -> Result<Vec<(PathBuf, ChangeType)>>;

    /// Content of `path` as of `commit`
    fn file_content(&self, commit: &CommitId, path: &Path) -> Result<String>;
}
