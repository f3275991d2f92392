use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::connector::Connector;
use crate::core::model::{ChangeType, ChangedFile, CommitId, Revision};
use crate::core::parser::ParserRegistry;
use crate::core::persistence::SnapshotStore;
use crate::error::Result;

/// The set of parseable file paths present in the most recent snapshot.
///
/// Computed once per repository before the history walk; only member paths
/// are ever parsed or recorded as changed files.
pub struct SnapshotFilter {
    paths: BTreeSet<PathBuf>,
}

impl SnapshotFilter {
    /// Compute the filter from the most recent commit's snapshot
    pub fn build(connector: &dyn Connector, parsers: &ParserRegistry) -> Result<Self> {
        let head = connector.most_recent_commit_id()?;
        let files = connector.snapshot_files(&head)?;
        let paths = files
            .into_iter()
            .filter(|path| parsers.supports_path(path))
            .collect();
        Ok(Self { paths })
    }

    pub fn empty() -> Self {
        Self {
            paths: BTreeSet::new(),
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The subset of `commit`'s raw change map that is eligible for parsing.
    ///
    /// An empty result is not an error. A connector failure propagates to
    /// the walker, which isolates it at per-commit granularity.
    pub fn resolve(
        &self,
        connector: &dyn Connector,
        commit: &CommitId,
    ) -> Result<Vec<(PathBuf, ChangeType)>> {
        let changes = connector.commit_file_changes(commit)?;
        Ok(changes
            .into_iter()
            .filter(|(path, _)| self.contains(path))
            .collect())
    }
}

/// Transforms a repository's newest-to-oldest commit sequence into Revisions
pub struct HistoryWalker<'a> {
    connector: &'a dyn Connector,
    parsers: &'a mut ParserRegistry,
    filter: &'a SnapshotFilter,
}

impl<'a> HistoryWalker<'a> {
    pub fn new(
        connector: &'a dyn Connector,
        parsers: &'a mut ParserRegistry,
        filter: &'a SnapshotFilter,
    ) -> Self {
        Self {
            connector,
            parsers,
            filter,
        }
    }

    /// Walk adjacent commit pairs, newest first.
    ///
    /// The oldest commit has no predecessor to diff against and never becomes
    /// a Revision. A commit whose change lookup fails is skipped whole; a
    /// file that cannot be fetched or parsed is skipped alone, and the
    /// Revision is still built from the remaining files.
    pub fn walk(&mut self, store: &mut SnapshotStore) -> Result<Vec<Revision>> {
        let commits = self.connector.all_commit_ids()?;
        info!("Walking {} commits", commits.len());

        let mut revisions = Vec::new();
        for pair in commits.windows(2) {
            let current = &pair[0];

            let changes = match self.filter.resolve(self.connector, current) {
                Ok(changes) => changes,
                Err(e) => {
                    warn!("Skipping commit {}: {}", current, e);
                    continue;
                }
            };

            let mut files = Vec::new();
            for (path, change_type) in changes {
                let fingerprint = match self.capture_file(current, &path, store) {
                    Ok(hash) => Some(hash),
                    Err(e) => {
                        warn!("Skipping content of {} at {}: {}", path.display(), current, e);
                        None
                    }
                };
                files.push(ChangedFile {
                    path,
                    change_type,
                    fingerprint,
                });
            }

            if files.is_empty() {
                debug!("No eligible changes in {}", current);
            } else {
                revisions.push(Revision::new(current.clone(), files));
            }
        }

        Ok(revisions)
    }

    /// Fetch and parse one changed file, record its snapshot, return its fingerprint
    fn capture_file(
        &mut self,
        commit: &CommitId,
        path: &Path,
        store: &mut SnapshotStore,
    ) -> Result<String> {
        let content = self.connector.file_content(commit, path)?;
        let unit = self.parsers.parse_blob(path, &content)?;
        let fingerprint = unit.content_hash.clone();
        store.insert(commit, path, unit);
        Ok(fingerprint)
    }
}
