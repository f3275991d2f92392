use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use git2::{Delta, DiffOptions, ObjectType, Oid, Repository, TreeWalkMode, TreeWalkResult};

use super::Connector;
use crate::core::model::{ChangeType, CommitId};
use crate::error::{CodevoError, Result};

/// Connector for local git repositories, backed by libgit2
pub struct GitConnector {
    repo: Repository,
}

impl GitConnector {
    /// Open the repository at `path`
    pub fn connect(path: &Path) -> Result<Self> {
        let repo = Repository::open(path)
            .map_err(|e| CodevoError::Connection(format!("{}: {}", path.display(), e)))?;
        Ok(Self { repo })
    }

    fn find_commit(&self, commit: &CommitId) -> Result<git2::Commit<'_>> {
        let oid = Oid::from_str(commit.as_str()).map_err(|e| CodevoError::CommitLookup {
            commit: commit.to_string(),
            message: e.to_string(),
        })?;
        self.repo
            .find_commit(oid)
            .map_err(|e| CodevoError::CommitLookup {
                commit: commit.to_string(),
                message: e.to_string(),
            })
    }
}

impl Connector for GitConnector {
    fn most_recent_commit_id(&self) -> Result<CommitId> {
        let head = self.repo.head()?.peel_to_commit()?;
        Ok(CommitId(head.id().to_string()))
    }

    fn all_commit_ids(&self) -> Result<Vec<CommitId>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(git2::Sort::TIME)?;

        let mut ids = Vec::new();
        for oid in revwalk {
            ids.push(CommitId(oid?.to_string()));
        }
        Ok(ids)
    }

    fn snapshot_files(&self, commit: &CommitId) -> Result<BTreeSet<PathBuf>> {
        let tree = self.find_commit(commit)?.tree()?;

        let mut files = BTreeSet::new();
        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    files.insert(PathBuf::from(format!("{}{}", root, name)));
                }
            }
            TreeWalkResult::Ok
        })?;

        Ok(files)
    }

    fn commit_file_changes(&self, commit: &CommitId) -> Result<Vec<(PathBuf, ChangeType)>> {
        let current = self.find_commit(commit)?;
        let lookup_err = |e: git2::Error| CodevoError::CommitLookup {
            commit: commit.to_string(),
            message: e.to_string(),
        };

        let current_tree = current.tree().map_err(lookup_err)?;
        // The root commit diffs against the empty tree
        let parent_tree = match current.parent(0) {
            Ok(parent) => Some(parent.tree().map_err(lookup_err)?),
            Err(_) => None,
        };

        let mut diff_opts = DiffOptions::new();
        diff_opts.ignore_filemode(true);

        let mut diff = self
            .repo
            .diff_tree_to_tree(
                parent_tree.as_ref(),
                Some(&current_tree),
                Some(&mut diff_opts),
            )
            .map_err(lookup_err)?;
        diff.find_similar(None).map_err(lookup_err)?;

        let mut changes = Vec::new();
        diff.foreach(
            &mut |delta, _| {
                let change_type = match delta.status() {
                    Delta::Added => ChangeType::Added,
                    Delta::Modified => ChangeType::Modified,
                    Delta::Deleted => ChangeType::Deleted,
                    Delta::Renamed => ChangeType::Renamed,
                    Delta::Copied => ChangeType::Copied,
                    _ => return true,
                };
                let file = if delta.status() == Delta::Deleted {
                    delta.old_file()
                } else {
                    delta.new_file()
                };
                if let Some(path) = file.path() {
                    changes.push((path.to_path_buf(), change_type));
                }
                true
            },
            None,
            None,
            None,
        )
        .map_err(lookup_err)?;

        Ok(changes)
    }

    fn file_content(&self, commit: &CommitId, path: &Path) -> Result<String> {
        let tree = self.find_commit(commit)?.tree()?;
        let entry = tree.get_path(path).map_err(|e| {
            CodevoError::Parse(format!("'{}' not found at {}: {}", path.display(), commit, e))
        })?;
        let blob = self.repo.find_blob(entry.id())?;

        String::from_utf8(blob.content().to_vec()).map_err(|e| {
            CodevoError::Parse(format!("'{}' is not valid UTF-8: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn stage_write(repo: &Repository, name: &str, content: &str) {
        let workdir = repo.workdir().unwrap();
        fs::write(workdir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
    }

    fn stage_remove(repo: &Repository, name: &str) {
        let workdir = repo.workdir().unwrap();
        fs::remove_file(workdir.join(name)).unwrap();
        let mut index = repo.index().unwrap();
        index.remove_path(Path::new(name)).unwrap();
        index.write().unwrap();
    }

    fn commit(repo: &Repository, message: &str, when: i64) -> CommitId {
        let mut index = repo.index().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig =
            git2::Signature::new("tester", "tester@example.com", &git2::Time::new(when, 0))
                .unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
        CommitId(oid.to_string())
    }

    /// Three commits: add a.java, then modify it and add b.java, then delete b.java
    fn fixture() -> (TempDir, GitConnector, Vec<CommitId>) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        stage_write(&repo, "a.java", "class A {}");
        let c1 = commit(&repo, "add a", 1_000_000);

        stage_write(&repo, "a.java", "class A { void m() { helper(); } }");
        stage_write(&repo, "b.java", "class B {}");
        let c2 = commit(&repo, "grow", 1_000_100);

        stage_remove(&repo, "b.java");
        let c3 = commit(&repo, "shrink", 1_000_200);

        let connector = GitConnector::connect(dir.path()).unwrap();
        (dir, connector, vec![c3, c2, c1])
    }

    #[test]
    fn test_commit_ids_are_newest_first() {
        let (_dir, connector, commits) = fixture();

        assert_eq!(connector.all_commit_ids().unwrap(), commits);
        assert_eq!(connector.most_recent_commit_id().unwrap(), commits[0]);
    }

    #[test]
    fn test_snapshot_lists_blobs_at_commit() {
        let (_dir, connector, commits) = fixture();

        let head_files = connector.snapshot_files(&commits[0]).unwrap();
        assert_eq!(head_files, BTreeSet::from([PathBuf::from("a.java")]));

        let mid_files = connector.snapshot_files(&commits[1]).unwrap();
        assert!(mid_files.contains(Path::new("b.java")));
    }

    #[test]
    fn test_change_map_against_first_parent() {
        let (_dir, connector, commits) = fixture();

        let mut changes = connector.commit_file_changes(&commits[1]).unwrap();
        changes.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            changes,
            vec![
                (PathBuf::from("a.java"), ChangeType::Modified),
                (PathBuf::from("b.java"), ChangeType::Added),
            ]
        );

        let changes = connector.commit_file_changes(&commits[0]).unwrap();
        assert_eq!(changes, vec![(PathBuf::from("b.java"), ChangeType::Deleted)]);
    }

    #[test]
    fn test_file_content_at_commit() {
        let (_dir, connector, commits) = fixture();

        let content = connector
            .file_content(&commits[1], Path::new("a.java"))
            .unwrap();
        assert!(content.contains("helper()"));

        // b.java no longer exists at head
        let missing = connector.file_content(&commits[0], Path::new("b.java"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_unknown_commit_is_a_lookup_failure() {
        let (_dir, connector, _commits) = fixture();

        let bogus = CommitId::from("0000000000000000000000000000000000000000");
        let result = connector.commit_file_changes(&bogus);
        assert!(matches!(result, Err(CodevoError::CommitLookup { .. })));
    }

    #[test]
    fn test_connect_fails_on_missing_repository() {
        let dir = tempfile::tempdir().unwrap();
        let result = GitConnector::connect(&dir.path().join("nope"));
        assert!(matches!(result, Err(CodevoError::Connection(_))));
    }
}
