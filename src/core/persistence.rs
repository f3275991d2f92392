use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::StorageConfig;
use crate::core::ast::ParsedUnit;
use crate::core::model::{CommitId, Project};
use crate::error::Result;

/// One parsed file version, keyed by the commit and path it was captured at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSnapshot {
    pub commit: CommitId,
    pub path: PathBuf,
    pub unit: ParsedUnit,
}

/// Per-repository accumulator of parsed file versions.
///
/// Filled during the baseline capture and the history walk, flushed once the
/// repository pass completes, then discarded.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: Vec<FileSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, commit: &CommitId, path: &Path, unit: ParsedUnit) {
        self.snapshots.push(FileSnapshot {
            commit: commit.clone(),
            path: path.to_path_buf(),
            unit,
        });
    }

    pub fn snapshots(&self) -> &[FileSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    name: String,
    revisions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct DatasetIndex {
    extracted_at: chrono::DateTime<chrono::Utc>,
    projects: Vec<IndexEntry>,
}

/// Writes finished Projects and file snapshots into the dataset directory
pub struct DatasetWriter {
    dataset_dir: PathBuf,
    persisted: Vec<IndexEntry>,
}

impl DatasetWriter {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            dataset_dir: config.dataset_dir.clone(),
            persisted: Vec::new(),
        }
    }

    /// Write one finished Project record
    pub fn persist_project(&mut self, project: &Project) -> Result<()> {
        let dir = self.dataset_dir.join("projects");
        fs::create_dir_all(&dir)?;

        let file = dir.join(format!("{}.json", sanitize(&project.repository.name)));
        fs::write(&file, serde_json::to_string_pretty(project)?)?;

        self.persisted.push(IndexEntry {
            name: project.repository.name.clone(),
            revisions: project.revisions.len(),
        });
        info!("Persisted project record: {}", file.display());
        Ok(())
    }

    /// Write the accumulated snapshots for one repository
    pub fn flush_snapshots(&self, repository: &str, store: &SnapshotStore) -> Result<()> {
        if store.is_empty() {
            return Ok(());
        }

        let dir = self.dataset_dir.join("snapshots").join(sanitize(repository));
        fs::create_dir_all(&dir)?;

        for snapshot in store.snapshots() {
            let file = dir.join(format!(
                "{}.json",
                snapshot_key(&snapshot.commit, &snapshot.path)
            ));
            fs::write(&file, serde_json::to_string_pretty(snapshot)?)?;
        }

        info!(
            "Persisted {} file snapshots for {}",
            store.len(),
            repository
        );
        Ok(())
    }

    /// Write the dataset index once every repository has been processed
    pub fn finalize(&self) -> Result<()> {
        fs::create_dir_all(&self.dataset_dir)?;

        let index = DatasetIndex {
            extracted_at: chrono::Utc::now(),
            projects: self.persisted.clone(),
        };
        let file = self.dataset_dir.join("index.json");
        fs::write(&file, serde_json::to_string_pretty(&index)?)?;

        info!("Dataset index written: {}", file.display());
        Ok(())
    }
}

/// Stable key derived from the commit and path a snapshot was captured at
fn snapshot_key(commit: &CommitId, path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(commit.as_str().as_bytes());
    hasher.update(b"/");
    hasher.update(path.to_string_lossy().as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    let prefix: String = commit.as_str().chars().take(8).collect();
    format!("{}-{}", prefix, &digest[..16])
}

/// Keep dataset file names portable
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::RepositoryDescriptor;
    use crate::core::model::{ChangeType, ChangedFile, Revision};

    fn sample_project() -> Project {
        let descriptor = RepositoryDescriptor {
            name: "acme/widget".to_string(),
            url: "https://example.com/acme/widget".to_string(),
            language: Some("java".to_string()),
        };
        let revision = Revision::new(
            CommitId::from("abc123"),
            vec![ChangedFile {
                path: PathBuf::from("src/Widget.java"),
                change_type: ChangeType::Modified,
                fingerprint: Some("deadbeef".to_string()),
            }],
        );
        Project::assemble(descriptor, vec![revision])
    }

    #[test]
    fn test_project_record_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = DatasetWriter::new(&StorageConfig {
            dataset_dir: dir.path().to_path_buf(),
        });

        let project = sample_project();
        writer.persist_project(&project).unwrap();

        let file = dir.path().join("projects").join("acme-widget.json");
        let content = fs::read_to_string(file).unwrap();
        let read_back: Project = serde_json::from_str(&content).unwrap();
        assert_eq!(read_back.repository.name, "acme/widget");
        assert_eq!(read_back.revisions.len(), 1);
    }

    #[test]
    fn test_snapshots_and_index_land_in_dataset_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = DatasetWriter::new(&StorageConfig {
            dataset_dir: dir.path().to_path_buf(),
        });

        let mut store = SnapshotStore::new();
        store.insert(
            &CommitId::from("abc123"),
            Path::new("src/Widget.java"),
            ParsedUnit::new(Path::new("src/Widget.java"), "java", "class Widget {}", vec![]),
        );

        writer.persist_project(&sample_project()).unwrap();
        writer.flush_snapshots("acme/widget", &store).unwrap();
        writer.finalize().unwrap();

        let snapshot_dir = dir.path().join("snapshots").join("acme-widget");
        assert_eq!(fs::read_dir(&snapshot_dir).unwrap().count(), 1);

        let index: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("index.json")).unwrap())
                .unwrap();
        assert_eq!(index["projects"][0]["name"], "acme/widget");
        assert_eq!(index["projects"][0]["revisions"], 1);
    }

    #[test]
    fn test_snapshot_keys_are_stable_and_distinct() {
        let commit = CommitId::from("abc123");
        let key = snapshot_key(&commit, Path::new("src/Widget.java"));

        assert_eq!(key, snapshot_key(&commit, Path::new("src/Widget.java")));
        assert_ne!(key, snapshot_key(&commit, Path::new("src/Other.java")));
        assert!(key.starts_with("abc123-"));
    }
}
