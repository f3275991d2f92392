use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::config::{Config, StorageConfig};
use super::{
    Connector, DatasetWriter, GitConnector, HistoryWalker, MetadataReader, ParserRegistry,
    Project, RepositoryDescriptor, SnapshotFilter, SnapshotStore,
};

/// Main orchestration engine: one pass per repository, with failures
/// isolated at repository, commit and file granularity.
pub struct Engine {
    config: Config,
    parsers: ParserRegistry,
    writer: DatasetWriter,
}

impl Engine {
    /// Create a new engine instance
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;

        debug!("Loaded configuration: {:?}", config);

        let parsers = ParserRegistry::new(&config.parsing)?;
        let writer = DatasetWriter::new(&config.storage);

        Ok(Self {
            config,
            parsers,
            writer,
        })
    }

    /// Process every repository in the metadata file.
    ///
    /// Each metadata entry must have a matching checkout under `repos_dir`.
    /// A repository that cannot be processed contributes nothing but never
    /// stops the run; a corrupt metadata stream does.
    pub async fn extract(
        &mut self,
        metadata: PathBuf,
        repos_dir: PathBuf,
        output: Option<PathBuf>,
    ) -> Result<()> {
        let dataset_dir = output.unwrap_or_else(|| self.config.storage.dataset_dir.clone());
        self.writer = DatasetWriter::new(&StorageConfig { dataset_dir });

        for descriptor in MetadataReader::open(&metadata)? {
            let descriptor = descriptor?;
            self.process_repository(&descriptor, &repos_dir).await;
        }

        self.writer.finalize()?;
        info!("Finished extracting repositories");
        Ok(())
    }

    /// One repository pass; repository-level failures are logged, never propagated
    async fn process_repository(&mut self, descriptor: &RepositoryDescriptor, repos_dir: &Path) {
        let repo_path = repos_dir.join(&descriptor.name);
        info!("Processing repository {}", descriptor.name);

        let connector = match GitConnector::connect(&repo_path) {
            Ok(connector) => connector,
            Err(e) => {
                error!("Cannot connect to {}, skipping repository: {}", descriptor.name, e);
                return;
            }
        };

        let filter = match SnapshotFilter::build(&connector, &self.parsers) {
            Ok(filter) => filter,
            Err(e) => {
                error!("Snapshot listing failed for {}: {}", descriptor.name, e);
                SnapshotFilter::empty()
            }
        };
        debug!(
            "{} parseable files in the current snapshot of {}",
            filter.len(),
            descriptor.name
        );

        let mut store = SnapshotStore::new();
        self.capture_baseline(&connector, &filter, &mut store);

        let revisions = {
            let mut walker = HistoryWalker::new(&connector, &mut self.parsers, &filter);
            match walker.walk(&mut store) {
                Ok(revisions) => revisions,
                Err(e) => {
                    error!(
                        "Commit listing failed for {}, skipping repository: {}",
                        descriptor.name, e
                    );
                    return;
                }
            }
        };
        println!("{} has {} revisions", descriptor.name, revisions.len());

        let project = Project::assemble(descriptor.clone(), revisions);
        if let Err(e) = self.writer.persist_project(&project) {
            error!("Failed to persist project {}: {}", descriptor.name, e);
            return;
        }
        if let Err(e) = self.writer.flush_snapshots(&descriptor.name, &store) {
            error!("Failed to persist snapshots for {}: {}", descriptor.name, e);
        }
    }

    /// Parse the current content of every eligible snapshot file.
    ///
    /// These baseline versions anchor the evolution table; a file that fails
    /// to fetch or parse is skipped alone.
    fn capture_baseline(
        &mut self,
        connector: &dyn Connector,
        filter: &SnapshotFilter,
        store: &mut SnapshotStore,
    ) {
        let head = match connector.most_recent_commit_id() {
            Ok(head) => head,
            Err(e) => {
                warn!("No head commit, skipping baseline snapshots: {}", e);
                return;
            }
        };

        for path in filter.paths() {
            let captured = connector
                .file_content(&head, path)
                .and_then(|content| self.parsers.parse_blob(path, &content));
            match captured {
                Ok(unit) => store.insert(&head, path, unit),
                Err(e) => warn!(
                    "Skipping baseline snapshot of {} at {}: {}",
                    path.display(),
                    head,
                    e
                ),
            }
        }
    }

    /// List the repositories described by a metadata file without processing them
    pub async fn list(&self, metadata: PathBuf) -> Result<()> {
        for descriptor in MetadataReader::open(&metadata)? {
            let descriptor = descriptor?;
            println!(
                "{}  {}  {}",
                descriptor.name,
                descriptor.url,
                descriptor.language.as_deref().unwrap_or("-")
            );
        }
        Ok(())
    }

    /// Connect to a single repository and report what a walk would see
    pub async fn probe(&self, repo: PathBuf) -> Result<()> {
        let connector = GitConnector::connect(&repo)?;
        let commits = connector.all_commit_ids()?;
        let filter = SnapshotFilter::build(&connector, &self.parsers)?;

        println!("{} has {} commits", repo.display(), commits.len());
        println!("{} parseable files in the current snapshot", filter.len());
        Ok(())
    }
}
