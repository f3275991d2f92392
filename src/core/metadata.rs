use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CodevoError, Result};

/// Identifies one source repository to process.
///
/// Accepts GitHub-style metadata field names as aliases, so an exported
/// repository listing can be fed in unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    #[serde(alias = "full_name")]
    pub name: String,

    #[serde(alias = "html_url")]
    pub url: String,

    /// Declared source language, informational only
    #[serde(default)]
    pub language: Option<String>,
}

/// Lazy, finite, restartable iterator over a repository metadata file.
///
/// Entries are deserialized one at a time; a malformed entry surfaces as an
/// `Err` item, which callers treat as the end of the whole run.
pub struct MetadataReader {
    entries: std::vec::IntoIter<serde_json::Value>,
}

impl MetadataReader {
    /// Open the metadata file; reopening restarts the sequence
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| CodevoError::Metadata(format!("{}: {}", path.display(), e)))?;
        let entries: Vec<serde_json::Value> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| CodevoError::Metadata(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            entries: entries.into_iter(),
        })
    }
}

impl Iterator for MetadataReader {
    type Item = Result<RepositoryDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        Some(
            serde_json::from_value(entry)
                .map_err(|e| CodevoError::Metadata(format!("malformed repository entry: {}", e))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn metadata_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_canonical_and_github_style_entries() {
        let file = metadata_file(
            r#"[
                {"name": "acme/widget", "url": "https://example.com/widget", "language": "java"},
                {"full_name": "acme/gadget", "html_url": "https://example.com/gadget"}
            ]"#,
        );

        let descriptors: Vec<RepositoryDescriptor> = MetadataReader::open(file.path())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].name, "acme/widget");
        assert_eq!(descriptors[0].language.as_deref(), Some("java"));
        assert_eq!(descriptors[1].name, "acme/gadget");
        assert_eq!(descriptors[1].url, "https://example.com/gadget");
        assert_eq!(descriptors[1].language, None);
    }

    #[test]
    fn test_reopening_restarts_the_sequence() {
        let file = metadata_file(r#"[{"name": "a/b", "url": "u"}]"#);

        let first: Vec<_> = MetadataReader::open(file.path()).unwrap().collect();
        let second: Vec<_> = MetadataReader::open(file.path()).unwrap().collect();
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_malformed_entry_is_an_err_item() {
        let file = metadata_file(r#"[{"name": "a/b", "url": "u"}, {"name": 42}]"#);

        let items: Vec<_> = MetadataReader::open(file.path()).unwrap().collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(CodevoError::Metadata(_))));
    }

    #[test]
    fn test_unreadable_file_is_a_metadata_error() {
        let result = MetadataReader::open(Path::new("/nonexistent/repos.json"));
        assert!(matches!(result, Err(CodevoError::Metadata(_))));
    }
}
