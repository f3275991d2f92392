use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CodevoError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source code parsing configuration
    pub parsing: ParsingConfig,

    /// Dataset output settings
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Languages to support
    pub languages: Vec<String>,

    /// Maximum file size to parse (in bytes)
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory receiving project records, file snapshots and the dataset index
    pub dataset_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parsing: ParsingConfig {
                languages: vec![
                    "java".to_string(),
                    "rust".to_string(),
                    "python".to_string(),
                ],
                max_file_size: 1024 * 1024, // 1MB
            },
            storage: StorageConfig {
                dataset_dir: PathBuf::from("dataset"),
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| CodevoError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CodevoError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                // Try common config file locations
                let candidates = [
                    "Codevo.toml",
                    "codevo.toml",
                    ".codevo.toml",
                ];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}
