use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "codevo")]
#[command(about = "Extracts file-evolution histories and method-call ASTs from source repositories")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the evolution dataset for every repository in a metadata file
    Extract {
        /// Repository metadata file (JSON)
        #[arg(short, long)]
        metadata: PathBuf,

        /// Directory containing the checked-out repositories
        #[arg(short, long)]
        repos_dir: PathBuf,

        /// Dataset output directory (overrides configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the repositories described by a metadata file
    List {
        /// Repository metadata file (JSON)
        #[arg(short, long)]
        metadata: PathBuf,
    },

    /// Inspect a single repository without writing any output
    Probe {
        /// Path to a checked-out repository
        #[arg(short, long)]
        repo: PathBuf,
    },
}

impl Cli {
    pub async fn execute(self, mut engine: Engine) -> Result<()> {
        match self.command {
            Commands::Extract {
                metadata,
                repos_dir,
                output,
            } => engine.extract(metadata, repos_dir, output).await,
            Commands::List { metadata } => engine.list(metadata).await,
            Commands::Probe { repo } => engine.probe(repo).await,
        }
    }
}
