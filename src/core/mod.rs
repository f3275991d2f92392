mod engine;
mod history;
mod metadata;
mod model;
mod parser;
mod persistence;

// Version-control connectors
mod connector;

// AST records and the call-extraction engine
mod ast;

// Language-specific parsers
mod languages;

pub use ast::{Expression, ExpressionKind, MethodCall, MethodRecord, ParsedUnit};
pub use connector::{Connector, GitConnector};
pub use history::{HistoryWalker, SnapshotFilter};
pub use languages::{FileParser, JavaParser, PythonParser, RustParser};
pub use metadata::{MetadataReader, RepositoryDescriptor};
pub use model::{ChangeType, ChangedFile, CommitId, Project, Revision};
pub use parser::ParserRegistry;
pub use persistence::{DatasetWriter, FileSnapshot, SnapshotStore};

// Export the main engine
pub use engine::Engine;
