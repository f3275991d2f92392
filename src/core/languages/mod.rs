//! Language-specific file parsers
//!
//! Each language gets its own module with a consistent interface for parsing
//! source content into the structural method/invocation representation.

mod java;
mod python;
mod rust;

pub use java::JavaParser;
pub use python::PythonParser;
pub use rust::RustParser;

use std::path::Path;

use crate::core::ast::ParsedUnit;
use crate::error::Result;

/// Trait that all file parsers must implement
pub trait FileParser {
    /// Parse source content into its structural representation
    fn parse(&mut self, content: &str, file_path: &Path) -> Result<ParsedUnit>;

    /// Get the file extensions this parser handles
    fn file_extensions(&self) -> &[&str];

    /// Get the language name
    fn language_name(&self) -> &str;
}
