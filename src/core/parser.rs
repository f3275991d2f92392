use std::collections::HashMap;
use std::path::Path;

use crate::config::ParsingConfig;
use crate::core::ast::ParsedUnit;
use crate::error::{CodevoError, Result};

use super::languages::{FileParser, JavaParser, PythonParser, RustParser};

/// Multi-language parser registry that delegates to language-specific parsers
pub struct ParserRegistry {
    config: ParsingConfig,
    parsers: HashMap<String, Box<dyn FileParser>>,
}

impl ParserRegistry {
    pub fn new(config: &ParsingConfig) -> Result<Self> {
        let mut parsers: HashMap<String, Box<dyn FileParser>> = HashMap::new();

        // Initialize language parsers based on configuration
        for language in &config.languages {
            match language.as_str() {
                "java" => {
                    parsers.insert("java".to_string(), Box::new(JavaParser::new()?));
                }
                "rust" => {
                    parsers.insert("rust".to_string(), Box::new(RustParser::new()?));
                }
                "python" => {
                    parsers.insert("python".to_string(), Box::new(PythonParser::new()?));
                }
                _ => {
                    // For now, skip unsupported languages
                    continue;
                }
            }
        }

        Ok(Self {
            config: config.clone(),
            parsers,
        })
    }

    /// Whether any registered parser handles this path's extension.
    ///
    /// This is the parser-type test the snapshot filter applies.
    pub fn supports_path(&self, path: &Path) -> bool {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(extension) => self
                .parsers
                .values()
                .any(|parser| parser.file_extensions().contains(&extension)),
            None => false,
        }
    }

    /// Parse one file's content as fetched at a specific commit
    pub fn parse_blob(&mut self, path: &Path, content: &str) -> Result<ParsedUnit> {
        if content.len() > self.config.max_file_size {
            return Err(CodevoError::Parse(format!(
                "File {} exceeds maximum size limit",
                path.display()
            )));
        }

        let language = self.detect_language(path)?;
        let parser = self
            .parsers
            .get_mut(&language)
            .ok_or_else(|| CodevoError::Parse(format!("No parser registered for {}", language)))?;

        parser.parse(content, path)
    }

    /// Detect programming language from file path
    fn detect_language(&self, path: &Path) -> Result<String> {
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            for (lang, parser) in &self.parsers {
                if parser.file_extensions().contains(&extension) {
                    return Ok(lang.clone());
                }
            }
        }

        Err(CodevoError::Parse(format!(
            "Could not detect language for file: {}",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ParserRegistry {
        ParserRegistry::new(&ParsingConfig {
            languages: vec!["java".to_string(), "rust".to_string()],
            max_file_size: 1024,
        })
        .unwrap()
    }

    #[test]
    fn test_supports_only_registered_extensions() {
        let registry = registry();

        assert!(registry.supports_path(Path::new("src/Main.java")));
        assert!(registry.supports_path(Path::new("src/lib.rs")));
        assert!(!registry.supports_path(Path::new("script.py")));
        assert!(!registry.supports_path(Path::new("README.md")));
        assert!(!registry.supports_path(Path::new("Makefile")));
    }

    #[test]
    fn test_parse_blob_routes_by_extension() {
        let mut registry = registry();

        let unit = registry
            .parse_blob(Path::new("A.java"), "class A { void m() {} }")
            .unwrap();
        assert_eq!(unit.language, "java");

        let unit = registry.parse_blob(Path::new("a.rs"), "fn m() {}").unwrap();
        assert_eq!(unit.language, "rust");
    }

    #[test]
    fn test_oversized_content_is_rejected() {
        let mut registry = registry();
        let content = "x".repeat(2048);

        let result = registry.parse_blob(Path::new("A.java"), &content);
        assert!(matches!(result, Err(CodevoError::Parse(_))));
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        let mut registry = registry();

        let result = registry.parse_blob(Path::new("notes.txt"), "hello");
        assert!(result.is_err());
    }
}
