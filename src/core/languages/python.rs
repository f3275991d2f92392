use std::path::Path;

use tree_sitter::{Node, Parser};

use super::FileParser;
use crate::core::ast::{collect_calls, CallSyntax, MethodCall, MethodRecord, ParsedUnit};
use crate::error::{CodevoError, Result};

/// Invocation shape in the tree-sitter Python grammar
const CALL_SYNTAX: CallSyntax = CallSyntax {
    invocation_kinds: &["call"],
    target_field: "function",
    receiver_field: None,
    arguments_field: "arguments",
};

/// Python-specific parser using Tree-sitter
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let python_language = tree_sitter_python::language();
        parser
            .set_language(&python_language)
            .map_err(|e| CodevoError::Parse(format!("Failed to set Python language: {}", e)))?;

        Ok(Self { parser })
    }
}

impl FileParser for PythonParser {
    fn parse(&mut self, content: &str, file_path: &Path) -> Result<ParsedUnit> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| CodevoError::Parse("Failed to parse Python code".to_string()))?;

        let mut methods = Vec::new();
        self.extract_functions(tree.root_node(), content, None, &mut methods);

        Ok(ParsedUnit::new(
            file_path,
            self.language_name(),
            content,
            methods,
        ))
    }

    fn file_extensions(&self) -> &[&str] {
        &["py"]
    }

    fn language_name(&self) -> &str {
        "python"
    }
}

impl PythonParser {
    /// Walk the AST collecting function definitions and their invocations
    fn extract_functions(
        &self,
        node: Node,
        source: &str,
        enclosing: Option<&str>,
        methods: &mut Vec<MethodRecord>,
    ) {
        let mut cursor = node.walk();

        for child in node.children(&mut cursor) {
            match child.kind() {
                "class_definition" => {
                    let class_name = child
                        .child_by_field_name("name")
                        .map(|n| node_text(n, source));
                    if let Some(body) = child.child_by_field_name("body") {
                        self.extract_functions(body, source, class_name.as_deref(), methods);
                    }
                }
                "function_definition" => {
                    if let Some(record) = self.parse_function(child, source, enclosing) {
                        methods.push(record);
                    }
                }
                _ => {
                    // Recursively check child nodes (decorated definitions)
                    self.extract_functions(child, source, enclosing, methods);
                }
            }
        }
    }

    /// Parse a Python function definition
    fn parse_function(
        &self,
        node: Node,
        source: &str,
        enclosing: Option<&str>,
    ) -> Option<MethodRecord> {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, source))?;

        let mut calls: Vec<MethodCall> = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            collect_calls(body, source, &CALL_SYNTAX, &mut calls);
        }

        Some(MethodRecord {
            name,
            declared_in: enclosing.map(|s| s.to_string()),
            signature: function_signature(node, source),
            line_range: (
                node.start_position().row + 1,
                node.end_position().row + 1,
            ),
            calls,
        })
    }
}

/// Extract the def header (everything before the body)
fn function_signature(node: Node, source: &str) -> String {
    let full_text = node_text(node, source);
    match full_text.find(':') {
        Some(colon_pos) => full_text[..colon_pos].trim().to_string(),
        None => full_text.trim().to_string(),
    }
}

/// Extract text content of a node
fn node_text(node: Node, source: &str) -> String {
    source[node.byte_range()].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_methods_carry_their_class() {
        let source = r#"
class Loader:
    def load(self, path):
        return self.decode(read(path))
"#;

        let mut parser = PythonParser::new().unwrap();
        let unit = parser.parse(source, Path::new("loader.py")).unwrap();

        assert_eq!(unit.methods.len(), 1);
        assert_eq!(unit.methods[0].name, "load");
        assert_eq!(unit.methods[0].declared_in, Some("Loader".to_string()));

        let names: Vec<&str> = unit.methods[0].calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["read", "decode"]);
    }

    #[test]
    fn test_def_header_signature() {
        let source = "def scale(value, factor=2):\n    return value * factor\n";

        let mut parser = PythonParser::new().unwrap();
        let unit = parser.parse(source, Path::new("scale.py")).unwrap();

        assert_eq!(unit.methods[0].signature, "def scale(value, factor=2)");
    }
}
