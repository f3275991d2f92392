use std::path::Path;

use tree_sitter::{Node, Parser};

use super::FileParser;
use crate::core::ast::{collect_calls, CallSyntax, MethodCall, MethodRecord, ParsedUnit};
use crate::error::{CodevoError, Result};

/// Invocation shape in the tree-sitter Java grammar
const CALL_SYNTAX: CallSyntax = CallSyntax {
    invocation_kinds: &["method_invocation"],
    target_field: "name",
    receiver_field: Some("object"),
    arguments_field: "arguments",
};

/// Java-specific parser using Tree-sitter
pub struct JavaParser {
    parser: Parser,
}

impl JavaParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let java_language = tree_sitter_java::language();
        parser
            .set_language(&java_language)
            .map_err(|e| CodevoError::Parse(format!("Failed to set Java language: {}", e)))?;

        Ok(Self { parser })
    }
}

impl FileParser for JavaParser {
    fn parse(&mut self, content: &str, file_path: &Path) -> Result<ParsedUnit> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| CodevoError::Parse("Failed to parse Java code".to_string()))?;

        let mut methods = Vec::new();
        self.extract_methods(tree.root_node(), content, None, &mut methods);

        Ok(ParsedUnit::new(
            file_path,
            self.language_name(),
            content,
            methods,
        ))
    }

    fn file_extensions(&self) -> &[&str] {
        &["java"]
    }

    fn language_name(&self) -> &str {
        "java"
    }
}

impl JavaParser {
    /// Walk the AST collecting method declarations and their invocations
    fn extract_methods(
        &self,
        node: Node,
        source: &str,
        enclosing: Option<&str>,
        methods: &mut Vec<MethodRecord>,
    ) {
        let mut cursor = node.walk();

        for child in node.children(&mut cursor) {
            match child.kind() {
                "class_declaration" | "interface_declaration" | "enum_declaration" => {
                    let type_name = child
                        .child_by_field_name("name")
                        .map(|n| node_text(n, source));
                    if let Some(body) = child.child_by_field_name("body") {
                        self.extract_methods(body, source, type_name.as_deref(), methods);
                    }
                }
                "method_declaration" | "constructor_declaration" => {
                    if let Some(record) = self.parse_method(child, source, enclosing) {
                        methods.push(record);
                    }
                }
                _ => {
                    // Recursively check child nodes
                    self.extract_methods(child, source, enclosing, methods);
                }
            }
        }
    }

    /// Parse a Java method or constructor declaration
    fn parse_method(
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
            signature: method_signature(node, source),
            line_range: (
                node.start_position().row + 1,
                node.end_position().row + 1,
            ),
            calls,
        })
    }
}

/// Extract the declaration signature (everything before the body)
fn method_signature(node: Node, source: &str) -> String {
    let full_text = node_text(node, source);
    if let Some(brace_pos) = full_text.find('{') {
        full_text[..brace_pos].trim().to_string()
    } else {
        full_text.trim_end_matches(';').trim().to_string()
    }
}

/// Extract text content of a node
fn node_text(node: Node, source: &str) -> String {
    source[node.byte_range()].to_string()
}
