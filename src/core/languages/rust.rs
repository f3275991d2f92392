use std::path::Path;

use tree_sitter::{Node, Parser};

use super::FileParser;
use crate::core::ast::{collect_calls, CallSyntax, MethodCall, MethodRecord, ParsedUnit};
use crate::error::{CodevoError, Result};

/// Invocation shape in the tree-sitter Rust grammar.
///
/// Method calls are call_expressions whose function is a field_expression,
/// so the receiver is already part of the target text.
const CALL_SYNTAX: CallSyntax = CallSyntax {
    invocation_kinds: &["call_expression"],
    target_field: "function",
    receiver_field: None,
    arguments_field: "arguments",
};

/// Rust-specific parser using Tree-sitter
pub struct RustParser {
    parser: Parser,
}

impl RustParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let rust_language = tree_sitter_rust::language();
        parser
            .set_language(&rust_language)
            .map_err(|e| CodevoError::Parse(format!("Failed to set Rust language: {}", e)))?;

        Ok(Self { parser })
    }
}

impl FileParser for RustParser {
    fn parse(&mut self, content: &str, file_path: &Path) -> Result<ParsedUnit> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| CodevoError::Parse("Failed to parse Rust code".to_string()))?;

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
        &["rs"]
    }

    fn language_name(&self) -> &str {
        "rust"
    }
}

impl RustParser {
    /// Walk the AST collecting function items and their invocations
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
                "function_item" => {
                    if let Some(record) = self.parse_function(child, source, enclosing) {
                        methods.push(record);
                    }
                }
                "impl_item" => {
                    let type_name = child
                        .child_by_field_name("type")
                        .map(|n| node_text(n, source));

                    // Methods live in the impl block's declaration list
                    let mut inner_cursor = child.walk();
                    for inner_child in child.children(&mut inner_cursor) {
                        if inner_child.kind() == "declaration_list" {
                            self.extract_functions(
                                inner_child,
                                source,
                                type_name.as_deref(),
                                methods,
                            );
                        }
                    }
                }
                _ => {
                    // Recursively check child nodes (mod items, trait bodies)
                    self.extract_functions(child, source, enclosing, methods);
                }
            }
        }
    }

    /// Parse a Rust function definition
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

/// Extract the function signature (everything up to the opening brace)
fn function_signature(node: Node, source: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impl_methods_carry_their_type() {
        let source = r#"
struct Counter {
    count: usize,
}

impl Counter {
    fn bump(&mut self) {
        self.count = checked(self.count);
    }
}
"#;

        let mut parser = RustParser::new().unwrap();
        let unit = parser.parse(source, Path::new("counter.rs")).unwrap();

        assert_eq!(unit.methods.len(), 1);
        assert_eq!(unit.methods[0].name, "bump");
        assert_eq!(unit.methods[0].declared_in, Some("Counter".to_string()));
        assert_eq!(unit.methods[0].calls.len(), 1);
        assert_eq!(unit.methods[0].calls[0].name, "checked");
    }

    #[test]
    fn test_method_call_target_keeps_receiver() {
        let source = r#"
fn run(items: &[u32]) -> usize {
    items.iter().count()
}
"#;

        let mut parser = RustParser::new().unwrap();
        let unit = parser.parse(source, Path::new("run.rs")).unwrap();

        let calls = &unit.methods[0].calls;
        let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["iter", "count"]);
        assert_eq!(calls[1].target, "items.iter().count");
    }

    #[test]
    fn test_free_function_signature() {
        let source = "pub fn add(a: i32, b: i32) -> i32 { a + b }";

        let mut parser = RustParser::new().unwrap();
        let unit = parser.parse(source, Path::new("add.rs")).unwrap();

        assert_eq!(unit.methods[0].signature, "pub fn add(a: i32, b: i32) -> i32");
        assert!(unit.methods[0].calls.is_empty());
    }
}
