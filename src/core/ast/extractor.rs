use tree_sitter::Node;

use super::model::{Expression, ExpressionKind, MethodCall};

/// How invocations appear in one language's parse tree.
///
/// Each language parser supplies its own instance; the traversal itself is
/// language-independent.
pub struct CallSyntax {
    /// Node kinds that represent a method invocation
    pub invocation_kinds: &'static [&'static str],

    /// Field holding the call target (method name or full callee path)
    pub target_field: &'static str,

    /// Field holding the receiver, for grammars that split it from the name
    pub receiver_field: Option<&'static str>,

    /// Field holding the argument list
    pub arguments_field: &'static str,
}

/// Flatten every method invocation reachable under `node` into `calls`.
///
/// Children are visited before the parent's own record is appended, so a
/// call nested inside a receiver or argument is recorded before its
/// enclosing call. The parse tree is never mutated.
pub fn collect_calls(node: Node, source: &str, syntax: &CallSyntax, calls: &mut Vec<MethodCall>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls(child, source, syntax, calls);
    }

    if syntax.invocation_kinds.contains(&node.kind()) {
        if let Some(call) = materialize_call(node, source, syntax) {
            calls.push(call);
        }
    }
}

fn materialize_call(node: Node, source: &str, syntax: &CallSyntax) -> Option<MethodCall> {
    let target_node = node.child_by_field_name(syntax.target_field)?;
    let raw_target = node_text(target_node, source);
    let name = short_name(&raw_target);

    let target = match syntax
        .receiver_field
        .and_then(|field| node.child_by_field_name(field))
    {
        Some(receiver) => format!("{}.{}", node_text(receiver, source), raw_target),
        None => raw_target,
    };

    let arguments = node
        .child_by_field_name(syntax.arguments_field)
        .map(|args| collect_arguments(args, source))
        .unwrap_or_default();

    Some(MethodCall {
        target,
        name,
        arguments,
        line: node.start_position().row + 1,
    })
}

/// Capture each argument as an opaque structural snapshot, in source order
fn collect_arguments(args: Node, source: &str) -> Vec<Expression> {
    let mut cursor = args.walk();
    args.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .map(|child| Expression {
            kind: classify(child.kind()),
            text: node_text(child, source),
        })
        .collect()
}

/// Map a grammar node kind onto the coarse expression taxonomy
fn classify(kind: &str) -> ExpressionKind {
    match kind {
        "method_invocation" => ExpressionKind::MethodCall,
        k if k.contains("call") => ExpressionKind::MethodCall,
        k if k.contains("literal") => ExpressionKind::Literal,
        "string" | "integer" | "float" | "true" | "false" | "none" => ExpressionKind::Literal,
        "identifier" | "field_access" | "field_expression" | "scoped_identifier" | "attribute" => {
            ExpressionKind::Identifier
        }
        "lambda_expression" | "closure_expression" | "lambda" => ExpressionKind::Lambda,
        _ => ExpressionKind::Other,
    }
}

/// Bare method identifier from a possibly qualified call target
fn short_name(target: &str) -> String {
    target
        .rsplit(|c: char| c == '.' || c == ':')
        .next()
        .unwrap_or(target)
        .trim()
        .to_string()
}

fn node_text(node: Node, source: &str) -> String {
    source[node.byte_range()].to_string()
}
