use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Broad structural shape of an argument expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionKind {
    MethodCall,
    Literal,
    Identifier,
    Lambda,
    Other,
}

/// Opaque snapshot of one expression, captured in source order.
///
/// Arguments are not evaluated or type-resolved; the text is the raw source
/// slice of the expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub text: String,
}

/// One method invocation and its argument expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Full call target text, receiver included
    pub target: String,

    /// Bare method identifier
    pub name: String,

    /// Argument snapshots in source order
    pub arguments: Vec<Expression>,

    /// Line of the call site
    pub line: usize,
}

/// One method declaration with every invocation reachable in its body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodRecord {
    /// Method/function name
    pub name: String,

    /// Enclosing class/type name, if any
    pub declared_in: Option<String>,

    /// Declaration signature without the body
    pub signature: String,

    /// Line range in the source file
    pub line_range: (usize, usize),

    /// Flattened invocation sequence, nested calls before their enclosing call
    pub calls: Vec<MethodCall>,
}

/// Structural representation of one parsed source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedUnit {
    /// File path relative to the repository root
    pub path: PathBuf,

    /// Language the file was parsed as
    pub language: String,

    /// SHA-256 fingerprint of the file content
    pub content_hash: String,

    /// Method declarations found in the file
    pub methods: Vec<MethodRecord>,
}

impl ParsedUnit {
    pub fn new(path: &Path, language: &str, content: &str, methods: Vec<MethodRecord>) -> Self {
        Self {
            path: path.to_path_buf(),
            language: language.to_string(),
            content_hash: content_hash(content),
            methods,
        }
    }
}

/// SHA-256 hash of file content
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
