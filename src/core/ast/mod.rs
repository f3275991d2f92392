//! Structural records for parsed source files and the call-extraction engine
//!
//! A parsed file is reduced to its method declarations, each carrying the
//! flattened sequence of method invocations reachable in its body.

mod extractor;
mod model;

pub use extractor::{collect_calls, CallSyntax};
pub use model::{Expression, ExpressionKind, MethodCall, MethodRecord, ParsedUnit};
