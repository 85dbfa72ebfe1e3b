//! Schema, structural, and compliance error types.

use std::fmt;

use thiserror::Error;

/// One problem found in a document, located by dotted field path
/// (e.g. `basicSettings.name`, `posts[2].content`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn summarize(f: &mut fmt::Formatter<'_>, violations: &[Violation]) -> fmt::Result {
    match violations {
        [] => f.write_str("no details"),
        [only] => write!(f, "{only}"),
        [first, rest @ ..] => write!(f, "{first} (and {} more)", rest.len()),
    }
}

/// A document does not have the shape its schema requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralError {
    pub violations: Vec<Violation>,
}

impl StructuralError {
    #[must_use]
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation::new(path, message)],
        }
    }

    /// Field paths of every violation, in report order.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.path.as_str()).collect()
    }
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("structural error at ")?;
        summarize(f, &self.violations)
    }
}

impl std::error::Error for StructuralError {}

/// A serialized document holds a value that cannot travel as plain JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceError {
    pub violations: Vec<Violation>,
}

impl ComplianceError {
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.path.as_str()).collect()
    }
}

impl fmt::Display for ComplianceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("non-compliant value at ")?;
        summarize(f, &self.violations)
    }
}

impl std::error::Error for ComplianceError {}

/// Errors from the schema registry and the codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Requested schema name was not found in the registry.
    #[error("schema not found: {0}")]
    NotFound(String),

    /// The document failed validation or could not be decoded.
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// Schema compilation error.
    #[error("schema generation error: {0}")]
    Generation(String),

    /// A value could not be serialized.
    #[error("encode failed: {0}")]
    Encode(String),
}
