// Error types surfaced by source assertions.

use serde::Serialize;
use thiserror::Error;

/// Which assertion produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// Raw bytes differ from the expected bytes.
    ContentMismatch,
    /// A regex search over the decoded text found nothing.
    PatternNotFound,
    /// The source trees are not equivalent.
    StructuralMismatch,
}

/// A failed assertion, carrying the full human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct VerificationFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl VerificationFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// An artifact could not be turned into a source tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("failed to parse {file} at {line}:{column}: {message}")]
    Syntax {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{file} is not valid UTF-8 source text")]
    Encoding { file: String },
}

/// Everything a subject operation can return besides success.
#[derive(Debug, Error)]
pub enum AssertionError {
    /// The assertion was evaluated and did not hold.
    #[error(transparent)]
    Failed(#[from] VerificationFailure),

    /// An artifact was not valid source; no comparison was attempted.
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unknown character set: {0}")]
    UnknownCharset(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl AssertionError {
    /// The failure message, if this is an assertion failure.
    pub fn failure(&self) -> Option<&VerificationFailure> {
        match self {
            AssertionError::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}
