use crate::domain::ast::SourceTree;
use crate::domain::error::{ParseError, VerificationFailure};
use crate::domain::source_file::SourceFile;

/// Turns a source artifact into a source tree.
pub trait SourceParser: Send + Sync {
    fn parse(&self, file: &SourceFile) -> Result<SourceTree, ParseError>;
}

/// Decides what a failed assertion does.
///
/// A hard strategy aborts the test and never returns; a verifying one hands
/// the failure back as `Err` so callers can inspect the message.
pub trait FailureStrategy: Send + Sync {
    fn fail(&self, failure: VerificationFailure) -> Result<(), VerificationFailure>;
}
