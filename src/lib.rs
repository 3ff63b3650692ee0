// Main library entry point for srcequiv.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{assert_that, verify_that, Comparison, SourceFileSubject, StringSubject};
pub use domain::error::{AssertionError, FailureKind, ParseError, VerificationFailure};
pub use domain::source_file::SourceFile;
