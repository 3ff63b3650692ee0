use crate::domain::ast::SourceTree;
use crate::domain::equivalence::{self, MatchResult};
use crate::domain::error::ParseError;
use crate::domain::report;
use crate::domain::source_file::SourceFile;
use crate::ports::SourceParser;

pub mod batch;
pub mod dto;
pub mod subject;

pub use subject::{assert_that, verify_that, SourceFileSubject, StringSubject};

/// Both parsed trees of one structural comparison.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub expected: SourceTree,
    pub actual: SourceTree,
}

impl Comparison {
    /// Parse both artifacts. A parse failure stops before any comparison.
    pub fn parse(
        parser: &dyn SourceParser,
        actual: &SourceFile,
        expected: &SourceFile,
    ) -> Result<Self, ParseError> {
        let actual = parser.parse(actual)?;
        let expected = parser.parse(expected)?;
        Ok(Self { expected, actual })
    }

    pub fn result(&self) -> MatchResult<'_> {
        equivalence::compare(&self.expected, &self.actual)
    }

    /// The failure message, or `None` when the trees are equivalent.
    pub fn report(&self) -> Option<String> {
        let result = self.result();
        if result.is_equivalent() {
            None
        } else {
            Some(report::render(&result, &self.expected, &self.actual))
        }
    }
}
