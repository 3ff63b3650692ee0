// Assertion Facade
//
// `assert_that(&file)` fails hard; `verify_that(&file)` returns the failure
// as `Err(AssertionError::Failed(..))` so its message can be inspected.
// Any other combination of parser and failure strategy goes through
// [`SourceFileSubject::new`].

use encoding_rs::Encoding;
use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

use crate::application::Comparison;
use crate::domain::error::{AssertionError, FailureKind, ParseError, VerificationFailure};
use crate::domain::source_file::SourceFile;
use crate::infrastructure::{HardFailure, SynSourceParser, VerifyingFailure};
use crate::ports::{FailureStrategy, SourceParser};

/// Subject with the hard failure strategy.
pub fn assert_that(file: &SourceFile) -> SourceFileSubject<'_> {
    SourceFileSubject::new(file, &SynSourceParser, &HardFailure)
}

/// Subject with the verifying failure strategy.
pub fn verify_that(file: &SourceFile) -> SourceFileSubject<'_> {
    SourceFileSubject::new(file, &SynSourceParser, &VerifyingFailure)
}

fn fail(
    strategy: &dyn FailureStrategy,
    kind: FailureKind,
    message: String,
) -> Result<(), AssertionError> {
    strategy
        .fail(VerificationFailure::new(kind, message))
        .map_err(AssertionError::from)
}

/// Assertions about one source file.
pub struct SourceFileSubject<'a> {
    actual: &'a SourceFile,
    parser: &'a dyn SourceParser,
    strategy: &'a dyn FailureStrategy,
}

impl<'a> SourceFileSubject<'a> {
    pub fn new(
        actual: &'a SourceFile,
        parser: &'a dyn SourceParser,
        strategy: &'a dyn FailureStrategy,
    ) -> Self {
        Self {
            actual,
            parser,
            strategy,
        }
    }

    /// The raw bytes equal `expected` exactly.
    pub fn has_contents(&self, expected: &[u8]) -> Result<(), AssertionError> {
        let actual = self.actual.bytes();
        if actual == expected {
            return Ok(());
        }
        let first_difference = actual
            .iter()
            .zip(expected)
            .position(|(a, e)| a != e)
            .unwrap_or_else(|| actual.len().min(expected.len()));
        fail(
            self.strategy,
            FailureKind::ContentMismatch,
            format!(
                "Expected that the contents of \"{}\" equal the expected bytes, but they differ at byte {} (actual: {} bytes, expected: {} bytes).",
                self.actual.name(),
                first_difference,
                actual.len(),
                expected.len()
            ),
        )
    }

    /// The contents decoded with `charset`.
    pub fn contents_as_string(&self, charset: &'static Encoding) -> StringSubject<'a> {
        StringSubject {
            name: self.actual.name(),
            text: self.actual.decode(charset),
            strategy: self.strategy,
        }
    }

    /// Like [`Self::contents_as_string`], resolving a WHATWG charset label.
    pub fn contents_as_string_labeled(&self, label: &str) -> Result<StringSubject<'a>, AssertionError> {
        let charset = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| AssertionError::UnknownCharset(label.to_string()))?;
        Ok(self.contents_as_string(charset))
    }

    /// Parse both files and compare them without asserting.
    pub fn compare_with(&self, expected: &SourceFile) -> Result<Comparison, ParseError> {
        Comparison::parse(self.parser, self.actual, expected)
    }

    /// The file is structurally equivalent to `expected`.
    pub fn has_source_equivalent_to(&self, expected: &SourceFile) -> Result<(), AssertionError> {
        let comparison = self.compare_with(expected)?;
        debug!(
            actual = self.actual.name(),
            expected = expected.name(),
            "checking source equivalence"
        );
        match comparison.report() {
            None => Ok(()),
            Some(message) => fail(self.strategy, FailureKind::StructuralMismatch, message),
        }
    }
}

/// Assertions about the decoded text of a source file.
pub struct StringSubject<'a> {
    name: &'a str,
    text: Cow<'a, str>,
    strategy: &'a dyn FailureStrategy,
}

impl StringSubject<'_> {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Some part of the text matches the regular expression `pattern`.
    pub fn contains_match(&self, pattern: &str) -> Result<(), AssertionError> {
        let regex = Regex::new(pattern)?;
        if regex.is_match(&self.text) {
            return Ok(());
        }
        fail(
            self.strategy,
            FailureKind::PatternNotFound,
            format!(
                "Expected the contents of \"{}\" to contain a match for /{}/, but none was found.\ncontents:\n{}",
                self.name, pattern, self.text
            ),
        )
    }

    /// The text contains `needle` literally.
    pub fn contains(&self, needle: &str) -> Result<(), AssertionError> {
        if self.text.contains(needle) {
            return Ok(());
        }
        fail(
            self.strategy,
            FailureKind::PatternNotFound,
            format!(
                "Expected the contents of \"{}\" to contain \"{}\", but it did not.\ncontents:\n{}",
                self.name, needle, self.text
            ),
        )
    }

    pub fn is_equal_to(&self, expected: &str) -> Result<(), AssertionError> {
        if self.text == expected {
            return Ok(());
        }
        fail(
            self.strategy,
            FailureKind::ContentMismatch,
            format!(
                "Expected the contents of \"{}\" to equal:\n{}\nbut was:\n{}",
                self.name, expected, self.text
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;

    fn file() -> SourceFile {
        SourceFile::for_source_lines("test/test_class.rs", &["pub struct TestClass {", "    field: Object,", "}"])
    }

    #[test]
    fn test_has_contents_reports_first_difference() {
        let file = file();
        let mut other = file.bytes().to_vec();
        other[4] = b'X';
        let err = verify_that(&file).has_contents(&other).unwrap_err();
        let failure = err.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::ContentMismatch);
        assert!(failure.message.contains("test/test_class.rs"));
        assert!(failure.message.contains("differ at byte 4"));
    }

    #[test]
    fn test_has_contents_prefix_difference() {
        let file = SourceFile::from_string("a.rs", "struct A;");
        let err = verify_that(&file).has_contents(b"struct A;\n").unwrap_err();
        assert!(err.to_string().contains("differ at byte 9"));
    }

    #[test]
    fn test_string_subject_operations() {
        let file = file();
        let text = verify_that(&file).contents_as_string(UTF_8);
        assert!(text.contains_match(r"field:\s+Object").is_ok());
        assert!(text.contains("TestClass").is_ok());
        assert!(text.is_equal_to("nope").is_err());
        assert!(matches!(
            text.contains_match("("),
            Err(AssertionError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_labeled_charset() {
        let file = file();
        assert!(verify_that(&file).contents_as_string_labeled("UTF-8").is_ok());
        assert!(matches!(
            verify_that(&file).contents_as_string_labeled("klingon"),
            Err(AssertionError::UnknownCharset(_))
        ));
    }
}
