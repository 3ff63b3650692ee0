use serde::Serialize;

use crate::application::batch::{BatchEntry, BatchOutcome, BatchReport};
use crate::application::Comparison;
use crate::domain::ast::{NodeKind, SourceSpan, SourceTree};
use crate::domain::equivalence::Unmatched;

#[derive(Debug, Serialize)]
pub struct ComparisonDto {
    pub expected: String,
    pub actual: String,
    pub equivalent: bool,
    pub unmatched_expected: Vec<UnmatchedDto>,
    pub unmatched_actual: Vec<UnmatchedDto>,
}

#[derive(Debug, Serialize)]
pub struct UnmatchedDto {
    /// Labels from the root down to the node.
    pub path: Vec<String>,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl UnmatchedDto {
    fn new(unmatched: &Unmatched<'_>, tree: &SourceTree) -> Self {
        let node = unmatched.node;
        UnmatchedDto {
            path: unmatched.path.segments().to_vec(),
            kind: node.kind(),
            value: node.value().map(str::to_string),
            span: node.span(),
            text: tree.text_of(node).map(str::to_string),
        }
    }
}

impl From<&Comparison> for ComparisonDto {
    fn from(comparison: &Comparison) -> Self {
        let result = comparison.result();
        ComparisonDto {
            expected: comparison.expected.name().to_string(),
            actual: comparison.actual.name().to_string(),
            equivalent: result.is_equivalent(),
            unmatched_expected: result
                .unmatched_expected
                .iter()
                .map(|u| UnmatchedDto::new(u, &comparison.expected))
                .collect(),
            unmatched_actual: result
                .unmatched_actual
                .iter()
                .map(|u| UnmatchedDto::new(u, &comparison.actual))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchReportDto {
    pub equivalent: usize,
    pub failed: usize,
    pub entries: Vec<BatchEntryDto>,
}

#[derive(Debug, Serialize)]
pub struct BatchEntryDto {
    pub path: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&BatchEntry> for BatchEntryDto {
    fn from(entry: &BatchEntry) -> Self {
        let (status, message) = match &entry.outcome {
            BatchOutcome::Equivalent => ("equivalent", None),
            BatchOutcome::Different(report) => ("different", Some(report.clone())),
            BatchOutcome::MissingActual => ("missing_actual", None),
            BatchOutcome::MissingExpected => ("missing_expected", None),
            BatchOutcome::Error(message) => ("error", Some(message.clone())),
        };
        BatchEntryDto {
            path: entry.path.display().to_string(),
            status,
            message,
        }
    }
}

impl From<&BatchReport> for BatchReportDto {
    fn from(report: &BatchReport) -> Self {
        BatchReportDto {
            equivalent: report.equivalent_count(),
            failed: report.failed_count(),
            entries: report.entries.iter().map(BatchEntryDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::source_file::SourceFile;
    use crate::infrastructure::SynSourceParser;

    #[test]
    fn test_comparison_dto_lists_extra_field() {
        let expected = SourceFile::from_string("expected.rs", "struct A {\n    x: u8,\n    y: u8,\n}\n");
        let actual = SourceFile::from_string("actual.rs", "struct A {\n    x: u8,\n}\n");
        let comparison = Comparison::parse(&SynSourceParser, &actual, &expected).unwrap();

        let dto = ComparisonDto::from(&comparison);
        assert!(!dto.equivalent);
        assert!(dto.unmatched_actual.is_empty());
        assert_eq!(dto.unmatched_expected.len(), 1);
        assert_eq!(dto.unmatched_expected[0].kind, NodeKind::Field);
        assert_eq!(dto.unmatched_expected[0].text.as_deref(), Some("y: u8"));

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["unmatched_expected"][0]["kind"], "Field");
        assert_eq!(
            json["unmatched_expected"][0]["path"],
            serde_json::json!(["File", "Struct A", "NamedFields", "Field y"])
        );
        assert_eq!(json["unmatched_expected"][0]["span"]["start_line"], 3);
    }
}
