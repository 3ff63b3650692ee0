// Batch comparison of two directory trees.
//
// Files are paired by their path relative to each root. Every pair is
// parsed and compared on the rayon pool; files present on only one side
// are reported as missing.

use anyhow::Result;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::application::Comparison;
use crate::domain::source_file::SourceFile;
use crate::infrastructure::loader::collect_sources;
use crate::ports::SourceParser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Equivalent,
    /// The rendered failure report.
    Different(String),
    /// Only the expected directory has this file.
    MissingActual,
    /// Only the actual directory has this file.
    MissingExpected,
    /// One of the two files could not be parsed.
    Error(String),
}

#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Sorted by relative path.
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn equivalent_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == BatchOutcome::Equivalent)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.equivalent_count()
    }

    /// At least one pair was compared and none failed.
    pub fn is_success(&self) -> bool {
        !self.entries.is_empty() && self.failed_count() == 0
    }
}

enum Pair {
    Both(SourceFile, SourceFile),
    ActualOnly,
    ExpectedOnly,
}

/// Compare every source file under `actual_dir` with its counterpart under `expected_dir`.
pub fn compare_dirs(
    parser: &dyn SourceParser,
    actual_dir: &Path,
    expected_dir: &Path,
    extensions: &[String],
) -> Result<BatchReport> {
    let mut actual: BTreeMap<PathBuf, SourceFile> =
        collect_sources(actual_dir, extensions)?.into_iter().collect();
    let expected = collect_sources(expected_dir, extensions)?;
    debug!(
        "Collected {} actual and {} expected files",
        actual.len(),
        expected.len()
    );

    let mut pairs: BTreeMap<PathBuf, Pair> = BTreeMap::new();
    for (path, expected_file) in expected {
        let pair = match actual.remove(&path) {
            Some(actual_file) => Pair::Both(actual_file, expected_file),
            None => Pair::ExpectedOnly,
        };
        pairs.insert(path, pair);
    }
    for path in actual.into_keys() {
        pairs.insert(path, Pair::ActualOnly);
    }

    let entries: Vec<BatchEntry> = pairs
        .into_par_iter()
        .map(|(path, pair)| {
            let outcome = match pair {
                Pair::Both(actual, expected) => compare_pair(parser, &actual, &expected),
                Pair::ActualOnly => BatchOutcome::MissingExpected,
                Pair::ExpectedOnly => BatchOutcome::MissingActual,
            };
            BatchEntry { path, outcome }
        })
        .collect();

    let report = BatchReport { entries };
    if report.entries.is_empty() {
        warn!(
            "No source files found under {} or {}",
            actual_dir.display(),
            expected_dir.display()
        );
    }
    info!(
        "Batch comparison finished: {} equivalent, {} failed",
        report.equivalent_count(),
        report.failed_count()
    );
    Ok(report)
}

fn compare_pair(parser: &dyn SourceParser, actual: &SourceFile, expected: &SourceFile) -> BatchOutcome {
    match Comparison::parse(parser, actual, expected) {
        Ok(comparison) => match comparison.report() {
            None => BatchOutcome::Equivalent,
            Some(report) => BatchOutcome::Different(report),
        },
        Err(e) => BatchOutcome::Error(e.to_string()),
    }
}
