// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The `discover` and `results` commands
//!
//! Both commands write JSON lines to any [`Write`] so they can be driven
//! from tests as well as from `main`.
//!
//! # Example
//!
//! ```
//! use phpunit_lens::commands::decode_results;
//!
//! let stream = "##teamcity[testStarted name='test_add' flowId='1']\n\
//!               ##teamcity[testFinished name='test_add' duration='2' flowId='1']\n";
//! let mut out = Vec::new();
//! let report = decode_results(stream.as_bytes(), 64, &mut out).expect("decode");
//!
//! assert_eq!(report.passed, 1);
//! assert_eq!(String::from_utf8(out).expect("utf8").lines().count(), 2);
//! ```

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use lens_discovery::{DefinitionSink, PathResolver, SyntaxProvider, TestParser};
use lens_naming::{TestDefinition, TestType};
use lens_teamcity::{ProblemMatcher, ResultSummary, TeamcityError, TestResult, TestRunSummary};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Directories never searched for tests
const SKIPPED_DIRS: &[&str] = &["vendor", "node_modules"];

// ============================================================================
// Error Types
// ============================================================================

/// Command errors
#[derive(Debug, Error)]
pub enum CommandError {
    /// Error reading input or writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error decoding the progress stream
    #[error("Stream error: {0}")]
    Teamcity(#[from] TeamcityError),

    /// Error walking a directory tree
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A path given on the command line does not exist
    #[error("Path not found: {}", path.display())]
    PathNotFound {
        /// The missing path
        path: PathBuf,
    },
}

// ============================================================================
// discover
// ============================================================================

/// Statistics from a discovery run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverStats {
    /// PHP files parsed
    pub files: usize,
    /// Files skipped because they could not be read or parsed
    pub failed_files: usize,
    /// Definitions written
    pub definitions: usize,
    /// Runnable tests found
    pub tests: usize,
}

/// Writes each definition as one JSON line, optionally filtered by tier
struct JsonLines<'w, W: Write> {
    out: &'w mut W,
    only: Option<TestType>,
    stats: &'w mut DiscoverStats,
    error: Option<CommandError>,
}

impl<W: Write> JsonLines<'_, W> {
    fn emit(&mut self, definition: TestDefinition) {
        if definition.is_method() {
            self.stats.tests += 1;
        }
        if self.error.is_some() || self.only.is_some_and(|t| t != definition.test_type) {
            return;
        }
        if let Err(e) = write_json_line(&mut *self.out, &definition) {
            self.error = Some(e);
            return;
        }
        self.stats.definitions += 1;
    }
}

impl<W: Write> DefinitionSink for JsonLines<'_, W> {
    fn namespace(&mut self, definition: TestDefinition) {
        self.emit(definition);
    }

    fn class(&mut self, definition: TestDefinition) {
        self.emit(definition);
    }

    fn method(&mut self, definition: TestDefinition) {
        self.emit(definition);
    }
}

fn write_json_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), CommandError> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Collect the `*.php` files named by `paths`, sorted and deduplicated
///
/// Directories are searched recursively, skipping `vendor`, `node_modules`
/// and hidden directories.
///
/// # Errors
///
/// Returns `CommandError::PathNotFound` for a missing path, or
/// `CommandError::Walk` if a directory cannot be read.
pub fn collect_php_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, CommandError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk_dir(path, &mut files)?;
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(CommandError::PathNotFound { path: path.clone() });
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), CommandError> {
    let walker = WalkDir::new(dir).into_iter().filter_entry(|entry| {
        let skip = is_skipped_dir(entry);
        if skip {
            debug!(dir = %entry.path().display(), "skipping directory");
        }
        !skip
    });

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "php")
        {
            files.push(entry.into_path());
        }
    }
    Ok(())
}

/// Hidden, `vendor` and `node_modules` directories below the search root
fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.iter().any(|skipped| name == *skipped)
}

/// Discover the tests in `paths` and write them to `out` as JSON lines
///
/// A file that cannot be read or parsed is logged and skipped; discovery
/// carries on with the next file.
///
/// # Errors
///
/// Returns an error if a path is missing or output cannot be written.
pub fn discover<R, S, W>(
    parser: &TestParser<R, S>,
    paths: &[PathBuf],
    only: Option<TestType>,
    out: &mut W,
) -> Result<DiscoverStats, CommandError>
where
    R: PathResolver,
    S: SyntaxProvider,
    W: Write,
{
    let files = collect_php_files(paths)?;
    let mut stats = DiscoverStats::default();

    for file in &files {
        let mut sink = JsonLines {
            out: &mut *out,
            only,
            stats: &mut stats,
            error: None,
        };
        let parsed = parser.parse_file(file, &mut sink);
        if let Some(e) = sink.error.take() {
            return Err(e);
        }

        match parsed {
            Ok(()) => stats.files += 1,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "skipping file");
                stats.failed_files += 1;
            }
        }
    }

    out.flush()?;
    info!(
        files = stats.files,
        failed = stats.failed_files,
        tests = stats.tests,
        "discovery complete"
    );
    Ok(stats)
}

// ============================================================================
// results
// ============================================================================

/// Tally of a decoded progress stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsReport {
    /// Records written
    pub records: usize,
    /// Tests announced by `testCount`
    pub total: u64,
    /// Tests passed
    pub passed: usize,
    /// Tests failed
    pub failed: usize,
    /// Tests skipped or incomplete
    pub ignored: usize,
    /// Sum of test durations in milliseconds
    pub duration_ms: u64,
    /// Counters from PHPUnit's own summary sentence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ResultSummary>,
}

impl ResultsReport {
    fn from_run(records: usize, run: TestRunSummary) -> Self {
        Self {
            records,
            total: run.total,
            passed: run.passed,
            failed: run.failed,
            ignored: run.ignored,
            duration_ms: run.duration_ms,
            summary: run.summary,
        }
    }

    /// Check whether any test failed
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Decode a TeamCity stream from `reader` and write each record to `out`
///
/// The stream is read in `chunk_size` pieces, so lines and multi-byte
/// characters may be split across reads.
///
/// # Errors
///
/// Returns an error if the stream cannot be read or output cannot be written.
pub fn decode_results<R, W>(
    reader: R,
    chunk_size: usize,
    out: &mut W,
) -> Result<ResultsReport, CommandError>
where
    R: Read,
    W: Write,
{
    let mut matcher = ProblemMatcher::new();
    let mut run = TestRunSummary::empty();
    let mut records = 0;
    let mut failure: Option<CommandError> = None;

    matcher.read_from(reader, chunk_size, |result: TestResult| {
        run.record(&result);
        if failure.is_some() {
            return;
        }
        match write_json_line(&mut *out, &result) {
            Ok(()) => records += 1,
            Err(e) => failure = Some(e),
        }
    })?;

    if let Some(e) = failure {
        return Err(e);
    }
    if matcher.pending() > 0 {
        debug!(open = matcher.pending(), "stream ended with unfinished tests");
    }

    out.flush()?;
    let report = ResultsReport::from_run(records, run);
    info!(
        passed = report.passed,
        failed = report.failed,
        ignored = report.ignored,
        "results decoded"
    );
    Ok(report)
}

/// Write the tally as a final JSON line
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn write_report<W: Write>(report: &ResultsReport, out: &mut W) -> Result<(), CommandError> {
    write_json_line(out, report)?;
    out.flush()?;
    Ok(())
}
