//! Test result types

use serde::{Deserialize, Serialize};

use crate::error::TeamcityError;

/// What a decoded progress line represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestResultEvent {
    /// `PHPUnit 9.5.25 ...` banner
    TestVersion,
    /// `Processes: 4` (ParaTest)
    TestProcesses,
    /// `Runtime: PHP 8.1.12`
    TestRuntime,
    /// `Configuration: /path/phpunit.xml`
    TestConfiguration,
    /// `##teamcity[testSuiteStarted ...]`
    TestSuiteStarted,
    /// `##teamcity[testCount ...]`
    TestCount,
    /// `##teamcity[testStarted ...]`
    TestStarted,
    /// A finished test that accumulated at least one failure
    TestFailed,
    /// A finished test that was skipped or marked incomplete
    TestIgnored,
    /// A finished test without failures
    TestFinished,
    /// `##teamcity[testSuiteFinished ...]`
    TestSuiteFinished,
    /// `Time: 00:00.049, Memory: 6.00 MB`
    TestDuration,
    /// `Tests: 19, Assertions: 15, ...` or `OK (3 tests, 3 assertions)`
    TestResultSummary,
}

impl TestResultEvent {
    /// Map a TeamCity event name to an event kind
    #[must_use]
    pub fn from_teamcity(name: &str) -> Option<Self> {
        match name {
            "testSuiteStarted" => Some(Self::TestSuiteStarted),
            "testSuiteFinished" => Some(Self::TestSuiteFinished),
            "testStarted" => Some(Self::TestStarted),
            "testFinished" => Some(Self::TestFinished),
            "testFailed" => Some(Self::TestFailed),
            "testIgnored" => Some(Self::TestIgnored),
            "testCount" => Some(Self::TestCount),
            _ => None,
        }
    }

    /// Check whether this event closes a single test
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::TestFinished | Self::TestFailed | Self::TestIgnored)
    }
}

/// A source location from a failure stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Absolute file path
    pub file: String,
    /// 1-based line number
    pub line: u32,
}

/// Counters from the closing summary sentence. Absent labels stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    /// Tests run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<u64>,
    /// Assertions made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertions: Option<u64>,
    /// Tests that errored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<u64>,
    /// Tests that failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failures: Option<u64>,
    /// Warnings raised
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<u64>,
    /// Skipped tests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<u64>,
    /// Incomplete tests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete: Option<u64>,
    /// Risky tests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risky: Option<u64>,
    /// Deprecations triggered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecations: Option<u64>,
    /// Notices triggered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notices: Option<u64>,
}

impl ResultSummary {
    /// Check whether no counter was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set the counter for a summary label (`Tests`, `Assertions`, ...).
    /// Returns `false` for an unknown label.
    pub fn set(&mut self, label: &str, value: u64) -> bool {
        let slot = match label {
            "Tests" => &mut self.tests,
            "Assertions" => &mut self.assertions,
            "Errors" => &mut self.errors,
            "Failures" => &mut self.failures,
            "Warnings" => &mut self.warnings,
            "Skipped" => &mut self.skipped,
            "Incomplete" => &mut self.incomplete,
            "Risky" => &mut self.risky,
            "Deprecations" => &mut self.deprecations,
            "Notices" => &mut self.notices,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// A decoded progress record
///
/// Fields are populated according to the event: plain banner lines carry
/// `text` plus their value, TeamCity lines carry the TeamCity attributes and
/// the ids derived from the `locationHint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Event kind
    pub event: TestResultEvent,
    /// TeamCity `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Runner lane
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<u32>,
    /// Stable id, including any dataset suffix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Id of the test without its dataset suffix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    /// Presentation label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Source file of the test
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Primary failure line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Raw `locationHint`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_hint: Option<String>,
    /// Failure or skip message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure stack, innermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Location>,
    /// Duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Failure type, e.g. `comparisonFailure`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub failure_type: Option<String>,
    /// Actual value of a comparison failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    /// Expected value of a comparison failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Number of tests announced by `testCount`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// PHPUnit version from the banner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phpunit: Option<String>,
    /// Runtime description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    /// Configuration file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    /// Parallel process count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processes: Option<u32>,
    /// Wall time from the duration line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Peak memory from the duration line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    /// Summary counters
    #[serde(flatten)]
    pub summary: ResultSummary,
    /// Raw text of a plain line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl TestResult {
    /// Create an empty record for an event
    #[must_use]
    pub fn new(event: TestResultEvent) -> Self {
        Self {
            event,
            name: None,
            flow_id: None,
            id: None,
            test_id: None,
            label: None,
            file: None,
            line: None,
            location_hint: None,
            message: None,
            details: Vec::new(),
            duration: None,
            failure_type: None,
            actual: None,
            expected: None,
            count: None,
            phpunit: None,
            runtime: None,
            configuration: None,
            processes: None,
            time: None,
            memory: None,
            summary: ResultSummary::default(),
            text: None,
        }
    }

    /// Create a record for a plain line, keeping its text
    #[must_use]
    pub fn plain(event: TestResultEvent, text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::new(event)
        }
    }

    /// Check if the test passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.event == TestResultEvent::TestFinished
    }

    /// Check if the test failed
    #[must_use]
    pub fn failed(&self) -> bool {
        self.event == TestResultEvent::TestFailed
    }

    /// Check if the test was skipped
    #[must_use]
    pub fn ignored(&self) -> bool {
        self.event == TestResultEvent::TestIgnored
    }

    /// Serialize as a single JSON line
    ///
    /// # Errors
    ///
    /// Returns `TeamcityError::Json` if serialization fails.
    pub fn to_json_line(&self) -> Result<String, TeamcityError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Human readable duration: `5ms`, `2.50s`
    #[must_use]
    pub fn duration_display(&self) -> String {
        match self.duration {
            Some(ms) if ms >= 1000 => format!("{:.2}s", ms as f64 / 1000.0),
            Some(ms) => format!("{ms}ms"),
            None => "-".to_string(),
        }
    }
}

/// Aggregated results from a progress stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRunSummary {
    /// Tests announced by `testCount`, summed across flows
    pub total: u64,
    /// Tests passed
    pub passed: usize,
    /// Tests failed
    pub failed: usize,
    /// Tests skipped
    pub ignored: usize,
    /// Sum of test durations in milliseconds
    pub duration_ms: u64,
    /// Counters from the summary sentence, if one was printed
    pub summary: Option<ResultSummary>,
    /// Terminal test results in stream order
    pub results: Vec<TestResult>,
}

impl TestRunSummary {
    /// Create an empty summary
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fold a decoded record into the tally
    pub fn record(&mut self, result: &TestResult) {
        match result.event {
            TestResultEvent::TestCount => self.total += result.count.unwrap_or(0),
            TestResultEvent::TestResultSummary => self.summary = Some(result.summary.clone()),
            event if event.is_terminal() => {
                match event {
                    TestResultEvent::TestFailed => self.failed += 1,
                    TestResultEvent::TestIgnored => self.ignored += 1,
                    _ => self.passed += 1,
                }
                self.duration_ms += result.duration.unwrap_or(0);
                self.results.push(result.clone());
            }
            _ => {}
        }
    }

    /// Check if all tests passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Get failing tests
    #[must_use]
    pub fn failing_tests(&self) -> Vec<&TestResult> {
        self.results.iter().filter(|r| r.failed()).collect()
    }
}
