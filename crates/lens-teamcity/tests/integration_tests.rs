// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Integration tests for lens-teamcity
//!
//! These tests replay recorded PHPUnit and Pest TeamCity transcripts through
//! the matcher and check the decoded lifecycle end to end.

use std::path::{Path, PathBuf};

use lens_teamcity::{
    Location, ProblemMatcher, TeamcityMessage, TestResult, TestResultEvent, TestRunSummary,
    escape, parse_output, unescape,
};
use proptest::prelude::*;
use similar_asserts::assert_eq;

const STUB: &str = "/srv/vscode/fixtures/phpunit-stub";
const ASSERTIONS_ID: &str = "Assertions (Recca0120\\VSCode\\Tests\\Assertions)";

/// Get the fixtures directory for test data
fn fixtures_dir() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    Path::new(&manifest_dir).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_dir().join(name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {name}: {e}"))
}

fn find<'a>(results: &'a [TestResult], event: TestResultEvent, name: &str) -> &'a TestResult {
    results
        .iter()
        .find(|r| r.event == event && r.name.as_deref() == Some(name))
        .unwrap_or_else(|| panic!("no {event:?} record for {name}"))
}

#[test]
fn test_phpunit_transcript_events_in_order() {
    let results = parse_output(&fixture("phpunit-assertions.txt"));
    let events: Vec<TestResultEvent> = results.iter().map(|r| r.event).collect();

    use TestResultEvent::*;
    assert_eq!(
        events,
        vec![
            TestVersion,
            TestRuntime,
            TestConfiguration,
            TestCount,
            TestSuiteStarted,
            TestSuiteStarted,
            TestStarted,
            TestFinished,
            TestStarted,
            TestFailed,
            TestStarted,
            TestIgnored,
            TestSuiteStarted,
            TestStarted,
            TestFailed,
            TestSuiteFinished,
            TestSuiteFinished,
            TestSuiteFinished,
            TestDuration,
            TestResultSummary,
        ]
    );
}

#[test]
fn test_phpunit_banner_lines() {
    let results = parse_output(&fixture("phpunit-assertions.txt"));

    assert_eq!(results[0].phpunit.as_deref(), Some("9.5.25"));
    assert_eq!(
        results[0].text.as_deref(),
        Some("PHPUnit 9.5.25 #StandWithUkraine")
    );
    assert_eq!(results[1].runtime.as_deref(), Some("PHP 8.1.12"));
    assert_eq!(
        results[2].configuration,
        Some(format!("{STUB}/phpunit.xml"))
    );
    assert_eq!(results[3].count, Some(4));
    assert_eq!(results[3].flow_id, Some(8024));
}

#[test]
fn test_phpunit_comparison_failure() {
    let results = parse_output(&fixture("phpunit-assertions.txt"));
    let failed = find(&results, TestResultEvent::TestFailed, "test_is_not_same");

    assert_eq!(failed.id.as_deref(), Some(&*format!("{ASSERTIONS_ID}::Is not same")));
    assert_eq!(failed.test_id, failed.id);
    assert_eq!(
        failed.message.as_deref(),
        Some("Failed asserting that two arrays are identical.")
    );
    assert_eq!(failed.failure_type.as_deref(), Some("comparisonFailure"));
    assert_eq!(
        failed.actual.as_deref(),
        Some("Array &0 (\n    'e' => 'f'\n    0 => 'g'\n    1 => 'h'\n)")
    );
    assert_eq!(
        failed.expected.as_deref(),
        Some("Array &0 (\n    'a' => 'b'\n    'c' => 'd'\n)")
    );
    assert_eq!(
        failed.details,
        vec![Location {
            file: format!("{STUB}/tests/AssertionsTest.php"),
            line: 27,
        }]
    );
    assert_eq!(failed.line, Some(27));
    assert_eq!(failed.duration, Some(0));
}

#[test]
fn test_phpunit_dataset_ids() {
    let results = parse_output(&fixture("phpunit-assertions.txt"));

    let suite = find(&results, TestResultEvent::TestSuiteStarted, "addition_provider");
    assert_eq!(
        suite.id.as_deref(),
        Some(&*format!("{ASSERTIONS_ID}::Addition provider"))
    );

    let failed = find(
        &results,
        TestResultEvent::TestFailed,
        "addition_provider with data set #2",
    );
    assert_eq!(
        failed.id.as_deref(),
        Some(&*format!("{ASSERTIONS_ID}::Addition provider with data set #2"))
    );
    assert_eq!(
        failed.test_id.as_deref(),
        Some(&*format!("{ASSERTIONS_ID}::Addition provider"))
    );
    assert_eq!(failed.actual.as_deref(), Some("1"));
    assert_eq!(failed.expected.as_deref(), Some("2"));
    assert_eq!(failed.line, Some(60));
}

#[test]
fn test_phpunit_suite_lifecycle() {
    let results = parse_output(&fixture("phpunit-assertions.txt"));

    let finished = find(
        &results,
        TestResultEvent::TestSuiteFinished,
        "Recca0120\\VSCode\\Tests\\AssertionsTest",
    );
    assert_eq!(finished.id.as_deref(), Some(ASSERTIONS_ID));
    assert_eq!(finished.test_id.as_deref(), Some(ASSERTIONS_ID));
    assert_eq!(
        finished.file,
        Some(format!("{STUB}/tests/AssertionsTest.php"))
    );

    let root = find(&results, TestResultEvent::TestSuiteFinished, "default");
    assert!(root.id.is_none());
    assert_eq!(root.flow_id, Some(8024));
}

#[test]
fn test_phpunit_summary_lines() {
    let results = parse_output(&fixture("phpunit-assertions.txt"));
    let last = results.last().expect("summary");

    assert_eq!(last.summary.tests, Some(4));
    assert_eq!(last.summary.assertions, Some(3));
    assert_eq!(last.summary.failures, Some(2));
    assert_eq!(last.summary.skipped, Some(1));
    assert_eq!(last.summary.errors, None);

    let duration = &results[results.len() - 2];
    assert_eq!(duration.time.as_deref(), Some("00:00.049"));
    assert_eq!(duration.memory.as_deref(), Some("6.00 MB"));
}

#[test]
fn test_phpunit_tally() {
    let mut summary = TestRunSummary::empty();
    for result in parse_output(&fixture("phpunit-assertions.txt")) {
        summary.record(&result);
    }

    assert_eq!(summary.total, 4);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.ignored, 1);
    assert!(!summary.all_passed());
    assert_eq!(summary.failing_tests().len(), 2);
    assert_eq!(summary.summary.and_then(|s| s.tests), Some(4));
}

#[test]
fn test_repeated_failures_join_messages() {
    let results = parse_output(&fixture("phpunit-exception.txt"));
    let last = results.last().expect("closing record");

    assert_eq!(last.event, TestResultEvent::TestFailed);
    assert_eq!(last.name.as_deref(), Some("test_throw_exception"));
    assert_eq!(last.flow_id, Some(28756));
    assert_eq!(
        last.id.as_deref(),
        Some("Calculator (Recca0120\\VSCode\\Tests\\Calculator)::Throw exception")
    );
    assert_eq!(last.test_id, last.id);
    assert_eq!(
        last.message.as_deref(),
        Some("Exception\n\nThis test did not perform any assertions")
    );
    assert_eq!(
        last.details,
        vec![
            Location {
                file: format!("{STUB}/src/Calculator.php"),
                line: 21,
            },
            Location {
                file: format!("{STUB}/tests/CalculatorTest.php"),
                line: 54,
            },
        ]
    );
    assert_eq!(last.file, Some(format!("{STUB}/tests/CalculatorTest.php")));
    assert_eq!(last.line, Some(54));
    assert_eq!(last.duration, Some(15));
    assert_eq!(
        last.location_hint,
        Some(format!(
            "php_qn://{STUB}/tests/CalculatorTest.php::\\Recca0120\\VSCode\\Tests\\CalculatorTest::test_throw_exception"
        ))
    );
}

#[test]
fn test_pest_transcript_ids() {
    let results = parse_output(&fixture("pest-example.txt"));

    let suite = find(
        &results,
        TestResultEvent::TestSuiteStarted,
        "Tests\\Unit\\ExampleTest",
    );
    assert_eq!(suite.id.as_deref(), Some("Tests\\Unit\\ExampleTest"));
    assert_eq!(suite.file.as_deref(), Some("tests/Unit/ExampleTest.php"));

    let example = find(&results, TestResultEvent::TestFinished, "example");
    assert_eq!(
        example.id.as_deref(),
        Some("tests/Unit/ExampleTest.php::example")
    );

    let nested = find(
        &results,
        TestResultEvent::TestFinished,
        "`something` → it test example",
    );
    assert_eq!(
        nested.id.as_deref(),
        Some("tests/Unit/ExampleTest.php::`something` → it test example")
    );
    assert_eq!(nested.label.as_deref(), Some("something → it test example"));
    assert_eq!(nested.duration, Some(2));
}

#[test]
fn test_line_by_line_without_newlines() {
    let mut matcher = ProblemMatcher::new();
    let mut last = None;
    for line in fixture("phpunit-exception.txt").lines() {
        last = matcher.parse_line(line).or(last);
    }
    let last = last.expect("closing record");
    assert_eq!(last.event, TestResultEvent::TestFailed);
    assert_eq!(matcher.pending(), 0);
}

#[test]
fn test_json_lines_use_wire_names() {
    let results = parse_output(&fixture("phpunit-exception.txt"));
    let line = results
        .last()
        .expect("closing record")
        .to_json_line()
        .expect("serialize");
    let json: serde_json::Value = serde_json::from_str(&line).expect("valid json");

    assert_eq!(json["event"], "testFailed");
    assert_eq!(json["flowId"], 28756);
    assert_eq!(json["details"][1]["line"], 54);
    assert!(json.get("testId").is_some());
    assert!(json.get("locationHint").is_some());
}

fn feed_in_pieces(input: &str, cuts: &[usize]) -> Vec<TestResult> {
    let mut cuts: Vec<usize> = cuts
        .iter()
        .map(|c| c % (input.len() + 1))
        .filter(|c| input.is_char_boundary(*c))
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut matcher = ProblemMatcher::new();
    let mut results = Vec::new();
    let mut start = 0;
    for cut in cuts {
        results.extend(matcher.feed(&input[start..cut]));
        start = cut;
    }
    results.extend(matcher.feed(&input[start..]));
    results.extend(matcher.finish());
    results
}

proptest! {
    #[test]
    fn prop_escape_round_trip(value in any::<String>()) {
        prop_assert_eq!(unescape(&escape(&value)), value);
    }

    #[test]
    fn prop_escaped_values_survive_tokenizing(value in any::<String>()) {
        let line = format!("##teamcity[testFailed name='t' message='{}' flowId='1']", escape(&value));
        let message = TeamcityMessage::find(&line).expect("message");
        prop_assert_eq!(message.get("message"), Some(value.as_str()));
        prop_assert_eq!(message.get("flowId"), Some("1"));
    }

    #[test]
    fn prop_fragmentation_does_not_change_results(
        cuts in proptest::collection::vec(any::<usize>(), 0..40)
    ) {
        let input = fixture("phpunit-assertions.txt");
        prop_assert_eq!(feed_in_pieces(&input, &cuts), parse_output(&input));
    }

    #[test]
    fn prop_arbitrary_lines_never_panic(lines in proptest::collection::vec(".*", 0..20)) {
        let mut matcher = ProblemMatcher::new();
        for line in &lines {
            let _ = matcher.parse_line(line);
        }
        let _ = matcher.finish();
    }
}
