// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Plain-text progress lines
//!
//! PHPUnit interleaves human readable banner and summary lines with the
//! TeamCity messages. Each classifier here recognises one line shape.

use std::sync::LazyLock;

use regex::Regex;

use crate::result::{ResultSummary, TestResult, TestResultEvent};

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PHPUnit\s+(\d[\w.\-]*)").expect("Invalid VERSION_REGEX")
});

static RUNTIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Runtime:\s+(.+)$").expect("Invalid RUNTIME_REGEX"));

static CONFIGURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Configuration:\s+(.+)$").expect("Invalid CONFIGURATION_REGEX")
});

static PROCESSES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Processes:\s+(\d+)").expect("Invalid PROCESSES_REGEX"));

static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Time:\s*(.+?),\s*Memory:\s*(.+?)\s*$").expect("Invalid DURATION_REGEX")
});

static OK_SUMMARY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^OK\s+\((\d+)\s+tests?,\s+(\d+)\s+assertions?\)")
        .expect("Invalid OK_SUMMARY_REGEX")
});

/// Classify a trimmed, non-TeamCity line
#[must_use]
pub fn classify(line: &str) -> Option<TestResult> {
    version(line)
        .or_else(|| runtime(line))
        .or_else(|| configuration(line))
        .or_else(|| processes(line))
        .or_else(|| duration(line))
        .or_else(|| summary(line))
}

fn capture<'a>(regex: &Regex, line: &'a str, group: usize) -> Option<&'a str> {
    regex
        .captures(line)
        .and_then(|caps| caps.get(group))
        .map(|m| m.as_str())
}

fn version(line: &str) -> Option<TestResult> {
    let version = capture(&VERSION_REGEX, line, 1)?;
    let mut result = TestResult::plain(TestResultEvent::TestVersion, line);
    result.phpunit = Some(version.to_string());
    Some(result)
}

fn runtime(line: &str) -> Option<TestResult> {
    let runtime = capture(&RUNTIME_REGEX, line, 1)?;
    let mut result = TestResult::plain(TestResultEvent::TestRuntime, line);
    result.runtime = Some(runtime.trim().to_string());
    Some(result)
}

fn configuration(line: &str) -> Option<TestResult> {
    let configuration = capture(&CONFIGURATION_REGEX, line, 1)?;
    let mut result = TestResult::plain(TestResultEvent::TestConfiguration, line);
    result.configuration = Some(configuration.trim().to_string());
    Some(result)
}

fn processes(line: &str) -> Option<TestResult> {
    let processes = capture(&PROCESSES_REGEX, line, 1)?.parse().ok()?;
    let mut result = TestResult::plain(TestResultEvent::TestProcesses, line);
    result.processes = Some(processes);
    Some(result)
}

fn duration(line: &str) -> Option<TestResult> {
    let caps = DURATION_REGEX.captures(line)?;
    let mut result = TestResult::plain(TestResultEvent::TestDuration, line);
    result.time = caps.get(1).map(|m| m.as_str().to_string());
    result.memory = caps.get(2).map(|m| m.as_str().to_string());
    Some(result)
}

fn summary(line: &str) -> Option<TestResult> {
    let counters = long_summary(line).or_else(|| ok_summary(line))?;
    let mut result = TestResult::plain(TestResultEvent::TestResultSummary, line);
    result.summary = counters;
    Some(result)
}

/// `Tests: 19, Assertions: 15, Errors: 2, Failures: 4, Skipped: 1, Incomplete: 1, Risky: 2.`
fn long_summary(line: &str) -> Option<ResultSummary> {
    if !line.starts_with("Tests:") {
        return None;
    }

    let body = line.trim_end_matches('.');
    let mut summary = ResultSummary::default();
    for field in body.split(',') {
        let (label, value) = field.split_once(':')?;
        let value = value.trim().parse().ok()?;
        if !summary.set(label.trim(), value) {
            return None;
        }
    }
    Some(summary)
}

/// `OK (3 tests, 3 assertions)`
fn ok_summary(line: &str) -> Option<ResultSummary> {
    let caps = OK_SUMMARY_REGEX.captures(line)?;
    Some(ResultSummary {
        tests: caps.get(1)?.as_str().parse().ok(),
        assertions: caps.get(2)?.as_str().parse().ok(),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_version_banner() {
        let result = classify("PHPUnit 9.5.25 #StandWithUkraine").expect("version");
        assert_eq!(result.event, TestResultEvent::TestVersion);
        assert_eq!(result.phpunit.as_deref(), Some("9.5.25"));
        assert_eq!(result.text.as_deref(), Some("PHPUnit 9.5.25 #StandWithUkraine"));

        let result = classify("PHPUnit 10.0.0 by Sebastian Bergmann and contributors.").expect("v10");
        assert_eq!(result.phpunit.as_deref(), Some("10.0.0"));
    }

    #[test]
    fn test_runtime_and_configuration() {
        let result = classify("Runtime:       PHP 8.1.12").expect("runtime");
        assert_eq!(result.event, TestResultEvent::TestRuntime);
        assert_eq!(result.runtime.as_deref(), Some("PHP 8.1.12"));

        let result = classify("Configuration: /srv/app/phpunit.xml").expect("configuration");
        assert_eq!(result.event, TestResultEvent::TestConfiguration);
        assert_eq!(result.configuration.as_deref(), Some("/srv/app/phpunit.xml"));
    }

    #[test]
    fn test_processes_and_duration() {
        let result = classify("Processes:     4").expect("processes");
        assert_eq!(result.processes, Some(4));

        let result = classify("Time: 00:00.049, Memory: 6.00 MB").expect("duration");
        assert_eq!(result.event, TestResultEvent::TestDuration);
        assert_eq!(result.time.as_deref(), Some("00:00.049"));
        assert_eq!(result.memory.as_deref(), Some("6.00 MB"));
    }

    #[test]
    fn test_full_summary() {
        let result = classify(
            "Tests: 19, Assertions: 15, Errors: 2, Failures: 4, Skipped: 1, Incomplete: 1, Risky: 2.",
        )
        .expect("summary");
        assert_eq!(result.event, TestResultEvent::TestResultSummary);
        assert_eq!(
            result.summary,
            ResultSummary {
                tests: Some(19),
                assertions: Some(15),
                errors: Some(2),
                failures: Some(4),
                skipped: Some(1),
                incomplete: Some(1),
                risky: Some(2),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_partial_summary_omits_absent_labels() {
        let result = classify("Tests: 3, Assertions: 3, Failures: 1.").expect("summary");
        assert_eq!(result.summary.failures, Some(1));
        assert_eq!(result.summary.errors, None);
        assert_eq!(result.summary.risky, None);
    }

    #[test]
    fn test_ok_summary() {
        let result = classify("OK (3 tests, 5 assertions)").expect("ok");
        assert_eq!(result.summary.tests, Some(3));
        assert_eq!(result.summary.assertions, Some(5));
    }

    #[test]
    fn test_unrecognized_lines() {
        assert!(classify("").is_none());
        assert!(classify("..F.S").is_none());
        assert!(classify("Tests: many").is_none());
        assert!(classify("Tests: 3, Bananas: 2.").is_none());
        assert!(classify("PHPUnit is great").is_none());
    }
}
