// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Streaming decoder for PHPUnit/Pest progress output
//!
//! [`ProblemMatcher`] accepts output chunks split at arbitrary byte positions,
//! reassembles lines and turns each recognised line into a [`TestResult`].
//! Failures and skips are held per `flowId` until the test's `testFinished`
//! arrives, then surface as a single merged record.
//!
//! # Example
//!
//! ```
//! use lens_teamcity::matcher::ProblemMatcher;
//! use lens_teamcity::result::TestResultEvent;
//!
//! let mut matcher = ProblemMatcher::new();
//! assert!(matcher.parse("##teamcity[testCount count='19' ").is_none());
//!
//! let result = matcher.parse("flowId='8024']\n").expect("complete line");
//! assert_eq!(result.event, TestResultEvent::TestCount);
//! assert_eq!(result.count, Some(19));
//! assert_eq!(result.flow_id, Some(8024));
//! ```

use std::collections::{HashMap, VecDeque};
use std::io::Read;

use tracing::{debug, trace, warn};

use crate::error::TeamcityError;
use crate::location::{LocationHint, parse_details, primary_line};
use crate::message::TeamcityMessage;
use crate::plain;
use crate::result::{TestResult, TestResultEvent};

/// Flow used for events that carry no `flowId`
const DEFAULT_FLOW: u32 = 0;

/// Suite name PHPUnit gives the root pseudo-suite
const ROOT_SUITE: &str = "default";

/// A test between `testStarted` and `testFinished`
#[derive(Debug)]
struct PendingTest {
    record: TestResult,
    messages: Vec<String>,
    failed: bool,
    ignored: bool,
}

impl PendingTest {
    fn new(record: TestResult) -> Self {
        Self {
            record,
            messages: Vec::new(),
            failed: false,
            ignored: false,
        }
    }

    fn name(&self) -> Option<&str> {
        self.record.name.as_deref()
    }

    /// Fold a `testFailed` or `testIgnored` record into the pending test
    fn absorb(&mut self, update: TestResult) {
        match update.event {
            TestResultEvent::TestFailed => self.failed = true,
            TestResultEvent::TestIgnored => self.ignored = true,
            _ => {}
        }

        if let Some(message) = update.message.filter(|m| !m.is_empty()) {
            self.messages.push(message);
        }
        if !update.details.is_empty() {
            self.record.details = update.details;
        }
        if update.failure_type.is_some() {
            self.record.failure_type = update.failure_type;
        }
        if update.actual.is_some() {
            self.record.actual = update.actual;
        }
        if update.expected.is_some() {
            self.record.expected = update.expected;
        }
        if self.record.id.is_none() {
            self.record.id = update.id;
            self.record.test_id = update.test_id;
            self.record.label = update.label;
        }
        if self.record.file.is_none() {
            self.record.file = update.file;
        }
        if self.record.location_hint.is_none() {
            self.record.location_hint = update.location_hint;
        }
    }

    /// Close the test with its `testFinished` record
    fn close(self, finished: TestResult) -> TestResult {
        let mut record = self.record;
        record.event = if self.failed {
            TestResultEvent::TestFailed
        } else if self.ignored {
            TestResultEvent::TestIgnored
        } else {
            TestResultEvent::TestFinished
        };
        if finished.duration.is_some() {
            record.duration = finished.duration;
        }
        if !self.messages.is_empty() {
            record.message = Some(self.messages.join("\n\n"));
        }
        settle_location(&mut record);
        record
    }
}

/// Decoder state for one output stream
///
/// Each instance owns its line buffer and its open-test map; nothing is
/// shared between instances.
#[derive(Debug, Default)]
pub struct ProblemMatcher {
    buffer: String,
    open_tests: HashMap<u32, PendingTest>,
    open_suites: HashMap<(u32, String), TestResult>,
    ready: VecDeque<TestResult>,
}

impl ProblemMatcher {
    /// Create a new matcher
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the next decoded record, if any.
    ///
    /// A chunk completing several lines may decode to several records; the
    /// first is returned and the rest stay queued. Callers driving a long
    /// stream through `parse` must empty the queue with
    /// [`ProblemMatcher::drain_ready`] (or switch to
    /// [`ProblemMatcher::feed`]), otherwise it grows with every multi-line
    /// chunk.
    pub fn parse(&mut self, chunk: &str) -> Option<TestResult> {
        let decoded = self.decode(chunk);
        self.ready.extend(decoded);
        self.ready.pop_front()
    }

    /// Feed a chunk and return every record completed by it, in stream order
    ///
    /// Records still queued by earlier [`ProblemMatcher::parse`] calls come
    /// first.
    pub fn feed(&mut self, chunk: &str) -> Vec<TestResult> {
        let mut results: Vec<TestResult> = self.ready.drain(..).collect();
        results.extend(self.decode(chunk));
        results
    }

    /// Take every record queued by [`ProblemMatcher::parse`], oldest first
    pub fn drain_ready(&mut self) -> impl Iterator<Item = TestResult> + '_ {
        self.ready.drain(..)
    }

    /// Number of decoded records waiting to be handed out
    #[must_use]
    pub fn queued(&self) -> usize {
        self.ready.len()
    }

    fn decode(&mut self, chunk: &str) -> Vec<TestResult> {
        self.buffer.push_str(chunk);

        let mut decoded = Vec::new();
        while let Some(end) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=end).collect();
            if let Some(result) = self.parse_line(&line) {
                decoded.push(result);
            }
        }
        decoded
    }

    /// Decode one complete line
    pub fn parse_line(&mut self, line: &str) -> Option<TestResult> {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            return None;
        }

        match TeamcityMessage::find(line) {
            Some(message) => self.handle_message(&message),
            None => plain::classify(line.trim()),
        }
    }

    /// Flush a trailing line that never got its newline, and drain any
    /// records still queued by [`ProblemMatcher::parse`].
    ///
    /// Tests that were started but never finished stay pending.
    pub fn finish(&mut self) -> Vec<TestResult> {
        let tail = std::mem::take(&mut self.buffer);
        let mut drained: Vec<TestResult> = self.ready.drain(..).collect();
        drained.extend(self.parse_line(&tail));
        drained
    }

    /// Pump a byte stream through the matcher in `chunk_size` reads.
    ///
    /// Reads are split wherever the reader returns, including inside a UTF-8
    /// sequence; incomplete sequences are carried into the next read and
    /// invalid bytes are replaced. Each decoded record is handed to `on_result`
    /// as soon as its line completes, and the trailing partial line is flushed
    /// at end of stream.
    ///
    /// # Errors
    ///
    /// Returns `TeamcityError::Io` if reading fails.
    pub fn read_from<R: Read>(
        &mut self,
        mut reader: R,
        chunk_size: usize,
        mut on_result: impl FnMut(TestResult),
    ) -> Result<(), TeamcityError> {
        let mut chunk = vec![0u8; chunk_size.max(4)];
        let mut carry: Vec<u8> = Vec::new();

        loop {
            let read = reader.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            carry.extend_from_slice(&chunk[..read]);

            let text = take_utf8(&mut carry);
            for result in self.feed(&text) {
                on_result(result);
            }
        }

        if !carry.is_empty() {
            let text = String::from_utf8_lossy(&carry).into_owned();
            for result in self.feed(&text) {
                on_result(result);
            }
        }
        for result in self.finish() {
            on_result(result);
        }
        Ok(())
    }

    /// Number of tests started but not yet finished
    #[must_use]
    pub fn pending(&self) -> usize {
        self.open_tests.len()
    }

    fn handle_message(&mut self, message: &TeamcityMessage) -> Option<TestResult> {
        let Some(event) = TestResultEvent::from_teamcity(&message.name) else {
            trace!(name = %message.name, "ignoring teamcity event");
            return None;
        };
        let result = decode(event, message);

        match event {
            TestResultEvent::TestSuiteStarted => Some(self.suite_started(result)),
            TestResultEvent::TestSuiteFinished => Some(self.suite_finished(result)),
            TestResultEvent::TestStarted => Some(self.test_started(result)),
            TestResultEvent::TestFailed | TestResultEvent::TestIgnored => {
                self.test_problem(result);
                None
            }
            TestResultEvent::TestFinished => Some(self.test_finished(result)),
            _ => Some(result),
        }
    }

    fn suite_started(&mut self, result: TestResult) -> TestResult {
        if let Some(name) = result.name.clone()
            && name != ROOT_SUITE
        {
            self.open_suites.insert((flow(&result), name), result.clone());
        }
        result
    }

    fn suite_finished(&mut self, mut result: TestResult) -> TestResult {
        let Some(name) = result.name.clone() else {
            return result;
        };
        if let Some(started) = self.open_suites.remove(&(flow(&result), name)) {
            result.id = result.id.or(started.id);
            result.test_id = result.test_id.or(started.test_id);
            result.label = result.label.or(started.label);
            result.file = result.file.or(started.file);
            result.location_hint = result.location_hint.or(started.location_hint);
        }
        result
    }

    fn test_started(&mut self, result: TestResult) -> TestResult {
        let flow = flow(&result);
        if let Some(previous) = self.open_tests.insert(flow, PendingTest::new(result.clone())) {
            warn!(
                flow,
                name = ?previous.name(),
                "testStarted replaced an unfinished test"
            );
        }
        result
    }

    fn test_problem(&mut self, result: TestResult) {
        let flow = flow(&result);
        match self.open_tests.get_mut(&flow) {
            Some(pending) if pending.name() == result.name.as_deref() => pending.absorb(result),
            other => {
                if let Some(previous) = other {
                    debug!(
                        flow,
                        name = ?previous.name(),
                        "problem for a different test, dropping the open one"
                    );
                }
                let mut record = result.clone();
                record.event = TestResultEvent::TestStarted;
                record.message = None;
                let mut pending = PendingTest::new(record);
                pending.absorb(result);
                self.open_tests.insert(flow, pending);
            }
        }
    }

    fn test_finished(&mut self, mut result: TestResult) -> TestResult {
        let flow = flow(&result);
        let matches = self
            .open_tests
            .get(&flow)
            .is_some_and(|pending| pending.name() == result.name.as_deref());

        if matches && let Some(pending) = self.open_tests.remove(&flow) {
            return pending.close(result);
        }

        debug!(flow, name = ?result.name, "testFinished without an open test");
        settle_location(&mut result);
        result
    }
}

/// Decode a whole transcript with a fresh matcher
#[must_use]
pub fn parse_output(output: &str) -> Vec<TestResult> {
    let mut matcher = ProblemMatcher::new();
    let mut results = matcher.feed(output);
    results.extend(matcher.finish());
    results
}

fn flow(result: &TestResult) -> u32 {
    result.flow_id.unwrap_or(DEFAULT_FLOW)
}

/// Build a record from a service message's own attributes
fn decode(event: TestResultEvent, message: &TeamcityMessage) -> TestResult {
    let mut result = TestResult::new(event);
    result.name = message.get("name").map(str::to_string);
    result.flow_id = message.get("flowId").and_then(|v| v.trim().parse().ok());
    result.count = message.get("count").and_then(|v| v.trim().parse().ok());
    result.duration = message.get("duration").and_then(|v| v.trim().parse().ok());
    result.message = message.get("message").map(str::to_string);
    result.failure_type = message.get("type").map(str::to_string);
    result.actual = message.get("actual").map(str::to_string);
    result.expected = message.get("expected").map(str::to_string);
    result.details = message.get("details").map(parse_details).unwrap_or_default();
    result.location_hint = message.get("locationHint").map(str::to_string);

    if let Some(hint) = result.location_hint.as_deref().and_then(LocationHint::parse) {
        hint.enrich(&mut result);
    }
    result
}

/// Fill `file` from the stack when the hint had none, then pick `line`
fn settle_location(result: &mut TestResult) {
    if result.file.is_none() {
        result.file = result.details.first().map(|loc| loc.file.clone());
    }
    result.line = primary_line(&result.details, result.file.as_deref());
}

/// Decode the longest prefix of `carry` that cannot change with more input
///
/// Invalid bytes become U+FFFD. A truncated sequence at the end stays in
/// `carry` for the next read.
fn take_utf8(carry: &mut Vec<u8>) -> String {
    let mut text = String::new();
    let mut start = 0;
    while start < carry.len() {
        match std::str::from_utf8(&carry[start..]) {
            Ok(valid) => {
                text.push_str(valid);
                start = carry.len();
            }
            Err(e) => {
                let valid_end = start + e.valid_up_to();
                text.push_str(&String::from_utf8_lossy(&carry[start..valid_end]));
                match e.error_len() {
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        start = valid_end + len;
                    }
                    None => {
                        start = valid_end;
                        break;
                    }
                }
            }
        }
    }
    carry.drain(..start);
    text
}
