// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! TeamCity service message tokenizer
//!
//! A service message looks like:
//!
//! ```text
//! ##teamcity[testStarted name='test_passed' locationHint='php_qn://...' flowId='8024']
//! ```
//!
//! The tokenizer splits it into an event name and unescaped attribute pairs.
//! It is deliberately forgiving: a truncated line or a malformed pair costs
//! only the affected attribute, never the whole message.

use crate::error::TeamcityError;
use crate::escape::unescape;

/// Marker that opens a service message
pub const TEAMCITY_PREFIX: &str = "##teamcity[";

/// A decoded `##teamcity[...]` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamcityMessage {
    /// Event name, e.g. `testStarted`
    pub name: String,
    /// Attribute pairs in source order, values unescaped
    pub attributes: Vec<(String, String)>,
}

impl TeamcityMessage {
    /// Look up an attribute. When a key repeats, the last occurrence wins.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Find and decode a service message anywhere in `line`.
    ///
    /// Test output printed without a trailing newline can precede the marker,
    /// so the marker is searched for rather than required at column 0.
    #[must_use]
    pub fn find(line: &str) -> Option<Self> {
        let start = line.find(TEAMCITY_PREFIX)?;
        let message = Self::tokenize(&line[start + TEAMCITY_PREFIX.len()..]);
        (!message.name.is_empty()).then_some(message)
    }

    fn tokenize(body: &str) -> Self {
        let mut cursor = Cursor::new(body);
        cursor.skip_whitespace();
        let name = cursor.take_while(|c| !c.is_whitespace() && c != ']');

        let mut attributes = Vec::new();
        loop {
            cursor.skip_whitespace();
            match cursor.peek() {
                None | Some(']') => break,
                Some(_) => {}
            }
            if let Some(pair) = cursor.attribute() {
                attributes.push(pair);
            }
        }

        Self {
            name: name.to_string(),
            attributes,
        }
    }
}

/// Strictly parse a single service message line.
///
/// # Errors
///
/// Returns `TeamcityError::NotTeamcity` when the line does not start with the
/// `##teamcity[` marker, `TeamcityError::Unterminated` when the closing `]` is
/// missing and `TeamcityError::MissingEventName` when no event name follows the
/// marker.
pub fn parse_teamcity_line(line: &str) -> Result<TeamcityMessage, TeamcityError> {
    let trimmed = line.trim();
    let body = trimmed
        .strip_prefix(TEAMCITY_PREFIX)
        .ok_or_else(|| TeamcityError::NotTeamcity {
            line: line.to_string(),
        })?;
    if !body.ends_with(']') || (body.ends_with("|]") && !body.ends_with("||]")) {
        return Err(TeamcityError::Unterminated {
            line: line.to_string(),
        });
    }

    let message = TeamcityMessage::tokenize(body);
    if message.name.is_empty() {
        return Err(TeamcityError::MissingEventName {
            line: line.to_string(),
        });
    }
    Ok(message)
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    /// Read `key='value'`. On a malformed pair, skip to the next space and
    /// return `None`.
    fn attribute(&mut self) -> Option<(String, String)> {
        let key = self.take_while(|c| c != '=' && c != ']' && !c.is_whitespace());
        if key.is_empty() || self.peek() != Some('=') {
            self.take_while(|c| !c.is_whitespace());
            return None;
        }
        self.bump();
        if self.peek() != Some('\'') {
            self.take_while(|c| !c.is_whitespace());
            return None;
        }
        self.bump();

        let start = self.pos;
        let mut end = None;
        while let Some(c) = self.bump() {
            match c {
                '|' => {
                    self.bump();
                }
                '\'' => {
                    end = Some(self.pos - 1);
                    break;
                }
                _ => {}
            }
        }
        // A value cut off by the end of the line keeps what was read.
        let raw = &self.input[start..end.unwrap_or(self.pos)];
        Some((key.to_string(), unescape(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_parse_test_count() {
        let message =
            parse_teamcity_line("##teamcity[testCount count='19' flowId='8024']").expect("parse");
        assert_eq!(message.name, "testCount");
        assert_eq!(message.get("count"), Some("19"));
        assert_eq!(message.get("flowId"), Some("8024"));
    }

    #[test]
    fn test_values_with_escapes() {
        let message = parse_teamcity_line(
            "##teamcity[testFailed name='x' actual='Array &0 (|n    |'e|' => |'f|'|n)' expected='|[1|]']",
        )
        .expect("parse");
        assert_eq!(message.get("actual"), Some("Array &0 (\n    'e' => 'f'\n)"));
        assert_eq!(message.get("expected"), Some("[1]"));
    }

    #[test]
    fn test_empty_value() {
        let message =
            parse_teamcity_line("##teamcity[testFailed name='x' details='' flowId='1']").expect("parse");
        assert_eq!(message.get("details"), Some(""));
        assert_eq!(message.get("flowId"), Some("1"));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let message = parse_teamcity_line("##teamcity[testStarted name='a' name='b']").expect("parse");
        assert_eq!(message.get("name"), Some("b"));
    }

    #[test]
    fn test_malformed_pair_is_skipped() {
        let message =
            parse_teamcity_line("##teamcity[testStarted broken name='ok' bad=value flowId='2']")
                .expect("parse");
        assert_eq!(message.get("name"), Some("ok"));
        assert_eq!(message.get("bad"), None);
        assert_eq!(message.get("flowId"), Some("2"));
    }

    #[test]
    fn test_find_after_leaked_output() {
        let message =
            TeamcityMessage::find("some echo output##teamcity[testFinished name='t' duration='3']")
                .expect("find");
        assert_eq!(message.name, "testFinished");
        assert_eq!(message.get("duration"), Some("3"));
    }

    #[test]
    fn test_find_truncated_line() {
        let message = TeamcityMessage::find("##teamcity[testStarted name='cut").expect("find");
        assert_eq!(message.get("name"), Some("cut"));
    }

    #[test]
    fn test_strict_errors() {
        assert!(matches!(
            parse_teamcity_line("PHPUnit 9.5.25"),
            Err(TeamcityError::NotTeamcity { .. })
        ));
        assert!(matches!(
            parse_teamcity_line("##teamcity[testStarted name='x'"),
            Err(TeamcityError::Unterminated { .. })
        ));
        assert!(matches!(
            parse_teamcity_line("##teamcity[ ]"),
            Err(TeamcityError::MissingEventName { .. })
        ));
        assert!(TeamcityMessage::find("##teamcity[]").is_none());
    }
}
