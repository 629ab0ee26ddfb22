// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test id and label generation
//!
//! Ids are stable re-run keys. Two families exist:
//!
//! - Class-based PHPUnit tests: `Assertions (Recca0120\VSCode\Tests\Assertions)::Is not same`
//! - BDD (Pest) tests, whose class FQN carries the [`BDD_ROOT`] prefix:
//!   `tests/Unit/ExampleTest.php::` + the raw description
//!
//! # Example
//!
//! ```
//! use lens_naming::converter::{NameParts, generate_label, generate_unique_id};
//!
//! let parts = NameParts::method("Recca0120\\VSCode\\Tests\\AssertionsTest", "test_is_not_same");
//! assert_eq!(
//!     generate_unique_id(&parts),
//!     "Assertions (Recca0120\\VSCode\\Tests\\Assertions)::Is not same"
//! );
//! assert_eq!(generate_label(&parts), "test_is_not_same");
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::case::{capitalize, snake_case, title_case, uncapitalize};
use crate::definition::{Annotations, TestType};
use crate::error::NamingError;

/// Synthetic namespace root marking a BDD file (no real PHP class)
pub const BDD_ROOT: &str = "P\\";

/// Trailing PHPUnit data-provider decoration, e.g. ` with data set #2`
static DATASET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(.*)(\swith\sdata\sset\s[#"].+)$"#).expect("Invalid DATASET_REGEX")
});

/// The raw naming facts of a test, borrowed from a definition or event
#[derive(Debug, Clone, Copy)]
pub struct NameParts<'a> {
    /// Tier of the test
    pub test_type: TestType,
    /// Fully qualified class name (or namespace for namespace entries)
    pub class_fqn: &'a str,
    /// Short class name, if known
    pub class_name: Option<&'a str>,
    /// Raw method name or BDD description
    pub method_name: Option<&'a str>,
    /// Annotations, if any
    pub annotations: Option<&'a Annotations>,
}

impl<'a> NameParts<'a> {
    /// Naming facts for a namespace entry
    #[must_use]
    pub fn namespace(namespace: &'a str) -> Self {
        Self {
            test_type: TestType::Namespace,
            class_fqn: namespace,
            class_name: None,
            method_name: None,
            annotations: None,
        }
    }

    /// Naming facts for a class entry
    #[must_use]
    pub fn class(class_fqn: &'a str) -> Self {
        Self {
            test_type: TestType::Class,
            ..Self::namespace(class_fqn)
        }
    }

    /// Naming facts for a method entry
    #[must_use]
    pub fn method(class_fqn: &'a str, method_name: &'a str) -> Self {
        Self {
            test_type: TestType::Method,
            method_name: Some(method_name),
            ..Self::namespace(class_fqn)
        }
    }

    /// Attach the short class name
    #[must_use]
    pub fn with_class_name(mut self, class_name: &'a str) -> Self {
        self.class_name = Some(class_name);
        self
    }

    /// Attach annotations
    #[must_use]
    pub fn with_annotations(mut self, annotations: &'a Annotations) -> Self {
        self.annotations = Some(annotations);
        self
    }

    fn testdox(&self) -> Option<&'a str> {
        self.annotations.and_then(Annotations::last_testdox)
    }
}

/// Check whether a class FQN belongs to a BDD file
#[must_use]
pub fn is_bdd(class_fqn: &str) -> bool {
    class_fqn.starts_with(BDD_ROOT)
}

/// Split a method name into its name and trailing dataset suffix.
///
/// `addition_provider with data set #2` -> (`addition_provider`, ` with data set #2`).
/// The suffix is empty when there is none.
#[must_use]
pub fn split_dataset(method_name: &str) -> (&str, &str) {
    match DATASET_REGEX.captures(method_name) {
        Some(caps) => match (caps.get(1), caps.get(2)) {
            (Some(name), Some(dataset)) => (name.as_str(), dataset.as_str()),
            _ => (method_name, ""),
        },
        None => (method_name, ""),
    }
}

/// Generate the stable id of a test
#[must_use]
pub fn generate_unique_id(parts: &NameParts<'_>) -> String {
    if is_bdd(parts.class_fqn) {
        bdd_unique_id(parts)
    } else {
        class_unique_id(parts)
    }
}

fn class_unique_id(parts: &NameParts<'_>) -> String {
    let class = class_label(parts.class_fqn);

    match parts.test_type {
        TestType::Namespace => format!("namespace:{class}"),
        TestType::Class => class,
        TestType::Method => {
            let method = match parts.testdox() {
                Some(testdox) => testdox.to_string(),
                None => method_label(parts.method_name.unwrap_or_default()),
            };
            format!("{class}::{method}")
        }
    }
}

fn bdd_unique_id(parts: &NameParts<'_>) -> String {
    let id = parts.class_fqn.strip_prefix(BDD_ROOT).unwrap_or(parts.class_fqn);

    match parts.test_type {
        TestType::Namespace => format!("namespace:{id}"),
        TestType::Class => id.to_string(),
        TestType::Method => {
            let method = match parts.testdox() {
                Some(testdox) => testdox.to_string(),
                None => {
                    let (name, dataset) = split_dataset(parts.method_name.unwrap_or_default());
                    format!("{}{dataset}", name.replace("*/", "{@*}"))
                }
            };
            format!("{}::{method}", bdd_file_path(id))
        }
    }
}

/// `Recca0120\VSCode\Tests\AssertionsTest` -> `Assertions (Recca0120\VSCode\Tests\Assertions)`
fn class_label(class_fqn: &str) -> String {
    let fqn = strip_suffix_ignore_case(class_fqn, "Test");
    match fqn.rsplit_once('\\') {
        Some((_, short)) => format!("{} ({fqn})", title_case(short)),
        None => title_case(fqn),
    }
}

/// `test_is_not_same with data set #1` -> `Is not same with data set #1`
fn method_label(method_name: &str) -> String {
    let (name, dataset) = split_dataset(method_name);
    let spaced = name.replace('_', " ");
    let words = strip_prefix_ignore_case(&spaced, "test").trim();
    let label = capitalize(&snake_case(words)).replace('_', " ");
    format!("{label}{dataset}")
}

/// `Tests\Unit\ExampleTest` -> `tests/Unit/ExampleTest.php`
fn bdd_file_path(id: &str) -> String {
    format!("{}.php", uncapitalize(id).replace('\\', "/"))
}

fn strip_suffix_ignore_case<'a>(input: &'a str, suffix: &str) -> &'a str {
    let Some(split) = input.len().checked_sub(suffix.len()) else {
        return input;
    };
    match input.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(suffix) => &input[..split],
        _ => input,
    }
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> &'a str {
    match input.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &input[prefix.len()..],
        _ => input,
    }
}

/// Generate the presentation label of a test
#[must_use]
pub fn generate_label(parts: &NameParts<'_>) -> String {
    if let Some(testdox) = parts.testdox() {
        return testdox.to_string();
    }

    let stripped = parts.class_fqn.strip_prefix(BDD_ROOT).unwrap_or(parts.class_fqn);
    match parts.test_type {
        TestType::Namespace => stripped.to_string(),
        TestType::Class => parts.class_name.unwrap_or(stripped).to_string(),
        TestType::Method => parts.method_name.unwrap_or_default().replace('`', ""),
    }
}

/// Escape filter metacharacters (`[`, `]`, `(`, `)`, `*`) with a backslash
#[must_use]
pub fn generate_search_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        if matches!(c, '[' | ']' | '(' | ')' | '*') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// The synthetic namespace and class of a BDD test file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BddScope {
    /// `P\Tests\Unit`, or `None` for a file at the project root
    pub namespace: Option<String>,
    /// `P\Tests\Unit\ExampleTest`
    pub class_fqn: String,
    /// `ExampleTest`
    pub class_name: String,
}

impl BddScope {
    /// Derive the scope from a project-relative path such as `tests/Unit/ExampleTest.php`
    ///
    /// # Errors
    ///
    /// Returns `NamingError::InvalidTestPath` if the path has no file name.
    pub fn from_relative_path(relative: &str) -> Result<Self, NamingError> {
        let mut segments: Vec<&str> = relative
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();

        let file = segments.pop().ok_or_else(|| NamingError::InvalidTestPath {
            path: relative.to_string(),
        })?;
        let class_name = file.strip_suffix(".php").unwrap_or(file);
        if class_name.is_empty() {
            return Err(NamingError::InvalidTestPath {
                path: relative.to_string(),
            });
        }

        let dirs: Vec<String> = segments.iter().map(|s| capitalize(s)).collect();
        let namespace = (!dirs.is_empty()).then(|| format!("{BDD_ROOT}{}", dirs.join("\\")));
        let class_fqn = match &namespace {
            Some(ns) => format!("{ns}\\{class_name}"),
            None => format!("{BDD_ROOT}{class_name}"),
        };

        Ok(Self {
            namespace,
            class_fqn,
            class_name: class_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    const ASSERTIONS: &str = "Recca0120\\VSCode\\Tests\\AssertionsTest";

    #[test]
    fn test_class_ids() {
        assert_eq!(
            generate_unique_id(&NameParts::namespace("Recca0120\\VSCode\\Tests")),
            "namespace:Tests (Recca0120\\VSCode\\Tests)"
        );
        assert_eq!(
            generate_unique_id(&NameParts::class(ASSERTIONS)),
            "Assertions (Recca0120\\VSCode\\Tests\\Assertions)"
        );
        assert_eq!(generate_unique_id(&NameParts::class("CalculatorTest")), "Calculator");
    }

    #[test]
    fn test_method_ids() {
        assert_eq!(
            generate_unique_id(&NameParts::method(ASSERTIONS, "test_passed")),
            "Assertions (Recca0120\\VSCode\\Tests\\Assertions)::Passed"
        );
        assert_eq!(
            generate_unique_id(&NameParts::method(ASSERTIONS, "testIsNotSame")),
            "Assertions (Recca0120\\VSCode\\Tests\\Assertions)::Is not same"
        );
        assert_eq!(
            generate_unique_id(&NameParts::method(ASSERTIONS, "addition_provider with data set #2")),
            "Assertions (Recca0120\\VSCode\\Tests\\Assertions)::Addition provider with data set #2"
        );
        assert_eq!(
            generate_unique_id(&NameParts::method(
                ASSERTIONS,
                "testSum with data set \"one plus two\""
            )),
            "Assertions (Recca0120\\VSCode\\Tests\\Assertions)::Sum with data set \"one plus two\""
        );
    }

    #[test]
    fn test_testdox_replaces_method_segment_only() {
        let annotations = Annotations {
            testdox: vec!["ignored".to_string(), "it adds numbers".to_string()],
            ..Default::default()
        };
        let parts = NameParts::method(ASSERTIONS, "test_sum").with_annotations(&annotations);
        assert_eq!(
            generate_unique_id(&parts),
            "Assertions (Recca0120\\VSCode\\Tests\\Assertions)::it adds numbers"
        );
        assert_eq!(generate_label(&parts), "it adds numbers");
    }

    #[test]
    fn test_bdd_ids() {
        let class = "P\\Tests\\Unit\\ExampleTest";
        assert_eq!(
            generate_unique_id(&NameParts::namespace("P\\Tests\\Unit")),
            "namespace:Tests\\Unit"
        );
        assert_eq!(generate_unique_id(&NameParts::class(class)), "Tests\\Unit\\ExampleTest");
        assert_eq!(
            generate_unique_id(&NameParts::method(class, "test /** with comment */ should do")),
            "tests/Unit/ExampleTest.php::test /** with comment {@*} should do"
        );
        assert_eq!(
            generate_unique_id(&NameParts::method(class, "`sum` → adds with data set #1")),
            "tests/Unit/ExampleTest.php::`sum` → adds with data set #1"
        );
    }

    #[test]
    fn test_labels() {
        let class = "P\\Tests\\Unit\\ExampleTest";
        assert_eq!(generate_label(&NameParts::namespace("P\\Tests\\Unit")), "Tests\\Unit");
        assert_eq!(
            generate_label(&NameParts::class(class).with_class_name("ExampleTest")),
            "ExampleTest"
        );
        assert_eq!(generate_label(&NameParts::class(class)), "Tests\\Unit\\ExampleTest");
        assert_eq!(
            generate_label(&NameParts::method(class, "`something` → `else` → it works")),
            "something → else → it works"
        );
    }

    #[test]
    fn test_split_dataset_only_matches_trailing_suffix() {
        assert_eq!(split_dataset("test_sum with data set #10"), ("test_sum", " with data set #10"));
        assert_eq!(split_dataset("test_sum with data set \"a\""), ("test_sum", " with data set \"a\""));
        assert_eq!(split_dataset("test_sum with data set 1"), ("test_sum with data set 1", ""));
        assert_eq!(split_dataset("test_sum"), ("test_sum", ""));
    }

    #[test]
    fn test_search_text() {
        assert_eq!(
            generate_search_text("test /** with comment */ should do"),
            "test /\\*\\* with comment \\*/ should do"
        );
        assert_eq!(
            generate_search_text("suggests the [pest()] function"),
            "suggests the \\[pest\\(\\)\\] function"
        );
    }

    #[test]
    fn test_bdd_scope_from_relative_path() {
        let scope = BddScope::from_relative_path("tests/Fixtures/ExampleTest.php").expect("scope");
        assert_eq!(scope.namespace.as_deref(), Some("P\\Tests\\Fixtures"));
        assert_eq!(scope.class_fqn, "P\\Tests\\Fixtures\\ExampleTest");
        assert_eq!(scope.class_name, "ExampleTest");

        let windows = BddScope::from_relative_path("tests\\Unit\\ExampleTest.php").expect("scope");
        assert_eq!(windows.class_fqn, "P\\Tests\\Unit\\ExampleTest");

        let root = BddScope::from_relative_path("ExampleTest.php").expect("scope");
        assert!(root.namespace.is_none());
        assert_eq!(root.class_fqn, "P\\ExampleTest");

        assert!(BddScope::from_relative_path("").is_err());
        assert!(BddScope::from_relative_path("tests/.php").is_err());
    }

    #[test]
    fn test_bdd_ids_round_trip_through_scope() {
        let scope = BddScope::from_relative_path("tests/Fixtures/ExampleTest.php").expect("scope");
        assert_eq!(
            generate_unique_id(&NameParts::method(&scope.class_fqn, "example")),
            "tests/Fixtures/ExampleTest.php::example"
        );
    }
}
