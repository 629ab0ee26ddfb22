// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test definition types shared by discovery and result decoding

use serde::{Deserialize, Serialize};

/// The tier a discovered test occupies in the test tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestType {
    /// A PHP namespace, or the directory of a BDD test file
    Namespace,
    /// A test class, or the synthetic class of a BDD test file
    Class,
    /// A single test method or BDD `test`/`it` call
    Method,
}

impl TestType {
    /// Tree depth of this tier (namespace = 1, class = 2, method = 3)
    #[must_use]
    pub fn depth(self) -> u8 {
        match self {
            Self::Namespace => 1,
            Self::Class => 2,
            Self::Method => 3,
        }
    }

    /// Lowercase name used on the command line and in logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::Class => "class",
            Self::Method => "method",
        }
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "namespace" => Ok(Self::Namespace),
            "class" => Ok(Self::Class),
            "method" => Ok(Self::Method),
            other => Err(format!("unknown test type: {other}")),
        }
    }
}

/// A position in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line number
    pub line: usize,
    /// 0-based byte column
    pub character: usize,
}

impl Position {
    /// Create a new position
    #[must_use]
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Annotations attached to a test through doc comments or PHP attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotations {
    /// `@test` / `#[Test]` marker
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub test: bool,
    /// `@testdox` / `#[TestDox]` overrides, in source order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub testdox: Vec<String>,
    /// `@dataProvider` / `#[DataProvider]` method names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_provider: Vec<String>,
    /// `@depends` / `#[Depends]` targets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
    /// `@group` / `#[Group]` names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<String>,
}

impl Annotations {
    /// Check whether no annotation was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.test
            && self.testdox.is_empty()
            && self.data_provider.is_empty()
            && self.depends.is_empty()
            && self.group.is_empty()
    }

    /// The effective testdox override. Only the last one counts.
    #[must_use]
    pub fn last_testdox(&self) -> Option<&str> {
        self.testdox.last().map(String::as_str)
    }

    /// Append all annotations of `other`, keeping source order
    pub fn merge(&mut self, other: Annotations) {
        self.test |= other.test;
        self.testdox.extend(other.testdox);
        self.data_provider.extend(other.data_provider);
        self.depends.extend(other.depends);
        self.group.extend(other.group);
    }
}

/// A test discovered in PHP source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDefinition {
    /// Which tier this definition belongs to
    #[serde(rename = "type")]
    pub test_type: TestType,
    /// Stable identifier, usable as a re-run key
    pub id: String,
    /// Fully qualified class name (`P\` prefixed for BDD files)
    #[serde(rename = "classFQN")]
    pub class_fqn: String,
    /// Namespace of the class (empty for global classes)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Short class name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Raw method name, or the compound BDD description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    /// Presentation label
    pub label: String,
    /// Source file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Start of the declaration or call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Position>,
    /// End of the declaration or call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Position>,
    /// Tree depth (1..=3)
    pub depth: u8,
    /// Annotations found on the declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
}

impl TestDefinition {
    /// Check whether this is a method-level (runnable) definition
    #[must_use]
    pub fn is_method(&self) -> bool {
        self.test_type == TestType::Method
    }

    /// Span of the definition, if it has one
    #[must_use]
    pub fn span(&self) -> Option<(Position, Position)> {
        self.start.zip(self.end)
    }
}
