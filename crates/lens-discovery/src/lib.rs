// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! lens-discovery: Static PHPUnit and Pest test discovery for phpunit-lens
//!
//! This library crate finds tests in PHP source without running PHP. Files
//! are parsed with tree-sitter, reduced to the handful of constructs that can
//! hold tests, and walked for PHPUnit test classes and Pest
//! `test()`/`it()`/`describe()` calls.

#![warn(missing_docs)]

//! # Example
//!
//! ```
//! use lens_discovery::{ProjectRoot, TestParser};
//! use lens_naming::TestDefinition;
//!
//! let source = r#"<?php
//! namespace Tests\Unit;
//!
//! use PHPUnit\Framework\TestCase;
//!
//! class ExampleTest extends TestCase
//! {
//!     public function test_that_true_is_true(): void
//!     {
//!         $this->assertTrue(true);
//!     }
//! }
//! "#;
//!
//! let parser = TestParser::new(ProjectRoot::new("/srv/app"));
//! let mut tests: Vec<TestDefinition> = Vec::new();
//! parser
//!     .parse(source, "/srv/app/tests/Unit/ExampleTest.php", &mut tests)
//!     .expect("valid php");
//!
//! let ids: Vec<&str> = tests.iter().map(|t| t.id.as_str()).collect();
//! assert_eq!(
//!     ids,
//!     [
//!         "namespace:Unit (Tests\\Unit)",
//!         "Example (Tests\\Unit\\Example)",
//!         "Example (Tests\\Unit\\Example)::That true is true",
//!     ]
//! );
//! ```

pub mod annotations;
pub mod error;
pub mod parser;
pub mod resolver;
pub mod syntax;

pub use error::DiscoveryError;
pub use parser::{DefinitionSink, TestParser, TestParserOptions};
pub use resolver::{PathResolver, ProjectRoot};
pub use syntax::{NodeKind, SyntaxNode, SyntaxProvider, TreeSitterPhp};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::DiscoveryError;
    pub use crate::parser::{DefinitionSink, TestParser};
    pub use crate::resolver::{PathResolver, ProjectRoot};
}
