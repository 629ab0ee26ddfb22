// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! lens-teamcity: PHPUnit progress stream decoding for phpunit-lens
//!
//! This library crate decodes the output of `phpunit --teamcity` (and Pest's
//! TeamCity printer) into structured test results. The stream mixes
//! `##teamcity[...]` service messages with plain banner and summary lines,
//! and may arrive in arbitrarily fragmented chunks.
//!
//! # Example
//!
//! ```
//! use lens_teamcity::{ProblemMatcher, TestResultEvent};
//!
//! let mut matcher = ProblemMatcher::new();
//! matcher.parse("##teamcity[testStarted name='test_add' flowId='1']\n");
//! matcher.parse("##teamcity[testFailed name='test_add' message='Failed asserting that 3 is 4.' flowId='1']\n");
//!
//! let result = matcher
//!     .parse("##teamcity[testFinished name='test_add' duration='2' flowId='1']\n")
//!     .expect("finished");
//! assert_eq!(result.event, TestResultEvent::TestFailed);
//! assert_eq!(result.message.as_deref(), Some("Failed asserting that 3 is 4."));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod escape;
pub mod location;
pub mod matcher;
pub mod message;
pub mod plain;
pub mod result;

pub use error::TeamcityError;
pub use escape::{escape, unescape};
pub use location::{LocationHint, parse_details};
pub use matcher::{ProblemMatcher, parse_output};
pub use message::{TeamcityMessage, parse_teamcity_line};
pub use result::{Location, ResultSummary, TestResult, TestResultEvent, TestRunSummary};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::TeamcityError;
    pub use crate::matcher::{ProblemMatcher, parse_output};
    pub use crate::result::{TestResult, TestResultEvent, TestRunSummary};
}
