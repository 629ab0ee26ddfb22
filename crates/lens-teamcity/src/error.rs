// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for lens-teamcity

use thiserror::Error;

/// Errors produced by the strict TeamCity helpers.
///
/// The streaming [`ProblemMatcher`](crate::ProblemMatcher) never fails; it
/// classifies anything it cannot decode as "no event".
#[derive(Debug, Error)]
pub enum TeamcityError {
    /// Error serializing a decoded record
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reading a progress stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The line has no `##teamcity[` envelope
    #[error("Not a TeamCity message: {line}")]
    NotTeamcity {
        /// The offending line
        line: String,
    },

    /// The envelope is missing its closing bracket
    #[error("Unterminated TeamCity message: {line}")]
    Unterminated {
        /// The offending line
        line: String,
    },

    /// The envelope has no event name
    #[error("TeamCity message without event name: {line}")]
    MissingEventName {
        /// The offending line
        line: String,
    },
}
