// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for lens-naming

use thiserror::Error;

/// Errors that can occur while deriving test names
#[derive(Debug, Error)]
pub enum NamingError {
    /// A BDD test file path has no usable file name
    #[error("Invalid test file path: {path}")]
    InvalidTestPath {
        /// The path that could not be turned into a test class
        path: String,
    },
}
