// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for lens-discovery

use lens_naming::NamingError;
use thiserror::Error;

/// Errors that can occur while discovering tests in one file
///
/// Every variant concerns a single file; a batch caller is expected to log
/// it and carry on with the next file.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Error reading a source file
    #[error("IO error reading {path}: {source}")]
    Io {
        /// The file being read
        path: String,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// The PHP grammar could not be loaded into the parser
    #[error("Failed to load PHP grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// The source contains syntax errors
    #[error("Syntax error in {path} at {line}:{column}")]
    Syntax {
        /// The offending file
        path: String,
        /// 1-based line of the first error
        line: usize,
        /// 0-based column of the first error
        column: usize,
    },

    /// The parser gave up without producing a tree
    #[error("Parsing aborted for {path}")]
    ParseAborted {
        /// The offending file
        path: String,
    },

    /// A BDD file path could not be mapped to a test class
    #[error(transparent)]
    Naming(#[from] NamingError),
}
