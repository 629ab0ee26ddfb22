// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the phpunit-lens command line
//!
//! This module provides the clap configuration types, including the project
//! root, logging options and the `discover` / `results` subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lens_discovery::TestParserOptions;
use lens_naming::TestType;

/// Default read size for the `results` stream
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// phpunit-lens - PHPUnit and Pest test discovery and result decoding
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "phpunit-lens")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Project root used to derive Pest test ids
    ///
    /// Pest files are named after their path relative to this directory.
    /// Defaults to the current working directory.
    #[arg(short, long, global = true, env = "PHPUNIT_LENS_ROOT")]
    pub root: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so the JSON lines on stdout stay clean.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Discover tests in PHP source files
    ///
    /// Directories are searched recursively for `*.php` files, skipping
    /// `vendor`, `node_modules` and hidden directories. One JSON test
    /// definition is printed per line.
    ///
    /// Example:
    ///   phpunit-lens --root . discover tests --type method
    Discover {
        /// Files or directories to search
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Only print definitions of this type (namespace, class, method)
        #[arg(long = "type", value_name = "TYPE")]
        test_type: Option<TestType>,

        /// Class name suffix marking a test class (repeatable)
        #[arg(long = "class-suffix", value_name = "SUFFIX")]
        class_suffixes: Vec<String>,

        /// Parent class marking a test class (repeatable)
        #[arg(long = "base-class", value_name = "CLASS")]
        base_classes: Vec<String>,

        /// Method name prefix marking a test method
        #[arg(long, value_name = "PREFIX")]
        method_prefix: Option<String>,
    },

    /// Decode a TeamCity progress stream
    ///
    /// Reads the output of `phpunit --teamcity` or `pest --teamcity` and
    /// prints one JSON test result per decoded event.
    ///
    /// Example:
    ///   vendor/bin/phpunit --teamcity | phpunit-lens results --summary
    Results {
        /// Read the stream from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print a final tally after the results
        #[arg(long, default_value = "false")]
        summary: bool,

        /// Read size in bytes
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
}

impl Command {
    /// Discovery predicates for a `discover` command, defaults elsewhere
    ///
    /// Flags that were not given keep their default values.
    #[must_use]
    pub fn parser_options(&self) -> TestParserOptions {
        let mut options = TestParserOptions::default();
        if let Self::Discover {
            class_suffixes,
            base_classes,
            method_prefix,
            ..
        } = self
        {
            if !class_suffixes.is_empty() {
                options.class_suffixes = class_suffixes.clone();
            }
            if !base_classes.is_empty() {
                options.base_classes = base_classes.clone();
            }
            if let Some(prefix) = method_prefix {
                options.method_prefix = prefix.clone();
            }
        }
        options
    }
}

impl Config {
    /// Get the project root, using current directory as default
    ///
    /// Returns `None` if no root is specified and the current
    /// directory cannot be determined.
    #[must_use]
    pub fn root_path(&self) -> Option<PathBuf> {
        self.root.clone().or_else(|| std::env::current_dir().ok())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the root is specified but is missing or not a
    /// directory, or if a `results` chunk size is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref root) = self.root {
            if !root.exists() {
                return Err(ConfigError::RootNotFound(root.clone()));
            }
            if !root.is_dir() {
                return Err(ConfigError::RootNotDirectory(root.clone()));
            }
        }

        if let Some(Command::Results { chunk_size: 0, .. }) = &self.command {
            return Err(ConfigError::InvalidChunkSize);
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Project root not found
    #[error("Project root not found: {0}")]
    RootNotFound(PathBuf),

    /// Project root is not a directory
    #[error("Project root is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    /// Zero-byte reads would never make progress
    #[error("Chunk size must be at least 1")]
    InvalidChunkSize,
}
