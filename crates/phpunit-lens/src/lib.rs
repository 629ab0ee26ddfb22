// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! phpunit-lens library
//!
//! This module exports the command line configuration and the command
//! implementations for use in integration tests and as a library.

pub mod commands;
pub mod config;

pub use commands::{CommandError, DiscoverStats, ResultsReport};
pub use config::{Command, Config, ConfigError};
