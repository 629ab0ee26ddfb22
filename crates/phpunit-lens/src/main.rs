// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! phpunit-lens: PHPUnit and Pest test discovery and result decoding
//!
//! This binary crate discovers tests in PHP source and decodes TeamCity
//! progress streams, printing JSON lines on stdout. Logs go to stderr.

use std::fs::File;
use std::io::{self, BufWriter};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use lens_discovery::{ProjectRoot, TestParser};
use phpunit_lens::commands::{decode_results, discover, write_report};
use phpunit_lens::config::{Command, Config};
use tracing::{debug, info};

fn main() -> Result<ExitCode> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(config.log_level().into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    config.validate().context("Invalid configuration")?;

    let Some(command) = config.command.clone() else {
        Config::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match command {
        Command::Discover {
            ref paths,
            test_type,
            ..
        } => {
            let root = config
                .root_path()
                .context("Could not determine the project root")?;
            debug!(root = %root.display(), "discovering tests");

            let parser = TestParser::new(ProjectRoot::new(root)).with_options(command.parser_options());
            let stats = discover(&parser, paths, test_type, &mut out)?;
            if stats.failed_files > 0 {
                info!(failed = stats.failed_files, "some files could not be parsed");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Results {
            input,
            summary,
            chunk_size,
        } => {
            let report = match input {
                Some(path) => {
                    let file = File::open(&path)
                        .with_context(|| format!("Failed to open {}", path.display()))?;
                    decode_results(file, chunk_size, &mut out)?
                }
                None => decode_results(io::stdin().lock(), chunk_size, &mut out)?,
            };
            if summary {
                write_report(&report, &mut out)?;
            }
            Ok(if report.has_failures() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}
