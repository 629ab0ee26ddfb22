// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the streaming matcher
//!
//! The input is split into chunks at fuzzer-chosen sizes, so line
//! reassembly is exercised as well as decoding.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use lens_teamcity::ProblemMatcher;

#[derive(Debug, Arbitrary)]
struct Input {
    data: Vec<u8>,
    chunk_size: u8,
}

fuzz_target!(|input: Input| {
    let mut matcher = ProblemMatcher::new();

    // Decoding should never panic, whatever the chunking
    let _ = matcher.read_from(input.data.as_slice(), usize::from(input.chunk_size), |_| {});

    let _ = matcher.pending();
});
