// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for test discovery
//!
//! Feeds arbitrary text through the tree-sitter grammar and both discovery
//! passes.

#![no_main]

use libfuzzer_sys::fuzz_target;

use lens_discovery::{ProjectRoot, TestParser};
use lens_naming::TestDefinition;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    let parser = TestParser::new(ProjectRoot::new("/srv/app"));
    let mut tests: Vec<TestDefinition> = Vec::new();

    // Discovery should never panic, only return errors
    if parser
        .parse(source, "/srv/app/tests/Unit/FuzzTest.php", &mut tests)
        .is_ok()
    {
        for test in &tests {
            assert!((1..=3).contains(&test.depth));
        }
    }
});
