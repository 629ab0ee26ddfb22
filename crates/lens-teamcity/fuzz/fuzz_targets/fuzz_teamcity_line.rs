// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the TeamCity tokenizer and escaping

#![no_main]

use libfuzzer_sys::fuzz_target;

use lens_teamcity::{TeamcityMessage, escape, parse_teamcity_line, unescape};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = parse_teamcity_line(input);
        let _ = TeamcityMessage::find(input);
        let _ = unescape(input);

        assert_eq!(unescape(&escape(input)), input);
    }
});
