// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for id and label generation
//!
//! Arbitrary class and method names must never panic the converter, in
//! either the class-based or the BDD branch.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use lens_naming::{BddScope, NameParts, generate_label, generate_search_text, generate_unique_id};

#[derive(Debug, Arbitrary)]
struct Input {
    class_fqn: String,
    method_name: String,
    bdd: bool,
}

fuzz_target!(|input: Input| {
    let class_fqn = if input.bdd {
        format!("P\\{}", input.class_fqn)
    } else {
        input.class_fqn
    };

    let parts = NameParts::method(&class_fqn, &input.method_name);
    let _ = generate_unique_id(&parts);
    let _ = generate_label(&parts);
    let _ = generate_unique_id(&NameParts::class(&class_fqn));
    let _ = generate_search_text(&input.method_name);
    let _ = BddScope::from_relative_path(&input.method_name);
});
