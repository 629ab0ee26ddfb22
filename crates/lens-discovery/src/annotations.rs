// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test annotations from doc comments and PHP 8 attributes

use std::sync::LazyLock;

use lens_naming::Annotations;
use regex::Regex;

static DOC_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(test|testdox|dataProvider|depends|group)\b[ \t]*([^\r\n]*)")
        .expect("Invalid DOC_TAG_REGEX")
});

static ATTRIBUTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^\s*\\?(?:[A-Za-z_][\w]*\\)*([A-Za-z_]\w*)\s*(?:\(\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")?)?"#)
        .expect("Invalid ATTRIBUTE_REGEX")
});

/// Read the annotations of a declaration, doc comment first, then attributes
#[must_use]
pub fn collect(doc_comment: Option<&str>, attributes: &[String]) -> Annotations {
    let mut annotations = doc_comment.map(from_doc_comment).unwrap_or_default();
    for attribute in attributes {
        annotations.merge(from_attribute(attribute));
    }
    annotations
}

/// Parse `@test`, `@testdox`, `@dataProvider`, `@depends` and `@group` tags
#[must_use]
pub fn from_doc_comment(doc_comment: &str) -> Annotations {
    let mut annotations = Annotations::default();

    for caps in DOC_TAG_REGEX.captures_iter(doc_comment) {
        let value = caps
            .get(2)
            .map(|m| m.as_str().trim_end_matches("*/").trim())
            .unwrap_or_default();
        match &caps[1] {
            "test" => annotations.test = true,
            tag => push_value(&mut annotations, tag, value),
        }
    }
    annotations
}

/// Parse one attribute such as `TestDox('Adds numbers')`
#[must_use]
pub fn from_attribute(attribute: &str) -> Annotations {
    let mut annotations = Annotations::default();
    let Some(caps) = ATTRIBUTE_REGEX.captures(attribute) else {
        return annotations;
    };

    let value = caps
        .get(2)
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().replace("\\'", "'").replace("\\\"", "\""))
        .unwrap_or_default();
    match &caps[1] {
        "Test" => annotations.test = true,
        "TestDox" => push_value(&mut annotations, "testdox", &value),
        "DataProvider" => push_value(&mut annotations, "dataProvider", &value),
        "Depends" => push_value(&mut annotations, "depends", &value),
        "Group" => push_value(&mut annotations, "group", &value),
        _ => {}
    }
    annotations
}

fn push_value(annotations: &mut Annotations, tag: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let slot = match tag {
        "testdox" => &mut annotations.testdox,
        "dataProvider" => &mut annotations.data_provider,
        "depends" => &mut annotations.depends,
        "group" => &mut annotations.group,
        _ => return,
    };
    slot.push(value.to_string());
}
