// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! `locationHint` and `details` decoding
//!
//! PHPUnit hints look like `php_qn://<file>::\<Class\FQN>[::<method>]`; Pest
//! emits `pest_qn://<relative file>[::<description>]`. The hint is the only
//! place a TeamCity event names its source entity, so ids are derived here.

use lens_naming::{BddScope, NameParts, generate_label, generate_unique_id, split_dataset};
use tracing::trace;

use crate::result::{Location, TestResult};

const PHP_QN: &str = "php_qn://";
const PEST_QN: &str = "pest_qn://";
const FILE_URI: &str = "file://";

/// The source entity a `locationHint` points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationHint {
    /// File path as printed by the runner
    pub file: String,
    /// Class FQN without a leading backslash (`P\` prefixed for Pest)
    pub class_fqn: Option<String>,
    /// Method name or Pest description, dataset suffix included
    pub method_name: Option<String>,
}

impl LocationHint {
    /// Parse a `locationHint` attribute value
    #[must_use]
    pub fn parse(hint: &str) -> Option<Self> {
        if let Some(rest) = hint.strip_prefix(PHP_QN) {
            let mut parts = rest.splitn(3, "::");
            let file = parts.next()?.to_string();
            let class_fqn = parts
                .next()
                .map(|c| c.trim_start_matches('\\').to_string())
                .filter(|c| !c.is_empty());
            let method_name = parts.next().map(str::to_string);
            return Some(Self {
                file,
                class_fqn,
                method_name,
            });
        }

        if let Some(rest) = hint.strip_prefix(PEST_QN) {
            let (file, method_name) = match rest.split_once("::") {
                Some((file, description)) => (file, Some(description.to_string())),
                None => (rest, None),
            };
            let class_fqn = BddScope::from_relative_path(file)
                .ok()
                .map(|scope| scope.class_fqn);
            return Some(Self {
                file: file.to_string(),
                class_fqn,
                method_name,
            });
        }

        hint.strip_prefix(FILE_URI).map(|file| Self {
            file: file.to_string(),
            class_fqn: None,
            method_name: None,
        })
    }

    /// Fill `file`, `id`, `testId` and `label` of a record from this hint
    pub fn enrich(&self, result: &mut TestResult) {
        result.file = Some(self.file.clone());

        let Some(class_fqn) = self.class_fqn.as_deref() else {
            return;
        };

        match self.method_name.as_deref() {
            Some(method) => {
                let parts = NameParts::method(class_fqn, method);
                let (base, _) = split_dataset(method);
                result.id = Some(generate_unique_id(&parts));
                result.test_id = Some(generate_unique_id(&NameParts::method(class_fqn, base)));
                result.label = Some(generate_label(&parts));
            }
            None => {
                let short = class_fqn.rsplit('\\').next().unwrap_or(class_fqn);
                let parts = NameParts::class(class_fqn).with_class_name(short);
                let id = generate_unique_id(&parts);
                result.test_id = Some(id.clone());
                result.id = Some(id);
                result.label = Some(generate_label(&parts));
            }
        }
        trace!(id = ?result.id, "enriched from locationHint");
    }
}

/// Parse a `details` stack: one `path:line` per line, blank entries skipped.
/// Entries without a numeric line are dropped.
#[must_use]
pub fn parse_details(details: &str) -> Vec<Location> {
    details
        .lines()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let (file, line) = entry.rsplit_once(':')?;
            let line = line.trim().parse().ok()?;
            Some(Location {
                file: file.trim().to_string(),
                line,
            })
        })
        .collect()
}

/// Pick the primary line: the first stack entry in `file`, else the first entry
#[must_use]
pub fn primary_line(details: &[Location], file: Option<&str>) -> Option<u32> {
    file.and_then(|file| details.iter().find(|loc| same_file(&loc.file, file)))
        .or_else(|| details.first())
        .map(|loc| loc.line)
}

/// Compare paths ignoring the separator style, since Windows runners mix both
fn same_file(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.chars()
            .zip(b.chars())
            .all(|(x, y)| x == y || (matches!(x, '/' | '\\') && matches!(y, '/' | '\\')))
}
