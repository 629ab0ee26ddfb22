// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Project-relative path rendering

use std::path::{Path, PathBuf};

/// Renders file paths relative to the project root
pub trait PathResolver {
    /// `/srv/app/tests/Unit/ExampleTest.php` -> `tests/Unit/ExampleTest.php`
    fn to_relative(&self, path: &str) -> String;
}

impl<F> PathResolver for F
where
    F: Fn(&str) -> String,
{
    fn to_relative(&self, path: &str) -> String {
        self(path)
    }
}

/// A [`PathResolver`] rooted at a project directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    root: PathBuf,
}

impl ProjectRoot {
    /// Create a resolver for the given root
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The project root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PathResolver for ProjectRoot {
    /// Paths outside the root are returned unchanged apart from separator
    /// normalization.
    fn to_relative(&self, path: &str) -> String {
        let path = normalize(path);
        let root = normalize(&self.root.to_string_lossy());
        let root = root.trim_end_matches('/');

        match path.strip_prefix(root) {
            Some(rest) if root.is_empty() || rest.starts_with('/') => {
                rest.trim_start_matches('/').to_string()
            }
            _ => path.trim_start_matches("./").to_string(),
        }
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}
