// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! lens-naming: Test id and label normalization for phpunit-lens
//!
//! This library crate turns raw PHP test metadata (namespaces, class names,
//! method names, testdox annotations, Pest descriptions) into stable ids and
//! presentation labels. It is shared by the TeamCity decoder and the source
//! discoverer so both sides agree on the same re-run keys.

#![warn(missing_docs)]

//! # Example
//!
//! ```
//! use lens_naming::{NameParts, generate_unique_id};
//!
//! let id = generate_unique_id(&NameParts::method("P\\Tests\\Unit\\ExampleTest", "example"));
//! assert_eq!(id, "tests/Unit/ExampleTest.php::example");
//! ```

pub mod case;
pub mod converter;
pub mod definition;
pub mod error;

pub use converter::{
    BDD_ROOT, BddScope, NameParts, generate_label, generate_search_text, generate_unique_id,
    is_bdd, split_dataset,
};
pub use definition::{Annotations, Position, TestDefinition, TestType};
pub use error::NamingError;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::converter::{NameParts, generate_label, generate_unique_id};
    pub use crate::definition::{Annotations, Position, TestDefinition, TestType};
    pub use crate::error::NamingError;
}
