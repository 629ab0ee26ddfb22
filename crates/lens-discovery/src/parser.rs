// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Static test discovery
//!
//! [`TestParser`] walks the reduced syntax tree of one PHP file and reports
//! every test it finds to a [`DefinitionSink`]. Two authoring styles are
//! recognised in the same pass:
//!
//! - PHPUnit classes: a test class inside an optional namespace, holding
//!   public test methods.
//! - Pest files: `test()`/`it()` calls, optionally nested in `describe()`
//!   blocks. The file path stands in for the namespace and class.
//!
//! Namespace and class entries are reported lazily, right before their first
//! test, so a file without tests produces nothing.
//!
//! # Example
//!
//! ```
//! use lens_discovery::{ProjectRoot, TestParser};
//! use lens_naming::TestDefinition;
//!
//! let parser = TestParser::new(ProjectRoot::new("/srv/app"));
//! let mut tests: Vec<TestDefinition> = Vec::new();
//! parser
//!     .parse(
//!         "<?php\n\ndescribe('math', function () {\n    it('adds', fn () => expect(2)->toBe(2));\n});\n",
//!         "/srv/app/tests/Unit/MathTest.php",
//!         &mut tests,
//!     )
//!     .expect("valid php");
//!
//! let method = tests.last().expect("one test");
//! assert_eq!(method.id, "tests/Unit/MathTest.php::`math` → it adds");
//! assert_eq!(method.label, "math → it adds");
//! ```

use std::collections::HashSet;
use std::path::Path;

use lens_naming::{
    Annotations, BddScope, NameParts, TestDefinition, TestType, generate_label,
    generate_unique_id,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::annotations;
use crate::error::DiscoveryError;
use crate::resolver::PathResolver;
use crate::syntax::{NodeKind, SyntaxNode, SyntaxProvider, TreeSitterPhp};

/// Separator between `describe()` frames in compound names
const FRAME_SEPARATOR: &str = " → ";

/// Receives discovered definitions, one callback per tier
///
/// Every callback defaults to a no-op, so a sink only interested in runnable
/// tests implements [`DefinitionSink::method`] alone.
pub trait DefinitionSink {
    /// A namespace entry (depth 1)
    fn namespace(&mut self, definition: TestDefinition) {
        let _ = definition;
    }

    /// A class entry (depth 2)
    fn class(&mut self, definition: TestDefinition) {
        let _ = definition;
    }

    /// A method entry (depth 3)
    fn method(&mut self, definition: TestDefinition) {
        let _ = definition;
    }
}

impl DefinitionSink for Vec<TestDefinition> {
    fn namespace(&mut self, definition: TestDefinition) {
        self.push(definition);
    }

    fn class(&mut self, definition: TestDefinition) {
        self.push(definition);
    }

    fn method(&mut self, definition: TestDefinition) {
        self.push(definition);
    }
}

/// What makes a class or method a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestParserOptions {
    /// Class name suffixes marking a test class
    pub class_suffixes: Vec<String>,
    /// Parent classes marking a test class, short or fully qualified
    pub base_classes: Vec<String>,
    /// Method name prefix marking a test method
    pub method_prefix: String,
}

impl Default for TestParserOptions {
    fn default() -> Self {
        Self {
            class_suffixes: vec!["Test".to_string()],
            base_classes: vec![
                "TestCase".to_string(),
                "PHPUnit\\Framework\\TestCase".to_string(),
            ],
            method_prefix: "test".to_string(),
        }
    }
}

impl TestParserOptions {
    fn is_test_class(&self, name: &str, extends: Option<&str>, annotations: &Annotations) -> bool {
        self.class_suffixes.iter().any(|s| name.ends_with(s.as_str()))
            || extends.is_some_and(|parent| self.extends_base(parent))
            || !annotations.is_empty()
    }

    /// `Foo\TestCase` matches both `TestCase` and `Foo\TestCase`
    fn extends_base(&self, parent: &str) -> bool {
        let parent = parent.trim_start_matches('\\');
        let short = parent.rsplit('\\').next().unwrap_or(parent);
        self.base_classes.iter().any(|base| {
            let base = base.trim_start_matches('\\');
            base == parent || base == short
        })
    }

    fn is_test_method(&self, name: &str, annotations: &Annotations) -> bool {
        name.starts_with(self.method_prefix.as_str())
            || annotations.test
            || !annotations.testdox.is_empty()
    }
}

/// Discovers tests in PHP source
#[derive(Debug, Clone)]
pub struct TestParser<R, S = TreeSitterPhp> {
    resolver: R,
    provider: S,
    options: TestParserOptions,
}

impl<R: PathResolver> TestParser<R> {
    /// Create a parser backed by the tree-sitter PHP grammar
    #[must_use]
    pub fn new(resolver: R) -> Self {
        Self::with_provider(resolver, TreeSitterPhp::new())
    }
}

impl<R: PathResolver, S: SyntaxProvider> TestParser<R, S> {
    /// Create a parser backed by any syntax provider
    #[must_use]
    pub fn with_provider(resolver: R, provider: S) -> Self {
        Self {
            resolver,
            provider,
            options: TestParserOptions::default(),
        }
    }

    /// Replace the test predicates
    #[must_use]
    pub fn with_options(mut self, options: TestParserOptions) -> Self {
        self.options = options;
        self
    }

    /// The active test predicates
    #[must_use]
    pub fn options(&self) -> &TestParserOptions {
        &self.options
    }

    /// Discover the tests in `source`, read from `file`.
    ///
    /// Definitions are handed to `sink` in source order. Nothing is reported
    /// for a file without tests.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::Syntax` if the source does not parse, or
    /// `DiscoveryError::Naming` if a Pest file path has no file name.
    pub fn parse<K>(&self, source: &str, file: &str, sink: &mut K) -> Result<(), DiscoveryError>
    where
        K: DefinitionSink + ?Sized,
    {
        let root = self.provider.parse(source, file)?;
        let mut walk = Walk {
            options: &self.options,
            file,
            sink,
            namespaces: HashSet::new(),
            emitted: 0,
        };

        walk.classes(&root.children, None);

        let mut bdd = BddFile {
            root: &root,
            relative: self.resolver.to_relative(file),
            scope: None,
            reported: false,
        };
        walk.calls(&root.children, &mut Vec::new(), &mut bdd)?;

        debug!(file, tests = walk.emitted, "parsed test file");
        Ok(())
    }

    /// Read `path` and discover its tests
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::Io` if the file cannot be read, plus
    /// everything [`TestParser::parse`] returns.
    pub fn parse_file<K>(&self, path: impl AsRef<Path>, sink: &mut K) -> Result<(), DiscoveryError>
    where
        K: DefinitionSink + ?Sized,
    {
        let path = path.as_ref();
        let file = path.to_string_lossy();
        let source = std::fs::read_to_string(path).map_err(|source| DiscoveryError::Io {
            path: file.to_string(),
            source,
        })?;
        self.parse(&source, &file, sink)
    }
}

/// The synthetic namespace and class of a Pest file, resolved on first use
struct BddFile<'a> {
    root: &'a SyntaxNode,
    relative: String,
    scope: Option<BddScope>,
    reported: bool,
}

impl BddFile<'_> {
    fn scope(&mut self) -> Result<&BddScope, DiscoveryError> {
        let scope = match self.scope.take() {
            Some(scope) => scope,
            None => BddScope::from_relative_path(&self.relative)?,
        };
        Ok(self.scope.insert(scope))
    }
}

/// Per-file walk state
struct Walk<'a, K: ?Sized> {
    options: &'a TestParserOptions,
    file: &'a str,
    sink: &'a mut K,
    namespaces: HashSet<String>,
    emitted: usize,
}

impl<K: DefinitionSink + ?Sized> Walk<'_, K> {
    /// Class-based pass
    fn classes(&mut self, nodes: &[SyntaxNode], namespace: Option<&str>) {
        for node in nodes {
            match &node.kind {
                NodeKind::Namespace { name } => self.classes(&node.children, Some(name)),
                NodeKind::Class { .. } => self.class(node, namespace),
                _ => {}
            }
        }
    }

    fn class(&mut self, node: &SyntaxNode, namespace: Option<&str>) {
        let NodeKind::Class {
            name,
            extends,
            is_abstract,
        } = &node.kind
        else {
            return;
        };
        if *is_abstract {
            return;
        }

        let class_annotations = annotations::collect(node.doc_comment.as_deref(), &node.attributes);
        if !self
            .options
            .is_test_class(name, extends.as_deref(), &class_annotations)
        {
            return;
        }

        let namespace = namespace.filter(|ns| !ns.is_empty());
        let class_fqn = match namespace {
            Some(ns) => format!("{ns}\\{name}"),
            None => name.clone(),
        };
        let mut class_reported = false;

        for method in &node.children {
            let NodeKind::Method {
                name: method_name,
                is_public,
                is_static,
                is_abstract,
            } = &method.kind
            else {
                continue;
            };
            if !is_public || *is_static || *is_abstract {
                continue;
            }

            let method_annotations =
                annotations::collect(method.doc_comment.as_deref(), &method.attributes);
            if !self.options.is_test_method(method_name, &method_annotations) {
                continue;
            }

            if !class_reported {
                if let Some(ns) = namespace {
                    self.namespace(ns);
                }
                let parts = NameParts::class(&class_fqn)
                    .with_class_name(name)
                    .with_annotations(&class_annotations);
                self.sink.class(TestDefinition {
                    test_type: TestType::Class,
                    id: generate_unique_id(&parts),
                    class_fqn: class_fqn.clone(),
                    namespace: namespace.unwrap_or_default().to_string(),
                    class_name: Some(name.clone()),
                    method_name: None,
                    label: generate_label(&parts),
                    file: Some(self.file.to_string()),
                    start: Some(node.start),
                    end: Some(node.end),
                    depth: TestType::Class.depth(),
                    annotations: non_empty(class_annotations.clone()),
                });
                class_reported = true;
            }

            let parts = NameParts::method(&class_fqn, method_name)
                .with_class_name(name)
                .with_annotations(&method_annotations);
            let definition = TestDefinition {
                test_type: TestType::Method,
                id: generate_unique_id(&parts),
                class_fqn: class_fqn.clone(),
                namespace: namespace.unwrap_or_default().to_string(),
                class_name: Some(name.clone()),
                method_name: Some(method_name.clone()),
                label: generate_label(&parts),
                file: Some(self.file.to_string()),
                start: Some(method.start),
                end: Some(method.end),
                depth: TestType::Method.depth(),
                annotations: non_empty(method_annotations),
            };
            self.method(definition);
        }
    }

    /// Report a namespace entry once per file
    fn namespace(&mut self, namespace: &str) {
        if !self.namespaces.insert(namespace.to_string()) {
            return;
        }
        let parts = NameParts::namespace(namespace);
        self.sink.namespace(TestDefinition {
            test_type: TestType::Namespace,
            id: generate_unique_id(&parts),
            class_fqn: namespace.to_string(),
            namespace: namespace.to_string(),
            class_name: None,
            method_name: None,
            label: generate_label(&parts),
            file: None,
            start: None,
            end: None,
            depth: TestType::Namespace.depth(),
            annotations: None,
        });
    }

    fn method(&mut self, definition: TestDefinition) {
        trace!(id = %definition.id, "discovered test");
        self.emitted += 1;
        self.sink.method(definition);
    }

    /// BDD pass. `frames` holds the labels of the enclosing `describe()` calls.
    fn calls(
        &mut self,
        nodes: &[SyntaxNode],
        frames: &mut Vec<String>,
        bdd: &mut BddFile<'_>,
    ) -> Result<(), DiscoveryError> {
        for node in nodes {
            match &node.kind {
                NodeKind::Namespace { .. } if frames.is_empty() => {
                    self.calls(&node.children, frames, bdd)?;
                }
                NodeKind::Call {
                    callee,
                    label: Some(label),
                } => match callee.as_str() {
                    "describe" => {
                        frames.push(label.clone());
                        let result = self.calls(&node.children, frames, bdd);
                        frames.pop();
                        result?;
                    }
                    "test" | "it" => self.bdd_test(node, callee, label, frames, bdd)?,
                    _ => {}
                },
                _ => {}
            }
        }
        Ok(())
    }

    fn bdd_test(
        &mut self,
        node: &SyntaxNode,
        callee: &str,
        label: &str,
        frames: &[String],
        bdd: &mut BddFile<'_>,
    ) -> Result<(), DiscoveryError> {
        let root = bdd.root;
        let scope = bdd.scope()?.clone();

        if !bdd.reported {
            if let Some(ns) = scope.namespace.as_deref() {
                self.namespace(ns);
            }
            let parts = NameParts::class(&scope.class_fqn).with_class_name(&scope.class_name);
            self.sink.class(TestDefinition {
                test_type: TestType::Class,
                id: generate_unique_id(&parts),
                class_fqn: scope.class_fqn.clone(),
                namespace: scope.namespace.clone().unwrap_or_default(),
                class_name: Some(scope.class_name.clone()),
                method_name: None,
                label: generate_label(&parts),
                file: Some(self.file.to_string()),
                start: Some(root.start),
                end: Some(root.end),
                depth: TestType::Class.depth(),
                annotations: None,
            });
            bdd.reported = true;
        }

        let method_name = compound_name(frames, callee, label);
        let parts = NameParts::method(&scope.class_fqn, &method_name).with_class_name(&scope.class_name);
        let definition = TestDefinition {
            test_type: TestType::Method,
            id: generate_unique_id(&parts),
            class_fqn: scope.class_fqn.clone(),
            namespace: scope.namespace.clone().unwrap_or_default(),
            class_name: Some(scope.class_name.clone()),
            method_name: Some(method_name.clone()),
            label: generate_label(&parts),
            file: Some(self.file.to_string()),
            start: Some(node.start),
            end: Some(node.end),
            depth: TestType::Method.depth(),
            annotations: None,
        };
        self.method(definition);
        Ok(())
    }
}

/// `` `outer` → `inner` → it does things ``
fn compound_name(frames: &[String], callee: &str, label: &str) -> String {
    let mut name = String::new();
    for frame in frames {
        name.push('`');
        name.push_str(frame);
        name.push('`');
        name.push_str(FRAME_SEPARATOR);
    }
    if callee == "it" {
        name.push_str("it ");
    }
    name.push_str(label);
    name
}

fn non_empty(annotations: Annotations) -> Option<Annotations> {
    (!annotations.is_empty()).then_some(annotations)
}
