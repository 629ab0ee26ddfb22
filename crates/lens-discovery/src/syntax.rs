// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Syntax capability consumed by the test parser
//!
//! The parser never looks at raw PHP. It walks a small owned tree of
//! [`SyntaxNode`]s that only keeps the node kinds test discovery cares about:
//! namespaces, classes, methods and function calls. Everything else is
//! transparent, its interesting descendants are hoisted into the nearest kept
//! ancestor.
//!
//! [`TreeSitterPhp`] produces that tree from source with `tree-sitter-php`.

use lens_naming::Position;
use tracing::trace;
use tree_sitter::{Language, Node, Parser};

use crate::error::DiscoveryError;

/// The node kinds test discovery dispatches on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The whole file
    Program,
    /// `namespace A\B;` or `namespace A\B { ... }`
    Namespace {
        /// Namespace name without a leading backslash
        name: String,
    },
    /// A named class declaration
    Class {
        /// Short class name
        name: String,
        /// Parent class as written, without a leading backslash
        extends: Option<String>,
        /// Declared `abstract`
        is_abstract: bool,
    },
    /// A method inside a class body
    Method {
        /// Method name
        name: String,
        /// `public` or without a visibility modifier
        is_public: bool,
        /// Declared `static`
        is_static: bool,
        /// Declared `abstract`
        is_abstract: bool,
    },
    /// A plain function call such as `it('works', fn () => ...)`
    Call {
        /// Called function, last namespace segment only
        callee: String,
        /// The first argument when it is a string literal
        label: Option<String>,
    },
}

/// An owned node of the reduced syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// What the node is
    pub kind: NodeKind,
    /// Start of the node
    pub start: Position,
    /// End of the node
    pub end: Position,
    /// The `/** ... */` comment directly above a class or method
    pub doc_comment: Option<String>,
    /// PHP 8 attributes of a class or method, as written inside `#[...]`
    pub attributes: Vec<String>,
    /// Kept descendants, in source order
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Create a node without comment, attributes or children
    #[must_use]
    pub fn new(kind: NodeKind, start: Position, end: Position) -> Self {
        Self {
            kind,
            start,
            end,
            doc_comment: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a child node
    #[must_use]
    pub fn with_child(mut self, child: SyntaxNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Something that can turn PHP source into a reduced syntax tree
pub trait SyntaxProvider {
    /// Parse `source`, read from `path`, into a tree rooted at a
    /// [`NodeKind::Program`] node.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::Syntax` for invalid source.
    fn parse(&self, source: &str, path: &str) -> Result<SyntaxNode, DiscoveryError>;
}

/// [`SyntaxProvider`] backed by the tree-sitter PHP grammar
///
/// A fresh `tree_sitter::Parser` is created per call, so one instance can be
/// shared between threads.
#[derive(Debug, Clone)]
pub struct TreeSitterPhp {
    language: Language,
}

impl Default for TreeSitterPhp {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeSitterPhp {
    /// Create a provider for `<?php` files
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_php::LANGUAGE_PHP.into(),
        }
    }

    fn make_parser(&self) -> Result<Parser, DiscoveryError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }
}

impl SyntaxProvider for TreeSitterPhp {
    fn parse(&self, source: &str, path: &str) -> Result<SyntaxNode, DiscoveryError> {
        let mut parser = self.make_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| DiscoveryError::ParseAborted {
                path: path.to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            let at = first_error(root).unwrap_or(root).start_position();
            return Err(DiscoveryError::Syntax {
                path: path.to_string(),
                line: at.row + 1,
                column: at.column,
            });
        }

        let lowering = Lowering {
            source: source.as_bytes(),
        };
        Ok(lowering.program(root))
    }
}

/// Depth-first search for the first error or missing node
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn position(point: tree_sitter::Point) -> Position {
    Position::new(point.row + 1, point.column)
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Lowers a tree-sitter tree into [`SyntaxNode`]s
struct Lowering<'s> {
    source: &'s [u8],
}

impl Lowering<'_> {
    fn text(&self, node: Node<'_>) -> String {
        node.utf8_text(self.source).unwrap_or_default().to_string()
    }

    fn node(&self, kind: NodeKind, node: Node<'_>) -> SyntaxNode {
        SyntaxNode::new(
            kind,
            position(node.start_position()),
            position(node.end_position()),
        )
    }

    /// The program node, with statement-form namespaces owning the
    /// statements that follow them.
    fn program(&self, root: Node<'_>) -> SyntaxNode {
        let mut program = self.node(NodeKind::Program, root);
        let mut open_namespace: Option<SyntaxNode> = None;

        for child in named_children(root) {
            if child.kind() == "namespace_definition" && child.child_by_field_name("body").is_none()
            {
                if let Some(namespace) = open_namespace.take() {
                    program.children.push(namespace);
                }
                open_namespace = Some(self.node(self.namespace_kind(child), child));
                continue;
            }

            match open_namespace.as_mut() {
                Some(namespace) => {
                    self.lower(child, &mut namespace.children);
                    namespace.end = position(child.end_position());
                }
                None => self.lower(child, &mut program.children),
            }
        }

        program.children.extend(open_namespace);
        program
    }

    fn lower(&self, node: Node<'_>, out: &mut Vec<SyntaxNode>) {
        match node.kind() {
            "namespace_definition" => {
                let mut namespace = self.node(self.namespace_kind(node), node);
                if let Some(body) = node.child_by_field_name("body") {
                    self.lower_children(body, &mut namespace.children);
                }
                out.push(namespace);
            }
            "class_declaration" => out.push(self.class(node)),
            "method_declaration" => out.push(self.method(node)),
            "function_call_expression" => out.push(self.call(node)),
            // Helper functions and comments never hold tests
            "function_definition" | "comment" | "attribute_list" => {}
            _ => self.lower_children(node, out),
        }
    }

    fn lower_children(&self, node: Node<'_>, out: &mut Vec<SyntaxNode>) {
        for child in named_children(node) {
            self.lower(child, out);
        }
    }

    fn namespace_kind(&self, node: Node<'_>) -> NodeKind {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default();
        NodeKind::Namespace {
            name: name.trim_start_matches('\\').to_string(),
        }
    }

    fn class(&self, node: Node<'_>) -> SyntaxNode {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default();
        let parts = children(node);
        let extends = parts
            .iter()
            .find(|c| c.kind() == "base_clause")
            .and_then(|base| named_children(*base).into_iter().next())
            .map(|parent| self.text(parent).trim_start_matches('\\').to_string());
        let is_abstract = parts.iter().any(|c| c.kind() == "abstract_modifier");

        let mut class = self.node(
            NodeKind::Class {
                name,
                extends,
                is_abstract,
            },
            node,
        );
        class.doc_comment = self.doc_comment(node);
        class.attributes = self.attributes(node);
        if let Some(body) = node.child_by_field_name("body") {
            self.lower_children(body, &mut class.children);
        }
        trace!(kind = ?class.kind, methods = class.children.len(), "lowered class");
        class
    }

    fn method(&self, node: Node<'_>) -> SyntaxNode {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default();
        let parts = children(node);
        let is_public = parts
            .iter()
            .find(|c| c.kind() == "visibility_modifier")
            .is_none_or(|v| self.text(*v).eq_ignore_ascii_case("public"));
        let is_static = parts.iter().any(|c| c.kind() == "static_modifier");
        let is_abstract = parts.iter().any(|c| c.kind() == "abstract_modifier");

        let mut method = self.node(
            NodeKind::Method {
                name,
                is_public,
                is_static,
                is_abstract,
            },
            node,
        );
        method.doc_comment = self.doc_comment(node);
        method.attributes = self.attributes(node);
        method
    }

    fn call(&self, node: Node<'_>) -> SyntaxNode {
        let callee = node
            .child_by_field_name("function")
            .map(|f| self.text(f))
            .unwrap_or_default();
        let callee = callee.rsplit('\\').next().unwrap_or_default().to_string();

        let arguments: Vec<Node<'_>> = node
            .child_by_field_name("arguments")
            .map(named_children)
            .unwrap_or_default()
            .into_iter()
            .filter(|a| a.kind() == "argument")
            .collect();
        let label = arguments
            .first()
            .and_then(|first| self.argument_value(*first))
            .and_then(|value| self.string_literal(value));

        let mut call = self.node(NodeKind::Call { callee, label }, node);
        for argument in arguments {
            self.lower_children(argument, &mut call.children);
        }
        call
    }

    /// The value of an argument, skipping a `name:` label
    fn argument_value<'t>(&self, argument: Node<'t>) -> Option<Node<'t>> {
        named_children(argument)
            .into_iter()
            .rfind(|c| c.kind() != "name")
    }

    fn string_literal(&self, node: Node<'_>) -> Option<String> {
        let text = self.text(node);
        match node.kind() {
            "string" => unquote(&text, '\'').map(|s| s.replace("\\'", "'").replace("\\\\", "\\")),
            "encapsed_string" => unquote(&text, '"').map(unescape_double_quoted),
            _ => None,
        }
    }

    /// The `/** */` comment directly above `node`, skipping attribute lists
    fn doc_comment(&self, node: Node<'_>) -> Option<String> {
        let mut current = node.prev_sibling();
        while let Some(sibling) = current {
            match sibling.kind() {
                "attribute_list" => current = sibling.prev_sibling(),
                "comment" => {
                    let text = self.text(sibling);
                    return text.starts_with("/**").then_some(text);
                }
                _ => return None,
            }
        }
        None
    }

    /// Text of every `attribute` inside the node's attribute lists
    fn attributes(&self, node: Node<'_>) -> Vec<String> {
        let mut found = Vec::new();
        for list in children(node)
            .into_iter()
            .filter(|c| c.kind() == "attribute_list")
        {
            self.collect_attributes(list, &mut found);
        }
        found
    }

    fn collect_attributes(&self, node: Node<'_>, found: &mut Vec<String>) {
        for child in named_children(node) {
            if child.kind() == "attribute" {
                found.push(self.text(child));
            } else {
                self.collect_attributes(child, found);
            }
        }
    }
}

/// Strip a leading `b` prefix and matching quotes
fn unquote(text: &str, quote: char) -> Option<&str> {
    let text = text.strip_prefix(['b', 'B']).unwrap_or(text);
    text.strip_prefix(quote)?.strip_suffix(quote)
}

fn unescape_double_quoted(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(escaped @ ('"' | '\\' | '$')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn parse(source: &str) -> SyntaxNode {
        TreeSitterPhp::new()
            .parse(source, "test.php")
            .expect("valid php")
    }

    fn kinds(nodes: &[SyntaxNode]) -> Vec<&NodeKind> {
        nodes.iter().map(|n| &n.kind).collect()
    }

    #[test]
    fn test_statement_namespace_owns_following_classes() {
        let root = parse(
            "<?php\n\nnamespace App\\Tests;\n\nuse PHPUnit\\Framework\\TestCase;\n\nclass FooTest extends TestCase\n{\n}\n",
        );
        assert_eq!(root.children.len(), 1);
        let namespace = &root.children[0];
        assert_eq!(
            namespace.kind,
            NodeKind::Namespace {
                name: "App\\Tests".to_string()
            }
        );
        assert_eq!(
            kinds(&namespace.children),
            vec![&NodeKind::Class {
                name: "FooTest".to_string(),
                extends: Some("TestCase".to_string()),
                is_abstract: false,
            }]
        );
    }

    #[test]
    fn test_braced_namespaces() {
        let root = parse("<?php\nnamespace A { class ATest {} }\nnamespace B { class BTest {} }\n");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].children.len(), 1);
    }

    #[test]
    fn test_method_modifiers_and_doc_comment() {
        let root = parse(
            r#"<?php
abstract class BaseTest
{
    /**
     * @test
     */
    public function it_works() {}

    protected static function helper() {}

    function implicit_public() {}
}
"#,
        );
        let class = &root.children[0];
        assert!(matches!(class.kind, NodeKind::Class { is_abstract: true, .. }));

        let methods = &class.children;
        assert_eq!(methods.len(), 3);
        assert_eq!(
            methods[0].kind,
            NodeKind::Method {
                name: "it_works".to_string(),
                is_public: true,
                is_static: false,
                is_abstract: false,
            }
        );
        assert!(methods[0].doc_comment.as_deref().is_some_and(|d| d.contains("@test")));
        assert_eq!(methods[0].start.line, 7);

        assert!(matches!(
            methods[1].kind,
            NodeKind::Method {
                is_public: false,
                is_static: true,
                ..
            }
        ));
        assert!(methods[1].doc_comment.is_none());
        assert!(matches!(methods[2].kind, NodeKind::Method { is_public: true, .. }));
    }

    #[test]
    fn test_attributes_are_collected() {
        let root = parse(
            r#"<?php
class CalcTest
{
    #[Test]
    #[TestDox('Adds numbers')]
    public function adds() {}
}
"#,
        );
        let method = &root.children[0].children[0];
        assert_eq!(
            method.attributes,
            vec!["Test".to_string(), "TestDox('Adds numbers')".to_string()]
        );
    }

    #[test]
    fn test_calls_keep_closure_bodies_as_children() {
        let root = parse(
            r#"<?php
describe('math', function () {
    it("adds \"two\"", fn () => expect(1 + 1)->toBe(2));
});
"#,
        );
        let describe = &root.children[0];
        assert_eq!(
            describe.kind,
            NodeKind::Call {
                callee: "describe".to_string(),
                label: Some("math".to_string()),
            }
        );
        assert_eq!(
            describe.children[0].kind,
            NodeKind::Call {
                callee: "it".to_string(),
                label: Some("adds \"two\"".to_string()),
            }
        );
    }

    #[test]
    fn test_member_call_chain_is_transparent() {
        let root = parse("<?php\nit('example 2')->assertTrue(true);\n");
        assert_eq!(
            root.children[0].kind,
            NodeKind::Call {
                callee: "it".to_string(),
                label: Some("example 2".to_string()),
            }
        );
    }

    #[test]
    fn test_function_bodies_are_skipped() {
        let root = parse("<?php\nfunction helper() { test('hidden', fn () => 1); }\n");
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_syntax_error_position() {
        let err = TreeSitterPhp::new()
            .parse("<?php\n\nclass {\n", "broken.php")
            .expect_err("invalid php");
        match err {
            DiscoveryError::Syntax { path, line, .. } => {
                assert_eq!(path, "broken.php");
                assert!(line >= 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unescape_double_quoted() {
        assert_eq!(unescape_double_quoted(r#"a \"b\" \$c\n"#), "a \"b\" $c\n");
        assert_eq!(unescape_double_quoted(r"keep \d"), r"keep \d");
    }
}
