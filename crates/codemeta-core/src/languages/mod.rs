//! Language adapter trait, registry and shared tree-walking helpers.
//!
//! Every adapter is a pure function of `(source_text, file_path)`: it parses
//! the text with its tree-sitter grammar and threads a [`Namespace`] builder
//! through the walk.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::{Language as Grammar, Node, Parser, Tree};

use crate::config::Language;
use crate::error::{AnalysisError, Result};
use crate::metadata::Namespace;

pub mod java;
pub mod kotlin;
pub mod php;
pub mod python;

/// Trait that all language adapters implement.
pub trait LanguageAdapter: Send + Sync {
    /// The language this adapter handles.
    fn language(&self) -> Language;

    /// Get the tree-sitter grammar for parsing.
    fn grammar(&self) -> Grammar;

    /// Walk a parsed tree into a namespace fragment.
    fn extract(&self, tree: &Tree, source: &[u8], file_path: &str) -> Result<Namespace>;

    /// Parse one file's text and extract its namespace fragment.
    fn parse_source(&self, source_text: &str, file_path: &str) -> Result<Namespace> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.grammar())
            .map_err(|e| AnalysisError::ParseFailure {
                path: file_path.to_string(),
                message: format!("cannot load {} grammar: {e}", self.language().display_name()),
            })?;
        let tree = parser
            .parse(source_text, None)
            .ok_or_else(|| AnalysisError::ParseFailure {
                path: file_path.to_string(),
                message: "parser produced no syntax tree".to_string(),
            })?;
        if tree.root_node().has_error() {
            log::debug!("{file_path}: syntax errors present, extracting what parsed");
        }
        self.extract(&tree, source_text.as_bytes(), file_path)
    }
}

/// Registry of the closed set of language adapters.
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    /// Build the registry with all language adapters, in `Language::ALL` order.
    pub fn new() -> Self {
        let adapters: Vec<Box<dyn LanguageAdapter>> = vec![
            Box::new(java::JavaAdapter::new()),
            Box::new(kotlin::KotlinAdapter::new()),
            Box::new(php::PhpAdapter::new()),
            Box::new(python::PythonAdapter::new()),
        ];
        Self { adapters }
    }

    /// Get the adapter for a language.
    pub fn get(&self, language: Language) -> &dyn LanguageAdapter {
        self.adapters[language as usize].as_ref()
    }

    /// Look up an adapter by language identifier.
    pub fn for_identifier(&self, id: &str) -> Result<&dyn LanguageAdapter> {
        Language::from_identifier(id).map(|l| self.get(l))
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `source_text` with the adapter selected by a language identifier.
pub fn parse_source(language: &str, source_text: &str, file_path: &str) -> Result<Namespace> {
    AdapterRegistry::new()
        .for_identifier(language)?
        .parse_source(source_text, file_path)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

static MARKER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[@#]\[?\s*([A-Za-z_][A-Za-z0-9_]*)").expect("marker regex is valid")
});

/// Name of an annotation or decorator with its sigil stripped (`@Service("x")` → `Service`).
pub(crate) fn marker_name(text: &str) -> Option<String> {
    MARKER_NAME
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub(crate) fn node_text<'s>(node: &Node, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

/// First direct child whose kind is one of `kinds`.
pub(crate) fn child_of_kind<'t>(node: &Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| kinds.contains(&c.kind()));
    found
}

/// All direct children whose kind is one of `kinds`.
pub(crate) fn children_of_kind<'t>(node: &Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .filter(|c| kinds.contains(&c.kind()))
        .collect();
    found
}

pub(crate) fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let children = node.named_children(&mut cursor).collect();
    children
}

/// The node and all of its descendants, in pre-order.
pub(crate) fn descendants<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        out.push(n);
        let mut cursor = n.walk();
        let children: Vec<Node<'t>> = n.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    out
}

/// First pre-order node (the node itself included) of the given kind.
pub(crate) fn first_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    descendants(node).into_iter().find(|n| n.kind() == kind)
}

/// Collects call sites for one method body; duplicates collapse.
#[derive(Default)]
pub(crate) struct CallSet(BTreeSet<String>);

impl CallSet {
    pub(crate) fn insert(&mut self, call: String) {
        if !call.is_empty() {
            self.0.insert(call);
        }
    }

    pub(crate) fn into_vec(self) -> Vec<String> {
        self.0.into_iter().collect()
    }
}
