//! Kotlin language adapter.
//!
//! Primary-constructor `val`/`var` parameters and body properties become
//! attributes; companion object members fold into the enclosing class.

use tree_sitter::{Language as Grammar, Node, Tree};

use super::{
    child_of_kind, children_of_kind, descendants, marker_name, named_children, node_text, CallSet,
    LanguageAdapter,
};
use crate::config::Language;
use crate::error::Result;
use crate::metadata::{Method, Namespace, Parameter};

const TYPE_KINDS: &[&str] = &[
    "user_type",
    "nullable_type",
    "function_type",
    "type",
    "parenthesized_type",
    "non_nullable_type",
    "type_reference",
];

const BODY_KINDS: &[&str] = &["class_body", "enum_class_body"];

pub struct KotlinAdapter;

impl Default for KotlinAdapter {
    fn default() -> Self {
        Self
    }
}

impl KotlinAdapter {
    pub fn new() -> Self {
        Self
    }

    fn walk_node(&self, node: &Node, source: &[u8], file_path: &str, ns: &mut Namespace) -> Result<()> {
        match node.kind() {
            "package_header" => {
                if let Some(name) = child_of_kind(node, &["qualified_identifier", "identifier"]) {
                    ns.name = node_text(&name, source).to_string();
                }
            }
            "import" | "import_header" => {
                if let Some(path) = child_of_kind(node, &["qualified_identifier", "identifier"]) {
                    let path = node_text(&path, source);
                    let wildcard = child_of_kind(node, &["*", "wildcard_import"]).is_some()
                        || node_text(node, source).trim_end().ends_with(".*");
                    if wildcard && !path.ends_with('*') {
                        ns.add_import(format!("{path}.*"));
                    } else {
                        ns.add_import(path);
                    }
                }
            }
            "class_declaration" | "object_declaration" => {
                self.parse_class(node, source, file_path, ns)?;
            }
            _ => {}
        }

        for child in named_children(node) {
            self.walk_node(&child, source, file_path, ns)?;
        }
        Ok(())
    }

    fn parse_class(&self, node: &Node, source: &[u8], file_path: &str, ns: &mut Namespace) -> Result<()> {
        let Some(name_node) = child_of_kind(node, &["identifier"]) else {
            return Ok(());
        };
        let class_name = node_text(&name_node, source).to_string();
        ns.add_class(&class_name, Some(file_path));

        if let Some(modifiers) = child_of_kind(node, &["modifiers"]) {
            for modifier in named_children(&modifiers) {
                let stereotype = if modifier.kind() == "annotation" {
                    marker_name(node_text(&modifier, source))
                } else {
                    Some(node_text(&modifier, source).to_string())
                };
                if let Some(stereotype) = stereotype {
                    ns.add_class_stereotype(&class_name, &stereotype)?;
                }
            }
        }

        if let Some(ctor) = child_of_kind(node, &["primary_constructor"]) {
            for param in descendants(ctor) {
                if param.kind() != "class_parameter" || !declares_property(&param) {
                    continue;
                }
                if let Some(name) = child_of_kind(&param, &["identifier"]) {
                    ns.add_class_attribute(&class_name, node_text(&name, source), &type_text(&param, source))?;
                }
            }
        }

        if let Some(body) = child_of_kind(node, BODY_KINDS) {
            self.parse_members(&class_name, &body, source, ns)?;
        }
        Ok(())
    }

    fn parse_members(&self, class_name: &str, body: &Node, source: &[u8], ns: &mut Namespace) -> Result<()> {
        for member in named_children(body) {
            match member.kind() {
                "property_declaration" => {
                    for var in children_of_kind(&member, &["variable_declaration"]) {
                        if let Some(name) = child_of_kind(&var, &["identifier"]) {
                            ns.add_class_attribute(class_name, node_text(&name, source), &type_text(&var, source))?;
                        }
                    }
                }
                "function_declaration" => {
                    if let Some(method) = self.parse_function(&member, source) {
                        ns.add_class_method(class_name, method)?;
                    }
                }
                "companion_object" => {
                    if let Some(inner) = child_of_kind(&member, &["class_body"]) {
                        self.parse_members(class_name, &inner, source, ns)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_function(&self, node: &Node, source: &[u8]) -> Option<Method> {
        let name = node_text(&child_of_kind(node, &["identifier"])?, source).to_string();

        let mut params = Vec::new();
        if let Some(list) = child_of_kind(node, &["function_value_parameters"]) {
            for param in children_of_kind(&list, &["parameter"]) {
                if let Some(id) = child_of_kind(&param, &["identifier"]) {
                    params.push(Parameter::new(node_text(&id, source), type_text(&param, source)));
                }
            }
        }

        let mut calls = CallSet::default();
        if let Some(body) = child_of_kind(node, &["function_body"]) {
            for n in descendants(body) {
                match n.kind() {
                    "call_expression" => {
                        if let Some(callee) = n.named_child(0).filter(|c| c.kind() == "identifier") {
                            calls.insert(format!("{}.constructor", node_text(&callee, source)));
                        }
                    }
                    "navigation_expression" => {
                        if let Some(call) = navigation_text(&n, source) {
                            calls.insert(call);
                        }
                    }
                    _ => {}
                }
            }
        }

        Some(Method::new(name, params, calls.into_vec()))
    }
}

/// A constructor parameter is a property only when declared with `val` or `var`.
fn declares_property(param: &Node) -> bool {
    let mut cursor = param.walk();
    let found = param
        .children(&mut cursor)
        .any(|c| matches!(c.kind(), "val" | "var" | "binding_pattern_kind"));
    found
}

fn type_text(node: &Node, source: &[u8]) -> String {
    child_of_kind(node, TYPE_KINDS)
        .map(|t| node_text(&t, source).to_string())
        .unwrap_or_default()
}

/// `recv.member` for a single hop off a plain identifier.
fn navigation_text(node: &Node, source: &[u8]) -> Option<String> {
    let receiver = node.named_child(0).filter(|c| c.kind() == "identifier")?;
    let member = children_of_kind(node, &["identifier"])
        .into_iter()
        .filter(|c| c.id() != receiver.id())
        .last()?;
    Some(format!("{}.{}", node_text(&receiver, source), node_text(&member, source)))
}

impl LanguageAdapter for KotlinAdapter {
    fn language(&self) -> Language {
        Language::Kotlin
    }

    fn grammar(&self) -> Grammar {
        tree_sitter_kotlin_ng::LANGUAGE.into()
    }

    fn extract(&self, tree: &Tree, source: &[u8], file_path: &str) -> Result<Namespace> {
        let mut ns = Namespace::default();
        self.walk_node(&tree.root_node(), source, file_path, &mut ns)?;
        Ok(ns)
    }
}
