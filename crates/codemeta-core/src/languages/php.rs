//! PHP language adapter.

use tree_sitter::{Language as Grammar, Node, Tree};

use super::{child_of_kind, children_of_kind, descendants, first_of_kind, named_children, node_text, CallSet, LanguageAdapter};
use crate::config::Language;
use crate::error::Result;
use crate::metadata::{Method, Namespace, Parameter};

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "trait_declaration",
    "enum_declaration",
];

const MODIFIER_KINDS: &[&str] = &["abstract_modifier", "final_modifier", "readonly_modifier"];

const PARAMETER_KINDS: &[&str] = &["simple_parameter", "variadic_parameter", "property_promotion_parameter"];

const CALL_KINDS: &[&str] = &[
    "member_call_expression",
    "nullsafe_member_call_expression",
    "scoped_call_expression",
];

pub struct PhpAdapter;

impl Default for PhpAdapter {
    fn default() -> Self {
        Self
    }
}

impl PhpAdapter {
    pub fn new() -> Self {
        Self
    }

    fn walk_node(&self, node: &Node, source: &[u8], file_path: &str, ns: &mut Namespace) -> Result<()> {
        match node.kind() {
            "namespace_definition" => {
                if let Some(name) = node.child_by_field_name("name") {
                    ns.name = dotted(node_text(&name, source));
                }
            }
            "namespace_use_declaration" => {
                for import in use_paths(node, source) {
                    ns.add_import(import);
                }
            }
            kind if TYPE_DECLARATIONS.contains(&kind) => {
                self.parse_type(node, source, file_path, ns)?;
            }
            _ => {}
        }

        for child in named_children(node) {
            self.walk_node(&child, source, file_path, ns)?;
        }
        Ok(())
    }

    fn parse_type(&self, node: &Node, source: &[u8], file_path: &str, ns: &mut Namespace) -> Result<()> {
        let Some(name) = node.child_by_field_name("name") else {
            return Ok(());
        };
        let class_name = node_text(&name, source).to_string();
        ns.add_class(&class_name, Some(file_path));

        for child in named_children(node) {
            if MODIFIER_KINDS.contains(&child.kind()) {
                ns.add_class_stereotype(&class_name, node_text(&child, source))?;
            } else if child.kind() == "attribute_list" {
                for attribute in descendants(child).into_iter().filter(|n| n.kind() == "attribute") {
                    if let Some(attr_name) = child_of_kind(&attribute, &["qualified_name", "name"]) {
                        ns.add_class_stereotype(&class_name, last_segment(node_text(&attr_name, source)))?;
                    }
                }
            }
        }

        let Some(body) = node.child_by_field_name("body") else {
            return Ok(());
        };

        for member in named_children(&body) {
            match member.kind() {
                "property_declaration" => {
                    let type_text = member
                        .child_by_field_name("type")
                        .map(|t| node_text(&t, source))
                        .unwrap_or("");
                    for element in children_of_kind(&member, &["property_element"]) {
                        let var = element
                            .child_by_field_name("name")
                            .or_else(|| child_of_kind(&element, &["variable_name"]));
                        if let Some(var) = var {
                            ns.add_class_attribute(&class_name, &variable(node_text(&var, source)), type_text)?;
                        }
                    }
                }
                "method_declaration" => {
                    let Some(method) = self.parse_method(&member, source) else {
                        continue;
                    };
                    // Promoted constructor parameters declare properties too.
                    if method.name == "__construct" {
                        if let Some(list) = member.child_by_field_name("parameters") {
                            for promoted in children_of_kind(&list, &["property_promotion_parameter"]) {
                                if let Some(p) = parameter(&promoted, source) {
                                    ns.add_class_attribute(&class_name, &p.name, &p.type_name)?;
                                }
                            }
                        }
                    }
                    ns.add_class_method(&class_name, method)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_method(&self, node: &Node, source: &[u8]) -> Option<Method> {
        let name = node_text(&node.child_by_field_name("name")?, source).to_string();
        let params = node
            .child_by_field_name("parameters")
            .map(|list| {
                children_of_kind(&list, PARAMETER_KINDS)
                    .iter()
                    .filter_map(|p| parameter(p, source))
                    .collect()
            })
            .unwrap_or_default();

        let mut calls = CallSet::default();
        if let Some(body) = node.child_by_field_name("body") {
            for n in descendants(body) {
                if CALL_KINDS.contains(&n.kind()) {
                    if let Some(call) = call_text(&n, source) {
                        calls.insert(call);
                    }
                }
            }
        }

        Some(Method::new(name, params, calls.into_vec()))
    }
}

/// Import paths of one `use` declaration, group uses expanded against their prefix.
fn use_paths(node: &Node, source: &[u8]) -> Vec<String> {
    let mut paths = Vec::new();
    for clause in children_of_kind(node, &["namespace_use_clause"]) {
        if let Some(path) = clause.named_child(0) {
            paths.push(dotted(node_text(&path, source)));
        }
    }

    if let Some(group) = child_of_kind(node, &["namespace_use_group"]) {
        let prefix = child_of_kind(node, &["namespace_name"])
            .map(|p| dotted(node_text(&p, source)))
            .unwrap_or_default();
        for clause in children_of_kind(&group, &["namespace_use_clause", "namespace_use_group_clause"]) {
            if let Some(path) = clause.named_child(0) {
                let tail = dotted(node_text(&path, source));
                if prefix.is_empty() {
                    paths.push(tail);
                } else {
                    paths.push(format!("{prefix}.{tail}"));
                }
            }
        }
    }
    paths
}

fn parameter(node: &Node, source: &[u8]) -> Option<Parameter> {
    let name = node.child_by_field_name("name")?;
    let type_text = node
        .child_by_field_name("type")
        .map(|t| node_text(&t, source))
        .unwrap_or("");
    Some(Parameter::new(variable(node_text(&name, source)), type_text))
}

/// `recv::member` for `->`, `?->` and `::` calls.
fn call_text(node: &Node, source: &[u8]) -> Option<String> {
    let member = node_text(&node.child_by_field_name("name")?, source);
    let receiver = node
        .child_by_field_name("object")
        .or_else(|| node.child_by_field_name("scope"))?;

    let receiver_text = match receiver.kind() {
        "variable_name" => variable(node_text(&receiver, source)),
        "name" | "qualified_name" | "relative_scope" => last_segment(node_text(&receiver, source)).to_string(),
        _ => first_of_kind(receiver, "name")
            .map(|n| node_text(&n, source).to_string())
            .unwrap_or_default(),
    };
    if receiver_text.is_empty() {
        return Some(member.to_string());
    }
    Some(format!("{receiver_text}::{member}"))
}

fn dotted(path: &str) -> String {
    path.trim_start_matches('\\').replace('\\', ".")
}

fn last_segment(path: &str) -> &str {
    path.rsplit('\\').next().unwrap_or(path)
}

fn variable(text: &str) -> String {
    text.trim_start_matches('$').to_string()
}

impl LanguageAdapter for PhpAdapter {
    fn language(&self) -> Language {
        Language::Php
    }

    fn grammar(&self) -> Grammar {
        tree_sitter_php::LANGUAGE_PHP.into()
    }

    fn extract(&self, tree: &Tree, source: &[u8], file_path: &str) -> Result<Namespace> {
        let mut ns = Namespace::default();
        self.walk_node(&tree.root_node(), source, file_path, &mut ns)?;
        Ok(ns)
    }
}
