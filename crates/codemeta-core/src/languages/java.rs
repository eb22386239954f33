//! Java language adapter.

use tree_sitter::{Language as Grammar, Node, Tree};

use super::{child_of_kind, descendants, named_children, node_text, CallSet, LanguageAdapter};
use crate::config::Language;
use crate::error::Result;
use crate::metadata::{Method, Namespace, Parameter};

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
];

/// Receivers that are recorded verbatim in front of the invoked member.
const PLAIN_RECEIVERS: &[&str] = &["identifier", "field_access", "this", "super", "scoped_identifier"];

pub struct JavaAdapter;

impl Default for JavaAdapter {
    fn default() -> Self {
        Self
    }
}

impl JavaAdapter {
    pub fn new() -> Self {
        Self
    }

    fn walk_node(&self, node: &Node, source: &[u8], file_path: &str, ns: &mut Namespace) -> Result<()> {
        match node.kind() {
            "package_declaration" => {
                if let Some(name) = child_of_kind(node, &["scoped_identifier", "identifier"]) {
                    ns.name = node_text(&name, source).to_string();
                }
            }
            "import_declaration" => {
                if let Some(path) = child_of_kind(node, &["scoped_identifier", "identifier"]) {
                    let path = node_text(&path, source);
                    if child_of_kind(node, &["asterisk"]).is_some() {
                        ns.add_import(format!("{path}.*"));
                    } else {
                        ns.add_import(path);
                    }
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
        let class_name = match node.child_by_field_name("name") {
            Some(n) => node_text(&n, source).to_string(),
            None => return Ok(()),
        };
        ns.add_class(&class_name, Some(file_path));

        for stereotype in annotations(node, source) {
            ns.add_class_stereotype(&class_name, &stereotype)?;
        }

        // Record components behave like final fields.
        if node.kind() == "record_declaration" {
            if let Some(params) = node.child_by_field_name("parameters") {
                for param in parameters(&params, source) {
                    ns.add_class_attribute(&class_name, &param.name, &param.type_name)?;
                }
            }
        }

        let body = match node.child_by_field_name("body") {
            Some(b) => b,
            None => return Ok(()),
        };

        let mut members = named_children(&body);
        // enum_body nests regular members one level deeper
        if let Some(decls) = child_of_kind(&body, &["enum_body_declarations"]) {
            members.extend(named_children(&decls));
        }

        for member in members {
            match member.kind() {
                "field_declaration" | "constant_declaration" => {
                    let type_text = member
                        .child_by_field_name("type")
                        .map(|t| node_text(&t, source))
                        .unwrap_or("");
                    let mut cursor = member.walk();
                    for decl in member.children_by_field_name("declarator", &mut cursor) {
                        if let Some(name) = decl.child_by_field_name("name") {
                            ns.add_class_attribute(&class_name, node_text(&name, source), type_text)?;
                        }
                    }
                }
                "method_declaration" | "constructor_declaration" | "compact_constructor_declaration" => {
                    if let Some(method) = self.parse_method(&member, source) {
                        ns.add_class_method(&class_name, method)?;
                    }
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
            .map(|p| parameters(&p, source))
            .unwrap_or_default();

        let mut calls = CallSet::default();
        if let Some(body) = node.child_by_field_name("body") {
            for n in descendants(body) {
                match n.kind() {
                    "method_invocation" => {
                        if let Some(call) = invocation_text(&n, source) {
                            calls.insert(call);
                        }
                    }
                    "object_creation_expression" => {
                        if let Some(ty) = n.child_by_field_name("type") {
                            calls.insert(format!("{}.constructor", strip_type_arguments(node_text(&ty, source))));
                        }
                    }
                    _ => {}
                }
            }
        }

        Some(Method::new(name, params, calls.into_vec()))
    }
}

/// Annotation names from a declaration's `modifiers`, last dotted segment only.
fn annotations(node: &Node, source: &[u8]) -> Vec<String> {
    let Some(modifiers) = child_of_kind(node, &["modifiers"]) else {
        return Vec::new();
    };
    named_children(&modifiers)
        .iter()
        .filter(|m| matches!(m.kind(), "annotation" | "marker_annotation"))
        .filter_map(|m| m.child_by_field_name("name"))
        .map(|n| {
            let text = node_text(&n, source);
            text.rsplit('.').next().unwrap_or(text).to_string()
        })
        .collect()
}

fn parameters(node: &Node, source: &[u8]) -> Vec<Parameter> {
    let mut params = Vec::new();
    for param in named_children(node) {
        match param.kind() {
            "formal_parameter" => {
                let (Some(ty), Some(name)) = (param.child_by_field_name("type"), param.child_by_field_name("name"))
                else {
                    continue;
                };
                params.push(Parameter::new(node_text(&name, source), node_text(&ty, source)));
            }
            "spread_parameter" => {
                let ty = named_children(&param)
                    .into_iter()
                    .find(|c| c.kind() != "modifiers" && c.kind() != "variable_declarator");
                let name = child_of_kind(&param, &["variable_declarator"]).and_then(|d| d.child_by_field_name("name"));
                if let (Some(ty), Some(name)) = (ty, name) {
                    params.push(Parameter::new(
                        node_text(&name, source),
                        format!("{}...", node_text(&ty, source)),
                    ));
                }
            }
            _ => {}
        }
    }
    params
}

/// `recv.member` when the receiver is a plain name chain, otherwise the bare member.
fn invocation_text(node: &Node, source: &[u8]) -> Option<String> {
    let name = node_text(&node.child_by_field_name("name")?, source);
    match node.child_by_field_name("object") {
        Some(object) if PLAIN_RECEIVERS.contains(&object.kind()) => {
            Some(format!("{}.{}", node_text(&object, source), name))
        }
        _ => Some(name.to_string()),
    }
}

fn strip_type_arguments(type_text: &str) -> &str {
    type_text.split('<').next().unwrap_or(type_text).trim()
}

impl LanguageAdapter for JavaAdapter {
    fn language(&self) -> Language {
        Language::Java
    }

    fn grammar(&self) -> Grammar {
        tree_sitter_java::LANGUAGE.into()
    }

    fn extract(&self, tree: &Tree, source: &[u8], file_path: &str) -> Result<Namespace> {
        let mut ns = Namespace::default();
        self.walk_node(&tree.root_node(), source, file_path, &mut ns)?;
        Ok(ns)
    }
}
