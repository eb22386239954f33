//! Python language adapter.
//!
//! Python has no package declaration, so the namespace is the dotted module
//! path of the file relative to the analysed root.

use tree_sitter::{Language as Grammar, Node, Tree};

use super::{descendants, marker_name, named_children, node_text, CallSet, LanguageAdapter};
use crate::config::Language;
use crate::error::Result;
use crate::metadata::{Method, Namespace, Parameter};

const RECEIVER_PARAMS: &[&str] = &["self", "cls"];

pub struct PythonAdapter;

impl Default for PythonAdapter {
    fn default() -> Self {
        Self
    }
}

impl PythonAdapter {
    pub fn new() -> Self {
        Self
    }

    fn walk_node(&self, node: &Node, source: &[u8], file_path: &str, ns: &mut Namespace) -> Result<()> {
        match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                for name in node.children_by_field_name("name", &mut cursor) {
                    ns.add_import(node_text(&imported_name(&name), source));
                }
            }
            "import_from_statement" => {
                self.parse_from_import(node, source, ns);
            }
            "class_definition" => {
                self.parse_class(node, source, file_path, ns)?;
            }
            _ => {}
        }

        for child in named_children(node) {
            self.walk_node(&child, source, file_path, ns)?;
        }
        Ok(())
    }

    fn parse_from_import(&self, node: &Node, source: &[u8], ns: &mut Namespace) {
        let Some(module) = node.child_by_field_name("module_name") else {
            return;
        };
        let module = node_text(&module, source);

        if named_children(node).iter().any(|c| c.kind() == "wildcard_import") {
            ns.add_import(format!("{module}.*"));
            return;
        }

        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            ns.add_import(format!("{module}.{}", node_text(&imported_name(&name), source)));
        }
    }

    fn parse_class(&self, node: &Node, source: &[u8], file_path: &str, ns: &mut Namespace) -> Result<()> {
        let Some(name) = node.child_by_field_name("name") else {
            return Ok(());
        };
        let class_name = node_text(&name, source).to_string();
        ns.add_class(&class_name, Some(file_path));

        for stereotype in decorators(node, source) {
            ns.add_class_stereotype(&class_name, &stereotype)?;
        }

        let Some(body) = node.child_by_field_name("body") else {
            return Ok(());
        };

        for stmt in named_children(&body) {
            match stmt.kind() {
                "expression_statement" => {
                    for (attr, type_text) in assignments(&stmt, source) {
                        ns.add_class_attribute(&class_name, &attr, &type_text)?;
                    }
                }
                "function_definition" | "decorated_definition" => {
                    let Some(func) = function_of(&stmt) else {
                        continue;
                    };
                    for (attr, type_text) in self_assignments(&func, source) {
                        let known = ns
                            .get_class(&class_name)
                            .is_some_and(|c| c.attributes.iter().any(|a| a.name == attr));
                        if !known {
                            ns.add_class_attribute(&class_name, &attr, &type_text)?;
                        }
                    }
                    if let Some(method) = self.parse_method(&func, source) {
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
                if n.kind() != "call" {
                    continue;
                }
                if let Some(function) = n.child_by_field_name("function") {
                    calls.insert(callee_text(&function, source));
                }
            }
        }

        Some(Method::new(name, params, calls.into_vec()))
    }
}

/// Derive the module path from a relative file path: `pkg/util.py` → `pkg.util`.
pub fn module_path(file_path: &str) -> String {
    let normalized = file_path.replace('\\', "/");
    let trimmed = normalized.strip_suffix(".py").unwrap_or(&normalized);
    let mut segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    if segments.last() == Some(&"__init__") {
        segments.pop();
    }
    segments.join(".")
}

/// `aliased_import` wraps the real dotted name.
fn imported_name<'t>(node: &Node<'t>) -> Node<'t> {
    if node.kind() == "aliased_import" {
        if let Some(inner) = node.child_by_field_name("name") {
            return inner;
        }
    }
    *node
}

/// Decorators sit on the enclosing `decorated_definition`, not the class itself.
fn decorators(node: &Node, source: &[u8]) -> Vec<String> {
    let Some(parent) = node.parent().filter(|p| p.kind() == "decorated_definition") else {
        return Vec::new();
    };
    named_children(&parent)
        .iter()
        .filter(|c| c.kind() == "decorator")
        .filter_map(|d| marker_name(node_text(d, source)))
        .collect()
}

fn function_of<'t>(stmt: &Node<'t>) -> Option<Node<'t>> {
    match stmt.kind() {
        "function_definition" => Some(*stmt),
        "decorated_definition" => stmt
            .child_by_field_name("definition")
            .filter(|d| d.kind() == "function_definition"),
        _ => None,
    }
}

/// `name = ...` / `name: T = ...` directly in a class body.
fn assignments(stmt: &Node, source: &[u8]) -> Vec<(String, String)> {
    named_children(stmt)
        .into_iter()
        .filter(|c| c.kind() == "assignment")
        .filter_map(|a| {
            let left = a.child_by_field_name("left").filter(|l| l.kind() == "identifier")?;
            Some((node_text(&left, source).to_string(), annotation(&a, source)))
        })
        .collect()
}

/// `self.name = ...` statements at the top level of a method body.
fn self_assignments(func: &Node, source: &[u8]) -> Vec<(String, String)> {
    let Some(body) = func.child_by_field_name("body") else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for stmt in named_children(&body).into_iter().filter(|s| s.kind() == "expression_statement") {
        for assignment in named_children(&stmt).into_iter().filter(|c| c.kind() == "assignment") {
            let Some(left) = assignment.child_by_field_name("left").filter(|l| l.kind() == "attribute") else {
                continue;
            };
            let is_self = left
                .child_by_field_name("object")
                .is_some_and(|o| node_text(&o, source) == "self");
            if let (true, Some(attr)) = (is_self, left.child_by_field_name("attribute")) {
                found.push((node_text(&attr, source).to_string(), annotation(&assignment, source)));
            }
        }
    }
    found
}

fn annotation(assignment: &Node, source: &[u8]) -> String {
    assignment
        .child_by_field_name("type")
        .map(|t| node_text(&t, source).to_string())
        .unwrap_or_default()
}

fn parameters(node: &Node, source: &[u8]) -> Vec<Parameter> {
    let mut params = Vec::new();
    for param in named_children(node) {
        let (name, type_text) = match param.kind() {
            "identifier" => (node_text(&param, source), ""),
            "typed_parameter" => {
                let Some(id) = named_children(&param).into_iter().find(|c| c.kind() == "identifier") else {
                    continue;
                };
                let ty = param.child_by_field_name("type").map(|t| node_text(&t, source));
                (node_text(&id, source), ty.unwrap_or(""))
            }
            "default_parameter" | "typed_default_parameter" => {
                let Some(id) = param.child_by_field_name("name") else {
                    continue;
                };
                let ty = param.child_by_field_name("type").map(|t| node_text(&t, source));
                (node_text(&id, source), ty.unwrap_or(""))
            }
            _ => continue,
        };
        if RECEIVER_PARAMS.contains(&name) {
            continue;
        }
        params.push(Parameter::new(name, type_text));
    }
    params
}

/// Plain name, or the dotted chain when it is made of identifiers only;
/// anything fancier keeps just the final attribute.
fn callee_text(function: &Node, source: &[u8]) -> String {
    match function.kind() {
        "identifier" => node_text(function, source).to_string(),
        "attribute" if is_name_chain(function) => node_text(function, source).to_string(),
        "attribute" => function
            .child_by_field_name("attribute")
            .map(|a| node_text(&a, source).to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn is_name_chain(node: &Node) -> bool {
    match node.kind() {
        "identifier" => true,
        "attribute" => node.child_by_field_name("object").is_some_and(|o| is_name_chain(&o)),
        _ => false,
    }
}

impl LanguageAdapter for PythonAdapter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn grammar(&self) -> Grammar {
        tree_sitter_python::LANGUAGE.into()
    }

    fn extract(&self, tree: &Tree, source: &[u8], file_path: &str) -> Result<Namespace> {
        let mut ns = Namespace::new(module_path(file_path));
        self.walk_node(&tree.root_node(), source, file_path, &mut ns)?;
        Ok(ns)
    }
}
