//! Read-only query views over a resolved namespace mapping, plus the
//! source-file passthrough used by downstream consumers.

use std::collections::BTreeMap;
use std::path::{Component, Path};

use serde_json::{json, Map, Value};

use crate::metadata::Namespace;
use crate::phases::modules::{self, ModulePartition};

/// Borrowing view over the aggregated metadata.
pub struct CodeMeta<'a> {
    namespaces: &'a BTreeMap<String, Namespace>,
}

impl<'a> CodeMeta<'a> {
    pub fn new(namespaces: &'a BTreeMap<String, Namespace>) -> Self {
        Self { namespaces }
    }

    /// Overview of every namespace with comma-joined member names.
    pub fn list_namespaces(&self) -> Value {
        let mut namespaces = Map::new();
        for (ns_name, ns) in self.namespaces {
            let mut classes = Map::new();
            for (class_name, class) in &ns.classes {
                let mut stats = Map::new();
                if !class.attributes.is_empty() {
                    stats.insert(
                        "attribute_names".to_string(),
                        json!(join_names(class.attributes.iter().map(|a| a.name.as_str()))),
                    );
                }
                if !class.methods.is_empty() {
                    stats.insert(
                        "method_names".to_string(),
                        json!(join_names(class.methods.iter().map(|m| m.name.as_str()))),
                    );
                }
                if !class.stereotypes.is_empty() {
                    stats.insert("stereotypes".to_string(), json!(class.stereotypes.join(", ")));
                }
                classes.insert(class_name.clone(), Value::Object(stats));
            }
            namespaces.insert(
                ns_name.clone(),
                json!({ "imports": ns.imports, "classes": classes }),
            );
        }
        json!({
            "total_namespaces": namespaces.len(),
            "namespaces": namespaces,
        })
    }

    pub fn get_namespace_meta(&self, namespace: &str) -> Option<Value> {
        let ns = self.namespaces.get(namespace)?;
        Some(json!({
            "namespace": namespace,
            "imports": ns.imports,
            "classes": ns.classes,
        }))
    }

    /// Every known namespace whose name starts with `namespace`, excluding itself.
    ///
    /// This is a plain string prefix test: `com.acme` also matches `com.acmeutil`.
    pub fn get_children_namespaces(&self, namespace: &str) -> Vec<String> {
        self.namespaces
            .keys()
            .filter(|ns| ns.starts_with(namespace) && ns.as_str() != namespace)
            .cloned()
            .collect()
    }

    /// Metadata for each requested namespace, falling back to its children when absent.
    pub fn get_namespaces_meta(&self, namespaces: &[String]) -> Value {
        let mut response = Map::new();
        for name in namespaces {
            if let Some(meta) = self.get_namespace_meta(name) {
                response.insert(name.clone(), meta);
                continue;
            }
            for child in self.get_children_namespaces(name) {
                if let Some(meta) = self.get_namespace_meta(&child) {
                    response.insert(child, meta);
                }
            }
        }
        Value::Object(response)
    }

    /// Full class metadata grouped by namespace. Unknown names are omitted.
    pub fn get_classes_meta(&self, fully_qualified_names: &[String]) -> Value {
        let mut response = Map::new();
        for fq_name in fully_qualified_names {
            let Some((ns_name, class_name)) = fq_name.rsplit_once('.') else {
                log::debug!("Ignoring class query without a namespace: {fq_name}");
                continue;
            };
            let Some(ns) = self.namespaces.get(ns_name) else {
                continue;
            };
            let Some(class) = ns.get_class(class_name) else {
                continue;
            };

            let entry = response
                .entry(ns_name.to_string())
                .or_insert_with(|| json!({ "imports": ns.imports, "classes": {} }));
            if let Some(classes) = entry.get_mut("classes").and_then(Value::as_object_mut) {
                classes.insert(class_name.to_string(), json!(class));
            }
        }
        Value::Object(response)
    }

    pub fn detect_modules(&self) -> ModulePartition {
        modules::detect_modules(self.namespaces)
    }
}

fn join_names<'n>(names: impl Iterator<Item = &'n str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// Concatenate the contents of `paths` (relative to `root`) with a file banner each.
///
/// Files that cannot be read are logged and left out, as are absolute paths and
/// paths with `..` components, which could name files outside `root`.
pub fn read_sources(root: &Path, paths: &[String]) -> String {
    let mut out = String::new();
    for path in paths {
        if !stays_under_root(Path::new(path)) {
            log::error!("Refusing to read {path}: path must be relative to the source root");
            continue;
        }
        match std::fs::read_to_string(root.join(path)) {
            Ok(content) => {
                out.push_str(&format!("// File: {path}\n{content}\n\n"));
            }
            Err(e) => {
                log::error!("Error reading file {path}: {e}");
            }
        }
    }
    out
}

fn stays_under_root(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
