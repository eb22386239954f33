//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use codemeta_core::languages::parse_source;
use codemeta_core::{ClassMetadata, Method, Namespace};

// ---------------------------------------------------------------------------
// Fixture path resolution
// ---------------------------------------------------------------------------

/// Resolve `tests/fixtures/{name}` relative to the workspace root.
pub fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .join("../../tests/fixtures")
        .join(name)
        .canonicalize()
        .unwrap_or_else(|_| {
            Path::new(manifest_dir)
                .join("../../tests/fixtures")
                .join(name)
        })
}

// ---------------------------------------------------------------------------
// Phase runners
// ---------------------------------------------------------------------------

/// Aggregate a fixture tree without resolving references.
pub fn fixture_metadata(language: &str, fixture_name: &str) -> BTreeMap<String, Namespace> {
    let root = fixture_path(fixture_name);
    codemeta_core::build_metadata(language, &root.to_string_lossy()).expect("fixture should aggregate")
}

/// Aggregate a fixture tree and run the reference resolver once.
pub fn resolved_metadata(language: &str, fixture_name: &str) -> BTreeMap<String, Namespace> {
    let mut namespaces = fixture_metadata(language, fixture_name);
    codemeta_core::resolve(&mut namespaces, "");
    namespaces
}

/// Parse one fixture file on its own, keyed by its path relative to the fixture root.
pub fn parse_fixture_file(language: &str, fixture_name: &str, relative_path: &str) -> Namespace {
    let path = fixture_path(fixture_name).join(relative_path);
    let source = std::fs::read_to_string(&path).expect("Failed to read fixture file");
    parse_source(language, &source, relative_path).expect("Failed to parse fixture file")
}

/// Write `files` into a fresh temporary directory.
pub fn temp_tree(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (rel, content) in files {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().expect("relative path has a parent")).expect("mkdir");
        std::fs::write(path, content).expect("write");
    }
    dir
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

pub fn class<'a>(namespaces: &'a BTreeMap<String, Namespace>, ns: &str, class: &str) -> &'a ClassMetadata {
    namespaces
        .get(ns)
        .unwrap_or_else(|| panic!("namespace {ns} missing"))
        .get_class(class)
        .unwrap_or_else(|| panic!("class {class} missing from {ns}"))
}

pub fn method<'a>(class: &'a ClassMetadata, name: &str) -> &'a Method {
    class
        .methods
        .iter()
        .find(|m| m.name == name)
        .unwrap_or_else(|| panic!("method {name} missing from {}", class.name))
}

pub fn method_names(class: &ClassMetadata) -> Vec<&str> {
    class.methods.iter().map(|m| m.name.as_str()).collect()
}

/// `(name, type)` pairs of a class's attributes.
pub fn attribute_pairs(class: &ClassMetadata) -> Vec<(&str, &str)> {
    class
        .attributes
        .iter()
        .map(|a| (a.name.as_str(), a.type_name.as_str()))
        .collect()
}

pub fn parameter_pairs(method: &Method) -> Vec<(&str, &str)> {
    method
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.type_name.as_str()))
        .collect()
}

pub fn imports(ns: &Namespace) -> Vec<&str> {
    ns.imports.iter().map(String::as_str).collect()
}
