//! Aggregator integration tests: enumeration plus namespace merging.

mod common;

use common::*;
use codemeta_core::phases::parsing::merge_into;
use codemeta_core::{AnalysisError, Method, Namespace};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

#[test]
fn java_fixture_groups_files_by_package() {
    let namespaces = fixture_metadata("java", "java_simple");
    let names: Vec<_> = namespaces.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["com.acme.billing", "com.acme.payments", "com.acme.reports", "com.acme.util"]
    );

    let billing = &namespaces["com.acme.billing"];
    let classes: Vec<_> = billing.classes.keys().map(String::as_str).collect();
    assert_eq!(classes, vec!["Invoice", "LineItem"]);
    assert_eq!(
        billing.classes["LineItem"].file_path.as_deref(),
        Some("com/acme/billing/LineItem.java")
    );
}

#[test]
fn php_files_sharing_a_namespace_merge() {
    let namespaces = fixture_metadata("php", "php_simple");
    let payments = &namespaces["App.Payments"];
    let classes: Vec<_> = payments.classes.keys().map(String::as_str).collect();
    assert_eq!(classes, vec!["Auditing", "Gateway"]);
}

#[test]
fn python_package_init_yields_empty_namespace() {
    let namespaces = fixture_metadata("python", "python_simple");
    let names: Vec<_> = namespaces.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["app", "app.models", "app.repository", "app.services"]);
    assert!(namespaces["app"].classes.is_empty());
}

#[test]
fn class_keys_match_class_names() {
    for (language, fixture) in [
        ("java", "java_simple"),
        ("kotlin", "kotlin_simple"),
        ("php", "php_simple"),
        ("python", "python_simple"),
    ] {
        for (ns_name, ns) in fixture_metadata(language, fixture) {
            assert_eq!(ns.name, ns_name);
            for (key, class) in &ns.classes {
                assert_eq!(key, &class.name, "{language}: class key mismatch in {ns_name}");
            }
        }
    }
}

#[test]
fn same_class_in_two_files_keeps_both_methods() {
    let dir = temp_tree(&[
        (
            "a/Invoice.java",
            "package com.acme.billing;\nimport com.acme.payments.Gateway;\nclass Invoice { void pay() {} }\n",
        ),
        (
            "b/Invoice.java",
            "package com.acme.billing;\nimport java.util.List;\nclass Invoice { void pay() {} }\n",
        ),
    ]);

    let namespaces = codemeta_core::build_metadata("java", &dir.path().to_string_lossy()).unwrap();
    assert_eq!(namespaces.len(), 1);

    let billing = &namespaces["com.acme.billing"];
    assert_eq!(imports(billing), vec!["com.acme.payments.Gateway", "java.util.List"]);
    assert_eq!(method_names(&billing.classes["Invoice"]), vec!["pay", "pay"]);
    // The first registration wins for file_path.
    assert_eq!(billing.classes["Invoice"].file_path.as_deref(), Some("a/Invoice.java"));
}

#[test]
fn merge_order_does_not_change_content() {
    fn fragment(import: &str, class: &str, method: &str) -> Namespace {
        let mut ns = Namespace::new("com.acme");
        ns.add_import(import);
        ns.add_class(class, None);
        ns.add_class_method(class, Method::new(method, vec![], vec![])).unwrap();
        ns
    }

    let fragments = [
        fragment("a.A", "Shared", "one"),
        fragment("b.B", "Shared", "two"),
        fragment("c.C", "Other", "three"),
    ];

    let mut forward = BTreeMap::new();
    for f in fragments.iter().cloned() {
        merge_into(&mut forward, f).unwrap();
    }
    let mut backward = BTreeMap::new();
    for f in fragments.iter().rev().cloned() {
        merge_into(&mut backward, f).unwrap();
    }

    let (fwd, bwd) = (&forward["com.acme"], &backward["com.acme"]);
    assert_eq!(fwd.imports, bwd.imports);
    for (name, class) in &fwd.classes {
        let mut a = method_names(class);
        let mut b = method_names(&bwd.classes[name]);
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }
}

#[test]
fn parse_errors_in_one_file_do_not_hide_the_rest() {
    // Syntax errors are tolerated: tree-sitter still yields a tree.
    let dir = temp_tree(&[
        ("Broken.java", "package app;\nclass Broken { void run( { }\n"),
        ("Fine.java", "package app;\nclass Fine { void run() {} }\n"),
    ]);
    let namespaces = codemeta_core::build_metadata("java", &dir.path().to_string_lossy()).unwrap();
    assert!(namespaces["app"].get_class("Fine").is_some());
}

#[test]
fn missing_root_folder_is_reported() {
    let err = codemeta_core::build_metadata("python", "/definitely/not/a/real/root").unwrap_err();
    assert!(matches!(err, AnalysisError::RootFolder { .. }));
}

#[test]
fn unsupported_language_is_reported() {
    let root = fixture_path("java_simple");
    let err = codemeta_core::build_metadata("scala", &root.to_string_lossy()).unwrap_err();
    assert!(matches!(err, AnalysisError::UnsupportedLanguage { ref language } if language == "scala"));
}
