//! Phase 3: Qualify call-site names against each namespace's imports.
//!
//! Run exactly once per dataset: qualifying already-qualified names again
//! prefixes them a second time.

use std::collections::BTreeMap;

use crate::metadata::Namespace;

/// Rewrite every invoked method in place and record raw call sites as class dependencies.
///
/// The leading identifier of an invocation (text before the first `.` or `::`)
/// is compared with the last dotted segment of each import, in sorted order.
/// The first import that matches replaces that identifier; otherwise the
/// invocation is prefixed with its own namespace name.
///
/// A match yields `<import>.<rest>` rather than `<import>.<invocation>`: with
/// `import com.acme.payments.Gateway`, `Gateway.charge` becomes
/// `com.acme.payments.Gateway.charge`, not `com.acme.payments.Gateway.Gateway.charge`.
/// The result still starts with the matched import. `root_namespace` is
/// accepted for callers that scope output by project prefix and does not
/// influence qualification.
pub fn resolve(namespaces: &mut BTreeMap<String, Namespace>, root_namespace: &str) {
    let mut resolved = 0usize;
    let mut qualified_by_import = 0usize;

    for ns in namespaces.values_mut() {
        let import_tails: Vec<(&str, &str)> = ns
            .imports
            .iter()
            .map(|import| (import.as_str(), import.rsplit('.').next().unwrap_or(import)))
            .collect();

        for class in ns.classes.values_mut() {
            let mut raw_calls = Vec::new();
            for method in &mut class.methods {
                for invocation in &mut method.invoked_methods {
                    let raw = std::mem::take(invocation);
                    *invocation = match qualify_by_import(&raw, &import_tails) {
                        Some(q) => {
                            qualified_by_import += 1;
                            q
                        }
                        None => format!("{}.{}", ns.name, raw),
                    };
                    raw_calls.push(raw);
                    resolved += 1;
                }
            }
            for raw in raw_calls {
                class.add_dependency(raw);
            }
        }
    }

    log::info!(
        "Resolved {resolved} invocations ({qualified_by_import} via imports) under root namespace '{root_namespace}'"
    );
}

/// Leading identifier segment: everything before the first `.` or `::`.
pub fn leading_segment(invocation: &str) -> &str {
    let end = [invocation.find('.'), invocation.find("::")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(invocation.len());
    &invocation[..end]
}

fn qualify_by_import(invocation: &str, import_tails: &[(&str, &str)]) -> Option<String> {
    let head = leading_segment(invocation);
    if head.is_empty() {
        return None;
    }
    import_tails
        .iter()
        .find(|(_, tail)| *tail == head)
        .map(|(import, _)| format!("{import}{}", &invocation[head.len()..]))
}
