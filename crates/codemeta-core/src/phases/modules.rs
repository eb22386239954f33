//! Phase 4: Module detection over the namespace import graph.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::graph::{modularity, Louvain, NamespaceGraph, Partitioner};
use crate::metadata::Namespace;

/// Grouping of namespaces into detected modules.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModulePartition {
    /// Dense module id → member namespaces.
    pub modules: BTreeMap<usize, BTreeSet<String>>,
    /// Modularity of the partition; 0.0 when it could not be scored.
    pub modularity: f64,
}

impl ModulePartition {
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module id holding `namespace`, if it was part of the graph.
    pub fn module_of(&self, namespace: &str) -> Option<usize> {
        self.modules
            .iter()
            .find(|(_, members)| members.contains(namespace))
            .map(|(&id, _)| id)
    }
}

/// Run the modules phase with the configured Louvain resolution.
pub fn run_modules_phase(config: &AnalysisConfig, namespaces: &BTreeMap<String, Namespace>) -> ModulePartition {
    detect_modules_with(namespaces, &Louvain::new(config.resolution))
}

/// Partition namespaces into modules with the default Louvain settings.
pub fn detect_modules(namespaces: &BTreeMap<String, Namespace>) -> ModulePartition {
    detect_modules_with(namespaces, &Louvain::default())
}

/// Partition namespaces into modules using any [`Partitioner`].
///
/// Every namespace appears in exactly one module; isolated ones form singletons.
/// Module ids are renumbered `0..k` in order of each module's smallest member name.
pub fn detect_modules_with(
    namespaces: &BTreeMap<String, Namespace>,
    partitioner: &dyn Partitioner,
) -> ModulePartition {
    let graph = NamespaceGraph::from_namespaces(namespaces);
    if graph.node_count() == 0 {
        return ModulePartition::default();
    }

    let assignment = partitioner.partition(&graph);

    // Scored at the standard resolution whatever the partitioner used.
    let score = match modularity(&graph, &assignment, 1.0) {
        Ok(q) => q,
        Err(e) => {
            log::warn!("Modularity scoring failed ({e}); recording 0.0");
            0.0
        }
    };

    // Node indices follow sorted names, so first sighting in index order is
    // also the smallest member name of each community.
    let mut dense: BTreeMap<usize, usize> = BTreeMap::new();
    let mut modules: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();
    for (node, &label) in assignment.iter().enumerate() {
        let next = dense.len();
        let id = *dense.entry(label).or_insert(next);
        modules
            .entry(id)
            .or_default()
            .insert(graph.name(NodeIndex::new(node)).to_string());
    }

    log::info!(
        "Detected {} modules over {} namespaces ({} edges), modularity {:.4}",
        modules.len(),
        graph.node_count(),
        graph.edge_count(),
        score
    );

    ModulePartition {
        modules,
        modularity: score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn namespaces(entries: &[(&str, &[&str])]) -> BTreeMap<String, Namespace> {
        entries.iter()
            .map(|(name, imports)| {
                let mut ns = Namespace::new(*name);
                ns.add_imports(imports.iter().copied());
                (name.to_string(), ns)
            })
            .collect()
    }

    fn members(partition: &ModulePartition, id: usize) -> Vec<&str> {
        partition.modules[&id].iter().map(String::as_str).collect()
    }

    #[test]
    fn mutual_importers_share_a_module_and_isolated_is_singleton() {
        let partition = detect_modules(&namespaces(&[("A", &["B.X"]), ("B", &["A.Y"]), ("C", &[])]));
        assert_eq!(partition.len(), 2);
        assert_eq!(members(&partition, 0), vec!["A", "B"]);
        assert_eq!(members(&partition, 1), vec!["C"]);
        assert_eq!(partition.module_of("C"), Some(1));
    }

    #[test]
    fn no_edges_gives_all_singletons_and_zero_modularity() {
        let partition = detect_modules(&namespaces(&[("x", &[]), ("y", &["ext.Lib"])]));
        assert_eq!(partition.len(), 2);
        assert_eq!(partition.modularity, 0.0);
    }

    #[test]
    fn empty_input_gives_empty_partition() {
        assert!(detect_modules(&BTreeMap::new()).is_empty());
    }

    struct Everything;

    impl Partitioner for Everything {
        fn partition(&self, graph: &NamespaceGraph) -> Vec<usize> {
            vec![7; graph.node_count()]
        }
    }

    #[test]
    fn custom_partitioner_ids_are_renumbered() {
        let partition = detect_modules_with(&namespaces(&[("a", &[]), ("b", &[])]), &Everything);
        assert_eq!(partition.modules.keys().copied().collect::<Vec<_>>(), vec![0]);
        assert_eq!(members(&partition, 0), vec!["a", "b"]);
    }

    #[test]
    fn every_namespace_is_placed_once() {
        let input = namespaces(&[
            ("app.api", &["app.core.Service", "app.util.Json"]),
            ("app.core", &["app.util.Json", "app.db.Repo"]),
            ("app.db", &["app.core.Entity"]),
            ("app.util", &[]),
            ("tools", &[]),
        ]);
        let partition = detect_modules(&input);
        let placed: usize = partition.modules.values().map(BTreeSet::len).sum();
        assert_eq!(placed, input.len());
        for name in input.keys() {
            assert!(partition.module_of(name).is_some());
        }
    }
}
