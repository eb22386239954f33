//! Undirected namespace import graph backed by petgraph::UnGraph.

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::metadata::Namespace;

/// One node per namespace, edges weighted by the number of imports linking them.
#[derive(Debug, Clone, Default)]
pub struct NamespaceGraph {
    graph: UnGraph<String, u32>,
    /// O(1) namespace name → NodeIndex lookup.
    id_index: HashMap<String, NodeIndex>,
}

impl NamespaceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from a merged namespace mapping.
    ///
    /// Nodes are inserted in sorted name order, so node indices follow name order.
    /// Each import resolves to the namespace with the longest matching dotted
    /// prefix; self matches are dropped.
    pub fn from_namespaces(namespaces: &BTreeMap<String, Namespace>) -> Self {
        let mut ng = Self::new();
        for name in namespaces.keys() {
            ng.ensure_node(name);
        }

        for (name, ns) in namespaces {
            let from = ng.id_index[name.as_str()];
            for import in &ns.imports {
                let Some(to) = ng.resolve_import(import) else {
                    continue;
                };
                if to != from {
                    ng.add_weight(from, to);
                }
            }
        }
        ng
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.id_index.get(name) {
            idx
        } else {
            let idx = self.graph.add_node(name.to_string());
            self.id_index.insert(name.to_string(), idx);
            idx
        }
    }

    fn add_weight(&mut self, a: NodeIndex, b: NodeIndex) {
        let current = self.graph.find_edge(a, b).map(|e| self.graph[e]).unwrap_or(0);
        self.graph.update_edge(a, b, current + 1);
    }

    /// Longest known namespace that is a dotted prefix of `import` (or equal to it).
    pub fn resolve_import(&self, import: &str) -> Option<NodeIndex> {
        let mut candidate = import;
        loop {
            if let Some(&idx) = self.id_index.get(candidate) {
                if !candidate.is_empty() {
                    return Some(idx);
                }
            }
            match candidate.rfind('.') {
                Some(pos) => candidate = &candidate[..pos],
                None => return None,
            }
        }
    }

    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.id_index.get(name).copied()
    }

    pub fn name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// Accumulated weight of the edge between two namespaces, if any.
    pub fn edge_weight(&self, a: &str, b: &str) -> Option<u32> {
        let (a, b) = (self.node_index(a)?, self.node_index(b)?);
        self.graph.find_edge(a, b).map(|e| self.graph[e])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> f64 {
        self.graph.edge_weights().map(|&w| f64::from(w)).sum()
    }

    /// Weighted adjacency lists indexed by node index, neighbours in index order.
    pub fn adjacency(&self) -> Vec<Vec<(usize, f64)>> {
        let mut adj = vec![Vec::new(); self.graph.node_count()];
        for edge in self.graph.edge_references() {
            let (a, b) = (edge.source().index(), edge.target().index());
            let w = f64::from(*edge.weight());
            adj[a].push((b, w));
            adj[b].push((a, w));
        }
        for neighbours in &mut adj {
            neighbours.sort_by_key(|&(n, _)| n);
        }
        adj
    }

    pub fn inner_graph(&self) -> &UnGraph<String, u32> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespaces(entries: &[(&str, &[&str])]) -> BTreeMap<String, Namespace> {
        entries.iter()
            .map(|(name, imports)| {
                let mut ns = Namespace::new(*name);
                ns.add_imports(imports.iter().copied());
                (name.to_string(), ns)
            })
            .collect()
    }

    #[test]
    fn nodes_follow_sorted_names() {
        let ng = NamespaceGraph::from_namespaces(&namespaces(&[("b", &[]), ("a", &[]), ("c", &[])]));
        let names: Vec<_> = (0..3).map(|i| ng.name(NodeIndex::new(i)).to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn longest_prefix_wins() {
        let ng = NamespaceGraph::from_namespaces(&namespaces(&[
            ("com.acme", &[]),
            ("com.acme.billing", &[]),
            ("app", &["com.acme.billing.Invoice", "com.acme.Util", "org.other.Thing"]),
        ]));
        let billing = ng.node_index("com.acme.billing");
        assert_eq!(ng.resolve_import("com.acme.billing.Invoice"), billing);
        assert_eq!(ng.resolve_import("com.acme.Util"), ng.node_index("com.acme"));
        assert_eq!(ng.resolve_import("com.acme.billing.*"), billing);
        assert_eq!(ng.resolve_import("org.other.Thing"), None);
        assert_eq!(ng.edge_weight("app", "com.acme.billing"), Some(1));
        assert_eq!(ng.edge_weight("app", "com.acme"), Some(1));
    }

    #[test]
    fn weights_accumulate_per_import_across_directions() {
        let ng = NamespaceGraph::from_namespaces(&namespaces(&[
            ("a", &["b.X", "b.Y"]),
            ("b", &["a.Z"]),
        ]));
        assert_eq!(ng.edge_count(), 1);
        assert_eq!(ng.edge_weight("a", "b"), Some(3));
        assert_eq!(ng.edge_weight("b", "a"), Some(3));
        assert_eq!(ng.total_weight(), 3.0);
    }

    #[test]
    fn self_imports_are_ignored() {
        let ng = NamespaceGraph::from_namespaces(&namespaces(&[("a", &["a.Inner", "a"])]));
        assert_eq!(ng.edge_count(), 0);
        assert_eq!(ng.node_count(), 1);
    }

    #[test]
    fn empty_namespace_never_matches_an_import() {
        let ng = NamespaceGraph::from_namespaces(&namespaces(&[("", &[]), ("a", &["Script"])]));
        assert_eq!(ng.edge_count(), 0);
    }
}
