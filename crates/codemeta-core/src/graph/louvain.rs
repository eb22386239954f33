//! Louvain community detection over a [`NamespaceGraph`].
//!
//! Pure Rust implementation. Nodes are visited in index order and gain ties go
//! to the lowest community index, so a given graph always yields the same
//! partition.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use super::NamespaceGraph;

/// Assigns every node of a namespace graph to a community.
pub trait Partitioner {
    /// Community label per node index. Labels are opaque; only equality matters.
    fn partition(&self, graph: &NamespaceGraph) -> Vec<usize>;
}

/// Multi-level Louvain modularity maximisation.
#[derive(Debug, Clone, Copy)]
pub struct Louvain {
    pub resolution: f64,
}

impl Default for Louvain {
    fn default() -> Self {
        Self { resolution: 1.0 }
    }
}

impl Louvain {
    pub fn new(resolution: f64) -> Self {
        Self { resolution }
    }
}

impl Partitioner for Louvain {
    fn partition(&self, graph: &NamespaceGraph) -> Vec<usize> {
        let groups = louvain(graph.adjacency(), self.resolution);
        let mut assignment = vec![0; graph.node_count()];
        for (community, members) in groups.iter().enumerate() {
            for &node in members {
                assignment[node] = community;
            }
        }
        assignment
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ModularityError {
    #[error("modularity is undefined for a graph without edge weight")]
    ZeroWeight,
    #[error("assignment covers {got} nodes, graph has {expected}")]
    AssignmentLength { expected: usize, got: usize },
}

/// Newman modularity of `assignment` on `graph` at the given resolution.
pub fn modularity(graph: &NamespaceGraph, assignment: &[usize], resolution: f64) -> Result<f64, ModularityError> {
    if assignment.len() != graph.node_count() {
        return Err(ModularityError::AssignmentLength {
            expected: graph.node_count(),
            got: assignment.len(),
        });
    }
    let m = graph.total_weight();
    if m == 0.0 {
        return Err(ModularityError::ZeroWeight);
    }

    // community -> (internal weight, total degree)
    let mut sums: HashMap<usize, (f64, f64)> = HashMap::new();
    for (i, neighbours) in graph.adjacency().iter().enumerate() {
        let entry = sums.entry(assignment[i]).or_insert((0.0, 0.0));
        for &(j, w) in neighbours {
            entry.1 += w;
            if assignment[j] == assignment[i] {
                // each internal edge is seen from both ends
                entry.0 += w / 2.0;
            }
        }
    }

    let q = sums
        .values()
        .map(|&(internal, degree)| internal / m - resolution * (degree / (2.0 * m)).powi(2))
        .sum();
    Ok(q)
}

const MAX_SWEEPS: usize = 100;

/// One aggregation level: super-nodes joined by weighted edges.
///
/// Weight inside a super-node is kept as a self-loop, so `degree` of a
/// super-node always equals the summed degree of the nodes it absorbed.
struct Level {
    adj: Vec<Vec<(usize, f64)>>,
    degree: Vec<f64>,
}

impl Level {
    fn new(adj: Vec<Vec<(usize, f64)>>) -> Self {
        let degree = adj.iter().map(|nb| nb.iter().map(|&(_, w)| w).sum()).collect();
        Self { adj, degree }
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    /// Greedily move single nodes between neighbouring communities.
    ///
    /// Returns the community of every node, or `None` when no node moved.
    fn local_moves(&self, resolution: f64, m2: f64) -> Option<Vec<usize>> {
        let mut labels: Vec<usize> = (0..self.len()).collect();
        let mut totals = self.degree.clone();
        let mut moved = false;

        for _ in 0..MAX_SWEEPS {
            let mut sweep_moved = false;
            for node in 0..self.len() {
                let current = labels[node];
                totals[current] -= self.degree[node];
                let target = self.best_community(node, &labels, &totals, resolution, m2);
                totals[target] += self.degree[node];
                if target != current {
                    labels[node] = target;
                    sweep_moved = true;
                }
            }
            if !sweep_moved {
                break;
            }
            moved = true;
        }

        moved.then_some(labels)
    }

    /// Neighbouring community with the largest positive gain, lowest label on
    /// ties. `totals` must already exclude `node` from its own community.
    fn best_community(&self, node: usize, labels: &[usize], totals: &[f64], resolution: f64, m2: f64) -> usize {
        let k = self.degree[node];
        let mut links: BTreeMap<usize, f64> = BTreeMap::new();
        for &(other, w) in &self.adj[node] {
            if other != node {
                *links.entry(labels[other]).or_insert(0.0) += w;
            }
        }

        let gain = |community: usize, weight_in: f64| weight_in - resolution * totals[community] * k / m2;
        let current = labels[node];
        let stay = gain(current, links.get(&current).copied().unwrap_or(0.0));

        let mut best = (current, 0.0);
        for (&community, &weight_in) in &links {
            let delta = gain(community, weight_in) - stay;
            if delta > best.1 {
                best = (community, delta);
            }
        }
        best.0
    }

    /// Collapse each of the `count` communities in `labels` into one super-node.
    fn aggregate(&self, labels: &[usize], count: usize) -> Level {
        let mut merged: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];
        for (node, neighbours) in self.adj.iter().enumerate() {
            for &(other, w) in neighbours {
                *merged[labels[node]].entry(labels[other]).or_insert(0.0) += w;
            }
        }
        Level::new(merged.into_iter().map(|edges| edges.into_iter().collect()).collect())
    }
}

/// Renumber labels densely (`0..count`) in order of first appearance.
fn compact_labels(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut dense: Vec<Option<usize>> = vec![None; labels.len()];
    let mut count = 0;
    let compacted = labels
        .iter()
        .map(|&label| {
            *dense[label].get_or_insert_with(|| {
                count += 1;
                count - 1
            })
        })
        .collect();
    (compacted, count)
}

/// Run Louvain on an adjacency list, aggregating until a level makes no move.
///
/// Returns the communities as sorted lists of original node indices.
fn louvain(adj: Vec<Vec<(usize, f64)>>, resolution: f64) -> Vec<Vec<usize>> {
    let mut members: Vec<Vec<usize>> = (0..adj.len()).map(|i| vec![i]).collect();
    let mut level = Level::new(adj);
    let m2: f64 = level.degree.iter().sum();
    if m2 == 0.0 {
        return members;
    }

    while level.len() > 1 {
        let Some(labels) = level.local_moves(resolution, m2) else {
            break;
        };
        let (labels, count) = compact_labels(&labels);
        if count == level.len() {
            break;
        }

        let mut grouped = vec![Vec::new(); count];
        for (node, group) in members.into_iter().enumerate() {
            grouped[labels[node]].extend(group);
        }
        members = grouped;
        level = level.aggregate(&labels, count);
    }

    for group in &mut members {
        group.sort_unstable();
    }
    members
}
