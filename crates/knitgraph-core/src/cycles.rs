//! Circular dependency detection
//!
//! Depth-first search per unvisited node, keeping the current path and a
//! recursion stack. Reaching a node that is still on the stack closes a
//! cycle; every consecutive pair on the sub-path from that node's first
//! occurrence, plus the closing edge, is reported. A global visited set
//! keeps each node from being explored twice, so this is not an
//! exhaustive enumeration of simple cycles.

use crate::graph::Graph;
use crate::model::NodeId;
use std::collections::{HashMap, HashSet};

/// One edge that lies on a cycle, as `(from, to)`.
pub type CyclePair = (NodeId, NodeId);

/// Find edges on cycles. No unordered pair is reported twice; pairs come
/// out in discovery order.
pub fn detect_cycles(graph: &Graph) -> Vec<CyclePair> {
    let mut search = CycleSearch::new(graph);
    for id in graph.node_ids() {
        if !search.visited.contains(id) {
            search.visit(id);
        }
    }
    search.pairs
}

/// Unordered key used for deduplication.
pub fn pair_key(pair: &CyclePair) -> (&NodeId, &NodeId) {
    if pair.0 <= pair.1 {
        (&pair.0, &pair.1)
    } else {
        (&pair.1, &pair.0)
    }
}

struct CycleSearch<'g> {
    adjacency: HashMap<&'g NodeId, Vec<&'g NodeId>>,
    visited: HashSet<&'g NodeId>,
    on_stack: HashSet<&'g NodeId>,
    path: Vec<&'g NodeId>,
    reported: HashSet<(NodeId, NodeId)>,
    pairs: Vec<CyclePair>,
}

impl<'g> CycleSearch<'g> {
    fn new(graph: &'g Graph) -> Self {
        let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
        for edge in graph.all_edges() {
            let targets = adjacency.entry(&edge.source).or_default();
            if !targets.contains(&&edge.target) {
                targets.push(&edge.target);
            }
        }
        CycleSearch {
            adjacency,
            visited: HashSet::new(),
            on_stack: HashSet::new(),
            path: Vec::new(),
            reported: HashSet::new(),
            pairs: Vec::new(),
        }
    }

    fn visit(&mut self, node: &'g NodeId) {
        if self.on_stack.contains(node) {
            self.record_cycle(node);
            return;
        }
        if !self.visited.insert(node) {
            return;
        }

        self.on_stack.insert(node);
        self.path.push(node);

        let targets = self.adjacency.get(node).cloned().unwrap_or_default();
        for target in targets {
            self.visit(target);
        }

        self.on_stack.remove(node);
        self.path.pop();
    }

    fn record_cycle(&mut self, closing: &'g NodeId) {
        let Some(start) = self.path.iter().position(|n| *n == closing) else {
            return;
        };
        let mut cycle: Vec<&NodeId> = self.path[start..].to_vec();
        cycle.push(closing);

        for window in cycle.windows(2) {
            let pair = (window[0].clone(), window[1].clone());
            let (a, b) = pair_key(&pair);
            let key = (a.clone(), b.clone());
            if self.reported.insert(key) {
                self.pairs.push(pair);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::graph_of;

    fn as_strs(pairs: &[CyclePair]) -> Vec<(&str, &str)> {
        pairs.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect()
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let graph = graph_of(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
        );
        assert!(detect_cycles(&graph).is_empty());
    }

    #[test]
    fn test_three_node_cycle() {
        let graph = graph_of(&["X", "Y", "Z"], &[("X", "Y"), ("Y", "Z"), ("Z", "X")]);
        let pairs = detect_cycles(&graph);
        assert_eq!(as_strs(&pairs), vec![("X", "Y"), ("Y", "Z"), ("Z", "X")]);
    }

    #[test]
    fn test_mutual_dependency_reported_once() {
        let graph = graph_of(&["A", "B"], &[("A", "B"), ("B", "A")]);
        let pairs = detect_cycles(&graph);
        assert_eq!(as_strs(&pairs), vec![("A", "B")]);
    }

    #[test]
    fn test_no_unordered_pair_reported_twice() {
        // Two cycles sharing the A<->B relationship from different directions
        let graph = graph_of(
            &["A", "B", "C"],
            &[("A", "B"), ("B", "A"), ("B", "C"), ("C", "B")],
        );
        let pairs = detect_cycles(&graph);
        let mut keys: Vec<_> = pairs.iter().map(pair_key).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert_eq!(total, 2);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = graph_of(&["A"], &[("A", "A")]);
        assert_eq!(as_strs(&detect_cycles(&graph)), vec![("A", "A")]);
    }

    #[test]
    fn test_cycle_reached_from_acyclic_prefix() {
        let graph = graph_of(
            &["Root", "A", "B"],
            &[("Root", "A"), ("A", "B"), ("B", "A")],
        );
        assert_eq!(as_strs(&detect_cycles(&graph)), vec![("A", "B")]);
    }
}
