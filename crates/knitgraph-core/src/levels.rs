//! Dependency depth (level) calculation for hierarchical layout

use crate::graph::Graph;
use crate::model::NodeId;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{HashMap, HashSet};

/// Depth of every node: one more than the deepest node it points at,
/// with sinks at 0.
///
/// A node revisited while its own depth is still being computed counts as
/// 0 for that occurrence. Levels inside or upstream of a cycle are
/// therefore a lower bound, not a longest path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelMap {
    levels: HashMap<NodeId, usize>,
    /// Node order of the graph the levels were computed from.
    order: Vec<NodeId>,
}

/// Serialized as `{ id: level }` in node order.
impl Serialize for LevelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.levels.len()))?;
        for (id, level) in self.iter() {
            map.serialize_entry(id, &level)?;
        }
        map.end()
    }
}

impl LevelMap {
    pub fn get(&self, id: &NodeId) -> Option<usize> {
        self.levels.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Deepest level in the graph; 0 when empty.
    pub fn max_depth(&self) -> usize {
        self.levels.values().copied().max().unwrap_or(0)
    }

    /// Node ids grouped by level, level 0 first, each row in node order.
    pub fn rows(&self) -> Vec<Vec<NodeId>> {
        if self.levels.is_empty() {
            return Vec::new();
        }
        let mut rows = vec![Vec::new(); self.max_depth() + 1];
        for id in &self.order {
            if let Some(&level) = self.levels.get(id) {
                rows[level].push(id.clone());
            }
        }
        rows
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, usize)> {
        self.order
            .iter()
            .filter_map(|id| self.levels.get(id).map(|&l| (id, l)))
    }
}

/// Compute the level of every node in `graph`.
pub fn calculate_levels(graph: &Graph) -> LevelMap {
    let mut calc = LevelCalc {
        graph,
        levels: HashMap::new(),
        in_progress: HashSet::new(),
    };
    for id in graph.node_ids() {
        calc.depth(id);
    }
    LevelMap {
        levels: calc.levels,
        order: graph.node_ids().cloned().collect(),
    }
}

struct LevelCalc<'g> {
    graph: &'g Graph,
    levels: HashMap<NodeId, usize>,
    in_progress: HashSet<&'g NodeId>,
}

impl<'g> LevelCalc<'g> {
    fn depth(&mut self, id: &'g NodeId) -> usize {
        if let Some(&level) = self.levels.get(id) {
            return level;
        }
        if self.in_progress.contains(id) {
            return 0;
        }
        self.in_progress.insert(id);

        let graph = self.graph;
        let mut seen: HashSet<&NodeId> = HashSet::new();
        let mut deepest: Option<usize> = None;
        for edge in graph.edges_from(id) {
            if edge.target == *id || !seen.insert(&edge.target) {
                continue;
            }
            let child = self.depth(&edge.target);
            deepest = Some(deepest.map_or(child, |d| d.max(child)));
        }

        let level = deepest.map_or(0, |d| d + 1);
        self.levels.insert(id.clone(), level);
        self.in_progress.remove(id);
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::graph_of;

    fn level(map: &LevelMap, id: &str) -> usize {
        map.get(&NodeId::from(id)).unwrap()
    }

    #[test]
    fn test_chain_levels() {
        let graph = graph_of(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let levels = calculate_levels(&graph);
        assert_eq!(level(&levels, "A"), 2);
        assert_eq!(level(&levels, "B"), 1);
        assert_eq!(level(&levels, "C"), 0);
        assert_eq!(levels.max_depth(), 2);
    }

    #[test]
    fn test_level_takes_deepest_branch() {
        let graph = graph_of(
            &["A", "B", "C", "D"],
            &[("A", "D"), ("A", "B"), ("B", "C"), ("C", "D")],
        );
        let levels = calculate_levels(&graph);
        assert_eq!(level(&levels, "A"), 3);
    }

    #[test]
    fn test_self_loop_ignored() {
        let graph = graph_of(&["A"], &[("A", "A")]);
        assert_eq!(level(&calculate_levels(&graph), "A"), 0);
    }

    #[test]
    fn test_cycle_levels_are_lower_bound() {
        // X -> Y -> Z -> X: Z sees X in progress and counts it as 0
        let graph = graph_of(&["X", "Y", "Z"], &[("X", "Y"), ("Y", "Z"), ("Z", "X")]);
        let levels = calculate_levels(&graph);
        assert_eq!(level(&levels, "Z"), 1);
        assert_eq!(level(&levels, "Y"), 2);
        assert_eq!(level(&levels, "X"), 3);
        assert_eq!(levels.max_depth(), 3);
    }

    #[test]
    fn test_rows_group_by_level() {
        let graph = graph_of(&["A", "B", "C", "D"], &[("A", "B"), ("C", "D")]);
        let rows = calculate_levels(&graph).rows();
        let rows: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| r.iter().map(|id| id.as_str()).collect())
            .collect();
        assert_eq!(rows, vec![vec!["B", "D"], vec!["A", "C"]]);
    }

    #[test]
    fn test_empty_graph() {
        let levels = calculate_levels(&Graph::new());
        assert!(levels.is_empty());
        assert_eq!(levels.max_depth(), 0);
        assert!(levels.rows().is_empty());
    }
}
