//! Graph wrapper using petgraph::StableDiGraph keyed by normalized NodeId

use crate::model::*;
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// The component graph: a directed multigraph with one edge per
/// `(source, kind, target)` key.
///
/// Nodes and edges are only ever added, so petgraph's index order is
/// insertion order and every iterator below is deterministic.
#[derive(Clone)]
pub struct Graph {
    inner: StableDiGraph<GraphNode, GraphEdge>,
    index: HashMap<NodeId, NodeIndex>,
    edge_keys: HashSet<GraphEdge>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.all_nodes().eq(other.all_nodes()) && self.all_edges().eq(other.all_edges())
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
            edge_keys: HashSet::new(),
        }
    }

    /// Add a node. Returns `false` if a node with the same id already exists.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        let id = node.id.clone();
        let idx = self.inner.add_node(node);
        self.index.insert(id, idx);
        true
    }

    /// Add an edge. Returns `false` if the `(source, kind, target)` key is
    /// already present, or if either endpoint is missing (the edge is
    /// dropped with a warning).
    pub fn add_edge(&mut self, edge: GraphEdge) -> bool {
        if self.edge_keys.contains(&edge) {
            return false;
        }
        let (Some(&source), Some(&target)) =
            (self.index.get(&edge.source), self.index.get(&edge.target))
        else {
            warn!(
                "Dropping {} edge {} -> {}: endpoint not in graph",
                edge.kind, edge.source, edge.target
            );
            return false;
        };
        self.edge_keys.insert(edge.clone());
        self.inner.add_edge(source, target, edge);
        true
    }

    /// Get a node by ID.
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.index
            .get(id)
            .and_then(|&idx| self.inner.node_weight(idx))
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Check if an edge with this exact key exists.
    pub fn has_edge(&self, edge: &GraphEdge) -> bool {
        self.edge_keys.contains(edge)
    }

    /// Check if an edge exists between two nodes of a specific kind.
    pub fn has_edge_between(&self, source: &NodeId, target: &NodeId, kind: EdgeKind) -> bool {
        self.edge_keys
            .contains(&GraphEdge::new(source.clone(), target.clone(), kind))
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Iterate over all nodes in insertion order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.all_nodes().map(|n| &n.id)
    }

    /// Iterate over all edges in insertion order.
    pub fn all_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Outgoing edges of a node, in insertion order.
    pub fn edges_from(&self, source: &NodeId) -> Vec<&GraphEdge> {
        self.directed_edges(source, Direction::Outgoing)
    }

    /// Incoming edges of a node, in insertion order.
    pub fn edges_to(&self, target: &NodeId) -> Vec<&GraphEdge> {
        self.directed_edges(target, Direction::Incoming)
    }

    pub fn out_degree(&self, id: &NodeId) -> usize {
        self.degree(id, Direction::Outgoing)
    }

    pub fn in_degree(&self, id: &NodeId) -> usize {
        self.degree(id, Direction::Incoming)
    }

    fn degree(&self, id: &NodeId, direction: Direction) -> usize {
        self.index
            .get(id)
            .map_or(0, |&idx| self.inner.edges_directed(idx, direction).count())
    }

    fn directed_edges(&self, id: &NodeId, direction: Direction) -> Vec<&GraphEdge> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        // petgraph walks adjacency newest-first
        let mut ids: Vec<EdgeIndex> = self
            .inner
            .edges_directed(idx, direction)
            .map(|e| e.id())
            .collect();
        ids.sort();
        ids.into_iter()
            .filter_map(|e| self.inner.edge_weight(e))
            .collect()
    }

    /// Union of every id that appears as an edge endpoint.
    pub fn connected_node_ids(&self) -> HashSet<NodeId> {
        let mut connected = HashSet::new();
        for edge in self.all_edges() {
            connected.insert(edge.source.clone());
            connected.insert(edge.target.clone());
        }
        connected
    }

    /// Nodes shown by default: with a focus every node is shown, otherwise
    /// isolated nodes are hidden.
    pub fn visible_nodes(&self, focus_active: bool) -> Vec<&GraphNode> {
        if focus_active {
            return self.all_nodes().collect();
        }
        let connected = self.connected_node_ids();
        self.all_nodes()
            .filter(|n| connected.contains(&n.id))
            .collect()
    }

    /// Case-insensitive substring search over node ids.
    pub fn search_nodes(&self, term: &str) -> Vec<&GraphNode> {
        let needle = term.trim().to_lowercase();
        self.all_nodes()
            .filter(|n| needle.is_empty() || n.id.as_str().to_lowercase().contains(&needle))
            .collect()
    }

    /// Snapshot into the raw, serializable form.
    pub fn to_data(&self) -> GraphData {
        GraphData {
            nodes: self.all_nodes().cloned().collect(),
            links: self.all_edges().map(LinkData::from).collect(),
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/// Graph data as ingested from outside (export files, provider payloads).
/// Nothing here is validated until [`GraphData::sanitize`] runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub links: Vec<LinkData>,
}

impl GraphData {
    pub fn push_node(&mut self, node: GraphNode) {
        self.nodes.push(node);
    }

    pub fn push_link(&mut self, source: NodeId, target: NodeId, kind: EdgeKind) {
        self.links.push(LinkData {
            source: NodeRef::Id(source),
            target: NodeRef::Id(target),
            kind,
        });
    }

    /// Build a self-consistent [`Graph`]: duplicate nodes and edges collapse,
    /// and links whose endpoints are missing are dropped with one warning each.
    pub fn sanitize(self) -> Graph {
        let mut graph = Graph::new();
        for node in self.nodes {
            graph.add_node(node);
        }
        for link in self.links {
            let edge = GraphEdge {
                source: link.source.into_id(),
                target: link.target.into_id(),
                kind: link.kind,
            };
            // add_edge warns on the missing endpoint
            graph.add_edge(edge);
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> GraphNode {
        GraphNode::class(NodeId::from(id))
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut graph = Graph::new();
        assert!(graph.add_node(node("A")));
        assert!(!graph.add_node(node("A")));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_edge_dedup_by_composite_key() {
        let mut graph = Graph::new();
        graph.add_node(node("A"));
        graph.add_node(node("B"));

        assert!(graph.add_edge(GraphEdge::new("A", "B", EdgeKind::Extends)));
        assert!(!graph.add_edge(GraphEdge::new("A", "B", EdgeKind::Extends)));
        assert_eq!(graph.edge_count(), 1);

        assert!(graph.add_edge(GraphEdge::new("A", "B", EdgeKind::Depends)));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_dangling_edge_is_rejected() {
        let mut graph = Graph::new();
        graph.add_node(node("A"));
        assert!(!graph.add_edge(GraphEdge::new("A", "Missing", EdgeKind::Depends)));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_edges_from_keeps_insertion_order() {
        let mut graph = Graph::new();
        for id in ["A", "B", "C", "D"] {
            graph.add_node(node(id));
        }
        graph.add_edge(GraphEdge::new("A", "C", EdgeKind::Depends));
        graph.add_edge(GraphEdge::new("A", "B", EdgeKind::Depends));
        graph.add_edge(GraphEdge::new("A", "D", EdgeKind::Injects));

        let targets: Vec<&str> = graph
            .edges_from(&NodeId::from("A"))
            .iter()
            .map(|e| e.target.as_str())
            .collect();
        assert_eq!(targets, vec!["C", "B", "D"]);
        assert_eq!(graph.out_degree(&NodeId::from("A")), 3);
        assert_eq!(graph.in_degree(&NodeId::from("B")), 1);
    }

    #[test]
    fn test_sanitize_drops_dangling_links() {
        let mut data = GraphData::default();
        data.push_node(node("A"));
        data.push_node(node("B"));
        data.push_link("A".into(), "B".into(), EdgeKind::Depends);
        data.push_link("A".into(), "Ghost".into(), EdgeKind::Depends);
        data.push_link("Ghost".into(), "B".into(), EdgeKind::Provides);

        let graph = data.sanitize();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge_between(&"A".into(), &"B".into(), EdgeKind::Depends));
    }

    #[test]
    fn test_visible_nodes_hide_isolated_without_focus() {
        let mut graph = Graph::new();
        for id in ["A", "B", "Lonely"] {
            graph.add_node(node(id));
        }
        graph.add_edge(GraphEdge::new("A", "B", EdgeKind::Depends));

        assert_eq!(graph.visible_nodes(false).len(), 2);
        assert_eq!(graph.visible_nodes(true).len(), 3);
        assert!(!graph.connected_node_ids().contains(&NodeId::from("Lonely")));
    }

    #[test]
    fn test_search_nodes_is_case_insensitive() {
        let mut graph = Graph::new();
        for id in ["com/acme/UserRepository", "com/acme/ApiClient", "Cache"] {
            graph.add_node(node(id));
        }
        let hits: Vec<&str> = graph
            .search_nodes("REPO")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(hits, vec!["com/acme/UserRepository"]);
        assert_eq!(graph.search_nodes("").len(), 3);
    }
}
