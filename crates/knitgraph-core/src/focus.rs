//! Focus views with single-level undo
//!
//! Focusing on a node replaces the current graph with the node's one-hop
//! neighbourhood. The graph that was current before is kept in a single
//! undo slot; focusing again before going back overwrites it.

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::model::NodeId;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// What `back` restores.
#[derive(Debug, Clone)]
pub struct FocusSnapshot {
    pub saved_graph: Arc<Graph>,
    pub saved_focused_node: Option<NodeId>,
}

/// Tracks the full graph, the graph currently on display, the focused
/// node and the undo slot.
#[derive(Debug, Clone, Default)]
pub struct FocusNavigator {
    full: Arc<Graph>,
    current: Arc<Graph>,
    focused: Option<NodeId>,
    snapshot: Option<FocusSnapshot>,
}

impl FocusNavigator {
    pub fn new(graph: Graph) -> Self {
        let graph = Arc::new(graph);
        FocusNavigator {
            full: Arc::clone(&graph),
            current: graph,
            focused: None,
            snapshot: None,
        }
    }

    /// The graph on display.
    pub fn current(&self) -> &Arc<Graph> {
        &self.current
    }

    /// The unfocused graph.
    pub fn full(&self) -> &Arc<Graph> {
        &self.full
    }

    pub fn focused_node(&self) -> Option<&NodeId> {
        self.focused.as_ref()
    }

    pub fn is_focused(&self) -> bool {
        self.focused.is_some()
    }

    pub fn can_go_back(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Replace everything with a fresh graph, dropping focus and undo.
    pub fn reset(&mut self, graph: Graph) {
        *self = FocusNavigator::new(graph);
    }

    /// Swap in a graph grown from the current one. Outside a focus the full
    /// graph follows; inside one the focus marker and undo slot are kept.
    pub fn replace_current(&mut self, graph: Graph) {
        let graph = Arc::new(graph);
        if self.focused.is_none() {
            self.full = Arc::clone(&graph);
        }
        self.current = graph;
    }

    /// Focus on `id`, saving the current view for `back`.
    pub fn focus(&mut self, id: &NodeId) -> Result<Arc<Graph>> {
        let view = Arc::new(induced_neighbourhood(&self.current, id)?);
        self.snapshot = Some(FocusSnapshot {
            saved_graph: Arc::clone(&self.current),
            saved_focused_node: self.focused.take(),
        });
        debug!(
            "Focused on {}: {} nodes, {} edges",
            id,
            view.node_count(),
            view.edge_count()
        );
        self.focused = Some(id.clone());
        self.current = Arc::clone(&view);
        Ok(view)
    }

    /// Restore the saved view. Returns `None` when the slot is empty.
    pub fn back(&mut self) -> Option<Arc<Graph>> {
        let snapshot = self.snapshot.take()?;
        self.current = snapshot.saved_graph;
        self.focused = snapshot.saved_focused_node;
        Some(Arc::clone(&self.current))
    }

    /// Drop the focus marker and return to the full graph.
    pub fn clear_focus(&mut self) -> Result<Arc<Graph>> {
        if self.snapshot.is_some() {
            return Err(GraphError::SnapshotPending);
        }
        self.focused = None;
        self.current = Arc::clone(&self.full);
        Ok(Arc::clone(&self.current))
    }
}

/// The subgraph induced by `id` and every node one edge away from it in
/// either direction. Self-referential edges are left out.
pub fn induced_neighbourhood(graph: &Graph, id: &NodeId) -> Result<Graph> {
    if !graph.contains_node(id) {
        return Err(GraphError::NodeNotFound(id.clone()));
    }

    let mut members: HashSet<&NodeId> = HashSet::new();
    members.insert(id);
    for edge in graph.edges_from(id) {
        members.insert(&edge.target);
    }
    for edge in graph.edges_to(id) {
        members.insert(&edge.source);
    }

    let mut view = Graph::new();
    for node in graph.all_nodes() {
        if members.contains(&node.id) {
            view.add_node(node.clone());
        }
    }
    for edge in graph.all_edges() {
        if edge.is_self_loop() {
            continue;
        }
        if members.contains(&edge.source) && members.contains(&edge.target) {
            view.add_edge(edge.clone());
        }
    }
    Ok(view)
}
