//! Core data structures for the component graph

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized, stable identifier for a node.
///
/// Hierarchical names arrive dotted (`com.acme.Foo`) and are stored
/// slash-separated (`com/acme/Foo`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Build an id from an already-normalized string.
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    /// Normalize an externally supplied (dotted) name.
    pub fn from_external(name: &str) -> Self {
        NodeId(name.trim().replace('.', "/"))
    }

    /// The dotted form expected by class metadata providers.
    pub fn to_external(&self) -> String {
        self.0.replace('/', ".")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

/// What kind of component a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Module,
    Service,
    Repository,
    Class,
    Provider,
}

/// Lifetime scope of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Singleton,
    Prototype,
    #[default]
    Module,
}

impl Scope {
    /// Parse a provider-supplied scope string, falling back to `Module`.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "singleton" => Scope::Singleton,
            "prototype" => Scope::Prototype,
            _ => Scope::Module,
        }
    }
}

/// What kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Extends,
    Depends,
    Provides,
    #[serde(alias = "inject")]
    Injects,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Extends => "extends",
            EdgeKind::Depends => "depends",
            EdgeKind::Provides => "provides",
            EdgeKind::Injects => "injects",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single component in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub is_provider: bool,
    #[serde(default)]
    pub full_name: String,
}

impl GraphNode {
    /// A plain class node.
    pub fn class(id: NodeId) -> Self {
        Self::with_kind(id, NodeKind::Class)
    }

    /// A node typed by whether the component is a provider.
    pub fn component(id: NodeId, is_provider: bool) -> Self {
        let kind = if is_provider { NodeKind::Provider } else { NodeKind::Class };
        Self::with_kind(id, kind)
    }

    pub fn with_kind(id: NodeId, kind: NodeKind) -> Self {
        GraphNode {
            full_name: id.0.clone(),
            is_provider: kind == NodeKind::Provider,
            scope: Scope::Module,
            kind,
            id,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}

/// A typed, directed relationship.
///
/// The whole struct is the edge identity: `(source, kind, target)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

impl GraphEdge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, kind: EdgeKind) -> Self {
        GraphEdge {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// An edge endpoint as it appears in ingested data: either a bare id or
/// an object carrying one. Resolved once into a [`NodeId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeRef {
    Id(NodeId),
    Node { id: NodeId },
}

impl NodeRef {
    pub fn into_id(self) -> NodeId {
        match self {
            NodeRef::Id(id) | NodeRef::Node { id } => id,
        }
    }
}

impl From<NodeId> for NodeRef {
    fn from(id: NodeId) -> Self {
        NodeRef::Id(id)
    }
}

/// A link in raw, not-yet-validated graph data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkData {
    pub source: NodeRef,
    pub target: NodeRef,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

impl From<&GraphEdge> for LinkData {
    fn from(edge: &GraphEdge) -> Self {
        LinkData {
            source: NodeRef::Id(edge.source.clone()),
            target: NodeRef::Id(edge.target.clone()),
            kind: edge.kind,
        }
    }
}
