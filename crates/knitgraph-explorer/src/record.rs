//! Wire types returned by a class metadata provider
//!
//! Names on the wire are dotted (`com.acme.Foo`); they are converted to
//! slash form when they become graph ids.

use knitgraph_core::{EdgeKind, GraphNode, NodeId, Scope};
use serde::{Deserialize, Serialize};

/// Default group parent for base classes.
pub const DEFAULT_BASE_PARENT: &str = "java.lang.Object";

/// A reference from one class to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_provider: bool,
}

impl ClassRef {
    pub fn new(name: impl Into<String>, is_provider: bool) -> Self {
        ClassRef {
            name: name.into(),
            is_provider,
        }
    }

    /// Graph id for the referenced class, `None` for a blank name.
    pub fn node_id(&self) -> Option<NodeId> {
        non_blank(&self.name).map(NodeId::from_external)
    }

    pub fn to_node(&self, id: NodeId) -> GraphNode {
        GraphNode::component(id, self.is_provider)
    }
}

/// Everything the provider knows about one class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_provider: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ClassRef>,
    #[serde(default)]
    pub components: Vec<ClassRef>,
    #[serde(default)]
    pub injections: Vec<ClassRef>,
}

impl ClassRecord {
    pub fn new(name: impl Into<String>) -> Self {
        ClassRecord {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn node_id(&self) -> Option<NodeId> {
        non_blank(&self.name).map(NodeId::from_external)
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent_class
            .as_deref()
            .and_then(non_blank)
            .map(NodeId::from_external)
    }

    pub fn provider_id(&self) -> Option<NodeId> {
        self.provider_class
            .as_deref()
            .and_then(non_blank)
            .map(NodeId::from_external)
    }

    pub fn scope(&self) -> Scope {
        self.scope.as_deref().map(Scope::parse).unwrap_or_default()
    }

    /// Node for this class: provider-typed when flagged, scoped from the record.
    pub fn to_node(&self, id: NodeId) -> GraphNode {
        GraphNode::component(id, self.is_provider).with_scope(self.scope())
    }

    /// Outgoing references with the edge kind each one produces.
    pub fn relations(&self) -> impl Iterator<Item = (&ClassRef, EdgeKind)> {
        let parameters = self.parameters.iter().map(|r| (r, EdgeKind::Depends));
        let components = self.components.iter().map(|r| (r, EdgeKind::Provides));
        let injections = self.injections.iter().map(|r| (r, EdgeKind::Injects));
        parameters.chain(components).chain(injections)
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_class = Some(parent.into());
        self
    }

    pub fn with_parameter(mut self, reference: ClassRef) -> Self {
        self.parameters.push(reference);
        self
    }

    pub fn with_component(mut self, reference: ClassRef) -> Self {
        self.components.push(reference);
        self
    }

    pub fn with_injection(mut self, reference: ClassRef) -> Self {
        self.injections.push(reference);
        self
    }
}

/// The base-classes response: a bare list, or a list grouped under a
/// shared parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BaseClasses {
    Flat(Vec<ClassRecord>),
    Grouped {
        base_classes: Vec<ClassRecord>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_class: Option<String>,
    },
}

impl Default for BaseClasses {
    fn default() -> Self {
        BaseClasses::Flat(Vec::new())
    }
}

impl BaseClasses {
    pub fn records(&self) -> &[ClassRecord] {
        match self {
            BaseClasses::Flat(records) => records,
            BaseClasses::Grouped { base_classes, .. } => base_classes,
        }
    }

    /// The shared parent, in dotted form.
    pub fn parent_class(&self) -> &str {
        match self {
            BaseClasses::Grouped {
                parent_class: Some(parent),
                ..
            } if !parent.trim().is_empty() => parent,
            _ => DEFAULT_BASE_PARENT,
        }
    }
}

fn non_blank(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
