//! Turn a base-classes response into a project graph

use crate::record::BaseClasses;
use knitgraph_core::{EdgeKind, Graph, GraphData, GraphNode, NodeId, NodeKind};
use tracing::{info, warn};

/// Build the project overview graph.
///
/// Every record extends the group parent. A record's own parent, its
/// provider class and its parameter/component/injection references add
/// further nodes and edges. Nameless records are skipped.
pub fn transform_base_classes(base: &BaseClasses) -> Graph {
    let mut data = GraphData::default();
    let group_parent = NodeId::from_external(base.parent_class());
    data.push_node(GraphNode::class(group_parent.clone()));

    for record in base.records() {
        let Some(id) = record.node_id() else {
            warn!("Skipping base class record without a name");
            continue;
        };
        data.push_node(record.to_node(id.clone()));

        if id != group_parent {
            data.push_link(id.clone(), group_parent.clone(), EdgeKind::Extends);
        }

        if let Some(parent) = record.parent_id() {
            if parent != id && parent != group_parent {
                data.push_node(GraphNode::class(parent.clone()));
                data.push_link(id.clone(), parent, EdgeKind::Extends);
            }
        }

        if let Some(provider) = record.provider_id() {
            if provider != id {
                data.push_node(GraphNode::with_kind(provider.clone(), NodeKind::Provider));
                data.push_link(provider, id.clone(), EdgeKind::Provides);
            }
        }

        for (reference, kind) in record.relations() {
            let Some(target) = reference.node_id() else {
                continue;
            };
            if target == id {
                continue;
            }
            data.push_node(reference.to_node(target.clone()));
            data.push_link(id.clone(), target, kind);
        }
    }

    let graph = data.sanitize();
    info!(
        "Transformed {} base classes into {} nodes and {} links",
        base.records().len(),
        graph.node_count(),
        graph.edge_count()
    );
    graph
}
