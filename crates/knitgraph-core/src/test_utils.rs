//! Test utilities for Knitgraph

use crate::export::import_graph;
use crate::graph::Graph;
use crate::model::{EdgeKind, GraphEdge, GraphNode, NodeId};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// The default demo dataset: an app module graph with one
/// LoggingService <-> ConfigService cycle.
pub const SAMPLE_GRAPH_JSON: &str = r#"
{
  "nodes": [
    { "id": "AppModule", "type": "module", "scope": "singleton" },
    { "id": "NetworkModule", "type": "module", "scope": "singleton" },
    { "id": "DatabaseModule", "type": "module", "scope": "singleton" },
    { "id": "AuthService", "type": "service", "scope": "singleton" },
    { "id": "UserRepository", "type": "repository", "scope": "singleton" },
    { "id": "ApiClient", "type": "service", "scope": "singleton" },
    { "id": "CacheManager", "type": "service", "scope": "singleton" },
    { "id": "LoggingService", "type": "service", "scope": "singleton" },
    { "id": "AnalyticsModule", "type": "module", "scope": "singleton" },
    { "id": "EventTracker", "type": "service", "scope": "singleton" },
    { "id": "ConfigService", "type": "service", "scope": "singleton" },
    { "id": "FeatureModule", "type": "module", "scope": "prototype" },
    { "id": "PaymentService", "type": "service", "scope": "singleton" },
    { "id": "NotificationService", "type": "service", "scope": "singleton" }
  ],
  "links": [
    { "source": "AppModule", "target": "NetworkModule", "type": "provides" },
    { "source": "AppModule", "target": "DatabaseModule", "type": "provides" },
    { "source": "AppModule", "target": "AnalyticsModule", "type": "provides" },
    { "source": "NetworkModule", "target": "ApiClient", "type": "provides" },
    { "source": "NetworkModule", "target": "ConfigService", "type": "inject" },
    { "source": "DatabaseModule", "target": "UserRepository", "type": "provides" },
    { "source": "DatabaseModule", "target": "CacheManager", "type": "provides" },
    { "source": "AuthService", "target": "UserRepository", "type": "inject" },
    { "source": "AuthService", "target": "ApiClient", "type": "inject" },
    { "source": "UserRepository", "target": "CacheManager", "type": "inject" },
    { "source": "ApiClient", "target": "LoggingService", "type": "inject" },
    { "source": "LoggingService", "target": "ConfigService", "type": "inject" },
    { "source": "AnalyticsModule", "target": "EventTracker", "type": "provides" },
    { "source": "EventTracker", "target": "ApiClient", "type": "inject" },
    { "source": "FeatureModule", "target": "PaymentService", "type": "provides" },
    { "source": "PaymentService", "target": "ApiClient", "type": "inject" },
    { "source": "NotificationService", "target": "EventTracker", "type": "inject" },
    { "source": "NotificationService", "target": "UserRepository", "type": "inject" },
    { "source": "ConfigService", "target": "LoggingService", "type": "inject" }
  ]
}
"#;

pub fn sample_graph() -> Graph {
    import_graph(SAMPLE_GRAPH_JSON).unwrap()
}

/// Build a graph of class nodes joined by `depends` edges.
pub fn graph_of(nodes: &[&str], edges: &[(&str, &str)]) -> Graph {
    let mut graph = Graph::new();
    for id in nodes {
        graph.add_node(GraphNode::class(NodeId::from(*id)));
    }
    for (source, target) in edges {
        graph.add_edge(GraphEdge::new(*source, *target, EdgeKind::Depends));
    }
    graph
}

/// Write `contents` to a file inside a fresh temp dir.
pub fn write_temp_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    fs::write(&path, contents).unwrap();
    (temp_dir, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_graph_loads() {
        let graph = sample_graph();
        assert_eq!(graph.node_count(), 14);
        assert_eq!(graph.edge_count(), 19);
    }

    #[test]
    fn test_write_temp_file() {
        let (_dir, path) = write_temp_file("graph.json", "{}");
        assert!(path.exists());
    }
}
