//! JSON export and import of the graph

use crate::cycles::detect_cycles;
use crate::error::Result;
use crate::graph::{Graph, GraphData};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default export file name
pub const DEFAULT_EXPORT_FILE: &str = "dependency-graph.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub export_date: String,
    pub total_nodes: usize,
    pub total_links: usize,
    pub circular_dependencies: usize,
}

/// `{ nodes, links, metadata }` as consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(flatten)]
    pub data: GraphData,
    /// Optional on import; always written on export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExportMetadata>,
}

impl ExportDocument {
    pub fn from_graph(graph: &Graph) -> Self {
        let metadata = ExportMetadata {
            export_date: chrono::Utc::now().to_rfc3339(),
            total_nodes: graph.node_count(),
            total_links: graph.edge_count(),
            circular_dependencies: detect_cycles(graph).len(),
        };
        ExportDocument {
            data: graph.to_data(),
            metadata: Some(metadata),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document; links may name endpoints by id or by `{ "id": … }`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate into a graph, dropping dangling links.
    pub fn into_graph(self) -> Graph {
        self.data.sanitize()
    }
}

pub fn export_graph(graph: &Graph) -> Result<String> {
    ExportDocument::from_graph(graph).to_json()
}

pub fn import_graph(json: &str) -> Result<Graph> {
    Ok(ExportDocument::from_json(json)?.into_graph())
}

/// Write the export document to `path`.
pub fn save_graph(graph: &Graph, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, export_graph(graph)?)?;
    tracing::debug!("Graph exported to: {}", path.display());
    Ok(())
}

/// Load a previously exported graph.
pub fn load_graph(path: &Path) -> Result<Graph> {
    let json = std::fs::read_to_string(path)?;
    let graph = import_graph(&json)?;
    tracing::debug!(
        "Graph loaded from {}: {} nodes, {} edges",
        path.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
