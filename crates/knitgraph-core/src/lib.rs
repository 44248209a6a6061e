//! Knitgraph core: component graph model, cycle and level analysis,
//! issue detection, focus navigation and JSON export

pub mod analysis;
pub mod cycles;
pub mod error;
pub mod export;
pub mod focus;
pub mod graph;
pub mod levels;
pub mod model;


#[cfg(test)]
pub mod test_utils;

pub use analysis::{
    Analysis, AnalysisOptions, Issue, Severity, Statistics, calculate_statistics, detect_issues,
};
pub use cycles::{CyclePair, detect_cycles};
pub use error::GraphError;
pub use export::{
    DEFAULT_EXPORT_FILE, ExportDocument, ExportMetadata, export_graph, import_graph, load_graph,
    save_graph,
};
pub use focus::{FocusNavigator, FocusSnapshot, induced_neighbourhood};
pub use graph::{Graph, GraphData};
pub use levels::{LevelMap, calculate_levels};
pub use model::{EdgeKind, GraphEdge, GraphNode, LinkData, NodeId, NodeKind, NodeRef, Scope};
