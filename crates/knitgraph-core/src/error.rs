//! Error types for graph operations

use crate::model::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Clearing focus is refused while an undo snapshot is waiting.
    #[error("a focus snapshot is pending; go back before clearing focus")]
    SnapshotPending,

    #[error("invalid graph document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
