//! Error types for class exploration

use knitgraph_core::GraphError;
use thiserror::Error;

/// A single provider call went wrong.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("fetch for {name} timed out after {timeout_ms} ms")]
    Timeout { name: String, timeout_ms: u64 },

    #[error("invalid provider payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown provider kind: {0}")]
    UnknownKind(String),

    #[error("provider misconfigured: {0}")]
    Config(String),
}

/// Failures surfaced to the caller of a session operation.
///
/// Non-root fetch failures are logged and skipped, never returned.
#[derive(Debug, Error)]
pub enum ExploreError {
    #[error("invalid class name: {0:?}")]
    InvalidInput(String),

    #[error("class not found: {0}")]
    RootNotFound(String),

    #[error("failed to fetch {name}: {source}")]
    RootFetch {
        name: String,
        #[source]
        source: ProviderError,
    },

    #[error("failed to fetch base classes: {0}")]
    BaseClasses(#[source] ProviderError),

    #[error("crawl superseded by a newer request")]
    Aborted,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, ExploreError>;
