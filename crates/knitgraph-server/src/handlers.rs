//! REST API handlers for the Knitgraph server

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use knitgraph_core::{ExportDocument, GraphError, GraphNode, Issue, Statistics};
use knitgraph_explorer::{ExploreError, ViewState};
use serde::{Deserialize, Serialize};

use crate::ServerState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub provider: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Error returned by a handler, rendered as `{ "error": … }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ExploreError> for ApiError {
    fn from(err: ExploreError) -> Self {
        let status = match &err {
            ExploreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ExploreError::RootNotFound(_) => StatusCode::NOT_FOUND,
            ExploreError::RootFetch { .. } | ExploreError::BaseClasses(_) => {
                StatusCode::BAD_GATEWAY
            }
            ExploreError::Aborted => StatusCode::CONFLICT,
            ExploreError::Graph(GraphError::NodeNotFound(_)) => StatusCode::NOT_FOUND,
            ExploreError::Graph(GraphError::SnapshotPending) => StatusCode::CONFLICT,
            ExploreError::Graph(GraphError::InvalidDocument(_)) => StatusCode::BAD_REQUEST,
            ExploreError::Graph(GraphError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{}", self.message);
        } else {
            tracing::debug!("Request rejected: {}", self.message);
        }
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

/// Result of a crawl request: the new view, or 202 when a newer request
/// took over before this one could commit.
pub enum CrawlResponse {
    Committed(ViewState),
    Superseded,
}

impl From<Option<ViewState>> for CrawlResponse {
    fn from(view: Option<ViewState>) -> Self {
        match view {
            Some(view) => CrawlResponse::Committed(view),
            None => CrawlResponse::Superseded,
        }
    }
}

impl IntoResponse for CrawlResponse {
    fn into_response(self) -> Response {
        match self {
            CrawlResponse::Committed(view) => Json(view).into_response(),
            CrawlResponse::Superseded => StatusCode::ACCEPTED.into_response(),
        }
    }
}

/// Get the current graph as an export document
pub async fn get_graph(State(state): State<Arc<ServerState>>) -> Json<ExportDocument> {
    let graph = state.session.current_graph().await;
    Json(ExportDocument::from_graph(&graph))
}

pub async fn get_view(State(state): State<Arc<ServerState>>) -> Json<ViewState> {
    Json(state.session.view().await)
}

pub async fn get_statistics(State(state): State<Arc<ServerState>>) -> Json<Statistics> {
    Json(state.session.view().await.statistics)
}

pub async fn get_issues(State(state): State<Arc<ServerState>>) -> Json<Vec<Issue>> {
    Json(state.session.view().await.issues)
}

pub async fn search(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<GraphNode>> {
    Json(state.session.search(&query.q).await)
}

pub async fn analyze(
    State(state): State<Arc<ServerState>>,
) -> Result<CrawlResponse, ApiError> {
    Ok(state.session.analyze_project().await?.into())
}

pub async fn explore(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> Result<CrawlResponse, ApiError> {
    Ok(state.session.explore(&name).await?.into())
}

pub async fn focus(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<ViewState>, ApiError> {
    Ok(Json(state.session.focus(&id).await?))
}

pub async fn back(State(state): State<Arc<ServerState>>) -> Result<Json<ViewState>, ApiError> {
    state
        .session
        .back()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::CONFLICT, "nothing to go back to"))
}

pub async fn clear_focus(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ViewState>, ApiError> {
    Ok(Json(state.session.clear_focus().await?))
}

/// Replace the graph with an uploaded export document
pub async fn import(
    State(state): State<Arc<ServerState>>,
    Json(document): Json<ExportDocument>,
) -> Json<ViewState> {
    Json(state.session.load_graph(document.into_graph()).await)
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.session.provider_name().to_string(),
    };
    Json(health)
}
