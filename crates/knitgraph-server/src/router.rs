//! Axum router setup for the Knitgraph server

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    ServerState,
    handlers::{
        analyze, back, clear_focus, explore, focus, get_graph, get_issues, get_statistics,
        get_view, health_check, import, search,
    },
    websocket::ws_handler,
};

/// Create the axum router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        // WebSocket endpoint for real-time updates
        .route("/ws", get(ws_handler))
        // Read-only views
        .route("/api/health", get(health_check))
        .route("/api/graph", get(get_graph))
        .route("/api/view", get(get_view))
        .route("/api/statistics", get(get_statistics))
        .route("/api/issues", get(get_issues))
        .route("/api/search", get(search))
        // Actions
        .route("/api/analyze", post(analyze))
        .route("/api/explore/:name", post(explore))
        .route("/api/focus/:id", post(focus))
        .route("/api/back", post(back))
        .route("/api/clear-focus", post(clear_focus))
        .route("/api/import", post(import))
        // Add CORS support
        .layer(CorsLayer::permissive())
        // Add state
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use knitgraph_explorer::{KnitConfig, Session, StaticProvider};

    #[test]
    fn test_router_creation() {
        let provider = Arc::new(StaticProvider::from_records(vec![]));
        let session = Arc::new(Session::new(provider, KnitConfig::default()));
        let state = Arc::new(ServerState::new(session));
        let _router = create_router(state);
    }
}
