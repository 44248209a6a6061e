//! HTTP + WebSocket server

pub mod handlers;
pub mod router;
pub mod websocket;

use std::sync::Arc;

use knitgraph_explorer::Session;
use tokio::net::TcpListener;

/// Shared state handed to every handler.
pub struct ServerState {
    pub session: Arc<Session>,
}

impl ServerState {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

pub struct KnitServer {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl KnitServer {
    pub fn new(session: Arc<Session>, config: ServerConfig) -> Self {
        Self {
            state: Arc::new(ServerState::new(session)),
            config,
        }
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on http://{}", listener.local_addr()?);
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        let app = router::create_router(self.state);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
