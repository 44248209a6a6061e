//! WebSocket handling for live view updates

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use knitgraph_explorer::ViewState;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::ServerState;

/// Messages sent by the client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Re-send the current view
    RequestView,
    Ping,
}

/// Messages pushed to the client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full view after a change
    View { view: ViewState },
    Pong,
    Error { message: String },
}

/// Handle WebSocket upgrade requests
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    info!("New WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let mut changes = state.session.subscribe();
    let (reply_tx, mut reply_rx) = mpsc::channel::<ServerMessage>(16);

    // Send the current view immediately after connection
    let initial = ServerMessage::View {
        view: state.session.view().await,
    };
    if let Err(e) = send_message(&mut sender, &initial).await {
        warn!("Failed to send initial view to WebSocket client: {}", e);
        return;
    }

    // Answer client requests
    let session = Arc::clone(&state.session);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    debug!("Received WebSocket message: {}", text);
                    let reply = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(ClientMessage::RequestView) => ServerMessage::View {
                            view: session.view().await,
                        },
                        Ok(ClientMessage::Ping) => ServerMessage::Pong,
                        Err(e) => {
                            warn!("Failed to parse WebSocket message: {}", e);
                            ServerMessage::Error {
                                message: e.to_string(),
                            }
                        }
                    };
                    if reply_tx.send(reply).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => {
                    debug!("WebSocket client disconnected");
                    break;
                }
                _ => {}
            }
        }
    });

    // Push every view change plus replies
    let mut send_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                change = changes.recv() => match change {
                    Ok(view) => ServerMessage::View { view },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("WebSocket client lagged behind by {} updates", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                reply = reply_rx.recv() => match reply {
                    Some(reply) => reply,
                    None => break,
                },
            };
            if send_message(&mut sender, &message).await.is_err() {
                debug!("Failed to send message to WebSocket client");
                break;
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    info!("WebSocket connection closed");
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> anyhow::Result<()> {
    let json = serde_json::to_string(message)?;
    sender.send(Message::Text(json)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_parsing() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"request_view"}"#).unwrap();
        assert_eq!(msg, ClientMessage::RequestView);

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Ping);

        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"subscribe"}"#).is_err());
    }

    #[test]
    fn test_server_message_serialization() {
        let json = serde_json::to_string(&ServerMessage::Pong).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);

        insta::assert_json_snapshot!(ServerMessage::Error { message: "bad".into() }, @r###"
        {
          "type": "error",
          "message": "bad"
        }
        "###);
    }
}
