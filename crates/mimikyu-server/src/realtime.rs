//! The realtime draw stream.
//!
//! Each client sends [`EditCommand`]s; after every applied command the whole
//! board is broadcast back to all clients as a [`Snapshot`].

use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use mimikyu_core::{EditCommand, Snapshot};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn encode(snapshot: &Snapshot) -> Option<Message> {
    match snapshot.to_json() {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            warn!("Failed to encode snapshot: {}", e);
            None
        }
    }
}

/// Next snapshot to forward, or `None` once the channel is closed.
///
/// Snapshots are total, so a lagging receiver skips ahead and loses nothing.
async fn next_snapshot(rx: &mut broadcast::Receiver<Snapshot>, peer_id: &str) -> Option<Snapshot> {
    loop {
        match rx.recv().await {
            Ok(snapshot) => return Some(snapshot),
            Err(RecvError::Lagged(skipped)) => {
                debug!("{} lagged, skipped {} snapshots", peer_id, skipped);
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Handle one client connection until either direction ends.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let peer_id = Uuid::new_v4().to_string();
    info!("New connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (mut rx, current) = state.subscribe().await;

    if let Some(msg) = encode(&current) {
        if sender.send(msg).await.is_err() {
            info!("Connection closed before initial snapshot: {}", peer_id);
            return;
        }
    }

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match EditCommand::from_json(&text) {
                            Ok(command) => {
                                debug!("{} {:?} at ({}, {}) {}", peer_id, command.mode, command.x, command.y, command.color);
                                if let Err(e) = state.apply(&command).await {
                                    warn!("Rejected command from {}: {}", peer_id, e);
                                }
                            }
                            Err(e) => {
                                warn!("Invalid message from {}: {}", peer_id, e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // Binary, ping and pong carry no commands.
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", peer_id, e);
                        break;
                    }
                }
            }

            snapshot = next_snapshot(&mut rx, &peer_id) => {
                let Some(snapshot) = snapshot else { break };
                if let Some(msg) = encode(&snapshot) {
                    if sender.send(msg).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    info!("Connection closed: {}", peer_id);
}
