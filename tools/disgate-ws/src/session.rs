// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! WebSocket client session management.
//!
//! Each connected client gets its own relay hub subscription. A blocking
//! bridge task drains the crossbeam queue and re-sends events through a tokio
//! channel; the session task serializes them onto the WebSocket and answers
//! client pings.

use crate::protocol::{ClientMessage, EntityMessage, ServerMessage};
use axum::extract::ws::{Message, WebSocket};
use disgate::relay::{RelayEvent, RelayHub};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Per-subscriber queue depth. A browser that stops reading loses events
/// beyond this instead of stalling the receive loop.
const SESSION_QUEUE_CAPACITY: usize = 1024;

/// What the bridge hands the socket writer: decoded reports as JSON text
/// frames, raw datagrams verbatim as binary frames.
enum Outbound {
    Json(ServerMessage),
    Binary(Vec<u8>),
}

/// A WebSocket client session
pub struct ClientSession {
    hub: RelayHub,
    session_id: String,
    welcome: ServerMessage,
}

impl ClientSession {
    pub fn new(hub: RelayHub, welcome: ServerMessage) -> Self {
        let session_id = Uuid::new_v4().to_string()[..8].to_string();
        info!("[{}] new session", session_id);
        Self {
            hub,
            session_id,
            welcome,
        }
    }

    pub fn id(&self) -> &str {
        &self.session_id
    }

    /// Run the session until the client disconnects.
    pub async fn run(self, socket: WebSocket) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (mut ws_tx, mut ws_rx) = socket.split();

        let welcome_json = serde_json::to_string(&self.welcome)?;
        ws_tx.send(Message::Text(welcome_json)).await?;

        let (tx, mut rx) = tokio::sync::mpsc::channel::<Outbound>(64);

        // Blocking bridge: crossbeam subscription -> tokio channel. Ends when
        // the session closes its receiving end or the hub goes away.
        let subscription = self.hub.subscribe(SESSION_QUEUE_CAPACITY);
        let bridge_tx = tx.clone();
        let bridge_id = self.session_id.clone();
        let bridge = tokio::task::spawn_blocking(move || {
            loop {
                match subscription.recv_timeout(Duration::from_millis(200)) {
                    Ok(event) => {
                        if bridge_tx.blocking_send(convert_event(event)).is_err() {
                            debug!("[{}] session channel closed, bridge done", bridge_id);
                            break;
                        }
                    }
                    Err(err) => {
                        if err.is_disconnected() {
                            debug!("[{}] hub closed, bridge done", bridge_id);
                            break;
                        }
                        if bridge_tx.is_closed() {
                            break;
                        }
                    }
                }
            }
        });

        // Forward bridge output to the socket.
        let forward_id = self.session_id.clone();
        let ws_forward = tokio::spawn(async move {
            while let Some(outbound) = rx.recv().await {
                let frame = match outbound {
                    Outbound::Json(msg) => match serde_json::to_string(&msg) {
                        Ok(json) => Message::Text(json),
                        Err(e) => {
                            warn!("[{}] serialize failed: {}", forward_id, e);
                            continue;
                        }
                    },
                    Outbound::Binary(bytes) => Message::Binary(bytes),
                };
                if ws_tx.send(frame).await.is_err() {
                    debug!("[{}] send failed, closing", forward_id);
                    break;
                }
            }
        });

        // Handle incoming client messages.
        while let Some(msg) = ws_rx.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    self.handle_message(&text, &tx).await;
                }
                Ok(Message::Close(_)) => {
                    info!("[{}] client closed connection", self.session_id);
                    break;
                }
                Ok(Message::Ping(_)) => {
                    // Axum answers pongs automatically.
                }
                Ok(Message::Pong(_)) => {
                    debug!("[{}] pong received", self.session_id);
                }
                Ok(Message::Binary(_)) => {
                    warn!("[{}] binary messages not supported", self.session_id);
                    let _ = tx
                        .send(Outbound::Json(ServerMessage::error(
                            "binary messages not supported",
                        )))
                        .await;
                }
                Err(e) => {
                    debug!("[{}] websocket error: {}", self.session_id, e);
                    break;
                }
            }
        }

        drop(tx);
        ws_forward.abort();
        let _ = bridge.await;
        info!("[{}] session ended", self.session_id);

        Ok(())
    }

    async fn handle_message(&self, text: &str, tx: &tokio::sync::mpsc::Sender<Outbound>) {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::Ping { id }) => {
                let _ = tx.send(Outbound::Json(ServerMessage::Pong { id })).await;
            }
            Err(e) => {
                debug!("[{}] invalid client message: {}", self.session_id, e);
                let _ = tx
                    .send(Outbound::Json(ServerMessage::error(format!(
                        "invalid message: {}",
                        e
                    ))))
                    .await;
            }
        }
    }
}

fn convert_event(event: RelayEvent) -> Outbound {
    match event {
        RelayEvent::Report(report) => {
            Outbound::Json(ServerMessage::Entity(EntityMessage::from(report.as_ref())))
        }
        RelayEvent::Raw { bytes, .. } => Outbound::Binary(bytes.to_vec()),
    }
}
