// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! disgate WebSocket relay - stream live DIS entity state to browsers.
//!
//! Binds the DIS UDP port, decodes Entity State PDUs, and republishes them
//! as JSON over WebSocket. Every connected client sees the full entity
//! stream; a slow client drops events rather than slowing the others.
//!
//! # Usage
//!
//! ```bash
//! # Listen on DIS port 3000, serve ws://0.0.0.0:9090/ws
//! disgate-ws
//!
//! # Multicast exercise, raw+decoded relay
//! disgate-ws --group 239.1.2.3 --relay both
//! ```
//!
//! # Protocol
//!
//! Decoded entity state goes out as JSON text frames:
//!
//! ```json
//! {"type": "welcome", "version": "0.3.2", "relay": "decoded", "dis_port": 3000}
//! {"type": "entity", "entity": {"site":1,"application":1,"entity":100}, "marking": "ALPHA", ...}
//! ```
//!
//! Under the raw/both relay policies, original datagrams are forwarded
//! verbatim as binary frames.

mod protocol;
mod session;

use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Router,
};
use clap::Parser;
use dashmap::DashMap;
use disgate::config::RuntimeConfig;
use disgate::relay::{RelayHub, RelayPolicy};
use disgate::transport::DisReceiver;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use protocol::ServerMessage;
use session::ClientSession;

/// disgate WebSocket relay
#[derive(Parser, Debug, Clone)]
#[command(name = "disgate-ws")]
#[command(about = "disgate WebSocket relay - live DIS entity state for browsers")]
#[command(version)]
struct Args {
    /// WebSocket server port
    #[arg(short, long, default_value = "9090")]
    port: u16,

    /// Bind address for the web server
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// UDP port to receive DIS traffic on
    #[arg(short, long, default_value = "3000")]
    dis_port: u16,

    /// Multicast group to join (omit for unicast/broadcast exercises)
    #[arg(short, long)]
    group: Option<Ipv4Addr>,

    /// What to relay: raw, decoded, or both.
    /// Falls back to the DISGATE_RELAY env var, then to decoded.
    #[arg(short, long)]
    relay: Option<RelayPolicy>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Maximum concurrent WebSocket connections
    #[arg(long, default_value = "100")]
    max_clients: usize,
}

/// Shared application state
struct AppState {
    hub: RelayHub,
    config: Args,
    relay: RelayPolicy,
    /// Active sessions: session id -> remote description
    sessions: DashMap<String, String>,
}

impl AppState {
    fn can_accept_client(&self) -> bool {
        self.sessions.len() < self.config.max_clients
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .init();

    let relay = resolve_relay_policy(args.relay);

    info!("disgate WebSocket relay v{}", env!("CARGO_PKG_VERSION"));
    info!("DIS port: {}, relay policy: {:?}", args.dis_port, relay);

    let hub = RelayHub::new();
    let receiver_config = RuntimeConfig {
        port: args.dis_port,
        multicast_group: args.group,
    };
    let receiver = DisReceiver::bind(&receiver_config, hub.clone(), relay)?;
    let shutdown = receiver.shutdown_handle();

    // The DIS side is synchronous; it lives on its own thread for the whole
    // process lifetime.
    std::thread::Builder::new()
        .name("dis-receiver".to_string())
        .spawn(move || {
            if let Err(e) = receiver.run() {
                error!("DIS receive loop failed: {}", e);
            }
        })?;

    let addr = format!("{}:{}", args.bind, args.port);
    let state = Arc::new(AppState {
        hub,
        config: args,
        relay,
        sessions: DashMap::new(),
    });

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("WebSocket endpoint: ws://{}/ws", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    shutdown.shutdown();
    Ok(())
}

/// CLI flag wins; DISGATE_RELAY is the deployment-level fallback.
fn resolve_relay_policy(flag: Option<RelayPolicy>) -> RelayPolicy {
    if let Some(policy) = flag {
        return policy;
    }
    match std::env::var("DISGATE_RELAY") {
        Ok(raw) => match raw.parse() {
            Ok(policy) => policy,
            Err(e) => {
                warn!("{}, using default", e);
                RelayPolicy::default()
            }
        },
        Err(_) => RelayPolicy::default(),
    }
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if !state.can_accept_client() {
        warn!("connection rejected: max clients reached");
        return (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "Too many connections",
        )
            .into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(socket, state))
        .into_response()
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let welcome = ServerMessage::welcome(
        &format!("{:?}", state.relay).to_lowercase(),
        state.config.dis_port,
    );
    let session = ClientSession::new(state.hub.clone(), welcome);
    let session_id = session.id().to_string();

    state.sessions.insert(session_id.clone(), "websocket".to_string());
    info!("client connected, total: {}", state.sessions.len());

    if let Err(e) = session.run(socket).await {
        error!("session error: {}", e);
    }

    state.sessions.remove(&session_id);
    info!("client disconnected, total: {}", state.sessions.len());
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "dis_port": state.config.dis_port,
        "relay": format!("{:?}", state.relay).to_lowercase(),
        "clients": state.sessions.len(),
        "max_clients": state.config.max_clients,
    }))
}
