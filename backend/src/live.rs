//! Live update hub
//!
//! Every successful mutation fans out two message kinds to connected
//! WebSocket clients: a `data:update` tagged with the entity kind that
//! changed, so observers can selectively refresh, and an `alarm` carrying
//! the audit event with a human-readable line. Delivery is best-effort: a
//! subscriber that lags is dropped by the broadcast channel and never
//! blocks or fails the mutation itself.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use shared::models::AuditEvent;
use shared::types::EntityKind;

use crate::AppState;

/// Capacity of the fan-out channel before slow subscribers lag
const CHANNEL_CAPACITY: usize = 256;

/// Message pushed to live subscribers
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum LiveMessage {
    /// A collection changed; `kind` names which one
    #[serde(rename = "data:update")]
    DataUpdate { kind: EntityKind, ts: i64 },
    /// A mutation happened; carries the audit event and a display line
    #[serde(rename = "alarm")]
    Alarm {
        #[serde(flatten)]
        event: AuditEvent,
        message: String,
    },
}

/// Fan-out hub for live updates
#[derive(Clone)]
pub struct UpdateHub {
    tx: broadcast::Sender<LiveMessage>,
}

impl UpdateHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Notify subscribers that a collection changed
    pub fn data_update(&self, kind: EntityKind) {
        let _ = self.tx.send(LiveMessage::DataUpdate {
            kind,
            ts: Utc::now().timestamp_millis(),
        });
    }

    /// Broadcast an audit event as a human-readable alarm
    pub fn alarm(&self, event: &AuditEvent) {
        let message = event.alarm_message();
        let _ = self.tx.send(LiveMessage::Alarm {
            event: event.clone(),
            message,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveMessage> {
        self.tx.subscribe()
    }
}

impl Default for UpdateHub {
    fn default() -> Self {
        Self::new()
    }
}

/// WebSocket upgrade handler for `/api/live`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let rx = state.hub.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, rx))
}

/// Push loop for one subscriber; inbound traffic is ignored except close
async fn handle_socket(socket: WebSocket, mut rx: broadcast::Receiver<LiveMessage>) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Ok(msg) => {
                    let Ok(json) = serde_json::to_string(&msg) else {
                        continue;
                    };
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Live subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}
