//! `/ws`: pushes manager events to the browser and answers pings.

use crate::manager::{ClientMessage, ConnectionManager, ServerEvent};
use crate::AppState;
use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::Arc;

pub async fn ws_handler(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.manager.clone()))
}

async fn handle_socket(socket: WebSocket, manager: Arc<ConnectionManager>) {
    let (mut sender, mut receiver) = socket.split();
    let (transport, mut events) = manager.transport();
    let connection_id = manager.connect(transport);

    // Drains the manager's channel into the socket.
    let send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(j) => j,
                Err(e) => {
                    log::error!("failed to serialize {} event: {}", event.name(), e);
                    continue;
                }
            };
            if sender.send(WsMessage::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        let text = match frame {
            Ok(WsMessage::Text(t)) => t,
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                log::debug!("WebSocket {} receive error: {}", connection_id, e);
                break;
            }
        };
        handle_client_text(&manager, &connection_id, text.as_str());
    }

    manager.disconnect(&connection_id);
    send_task.abort();
}

pub(crate) fn handle_client_text(manager: &ConnectionManager, connection_id: &str, text: &str) {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            log::warn!("Received invalid JSON: {}", text);
            return;
        }
    };

    match serde_json::from_value::<ClientMessage>(value) {
        Ok(ClientMessage::Ping) => manager.send_personal(ServerEvent::Pong, connection_id),
        Ok(ClientMessage::Subscribe { agents }) => {
            log::debug!("{} subscribe request for {:?} (all events are sent)", connection_id, agents);
        }
        Err(e) => log::debug!("Ignoring client message from {}: {}", connection_id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::ManagerConfig;

    async fn next_non_heartbeat(rx: &mut tokio::sync::mpsc::Receiver<ServerEvent>) -> Option<ServerEvent> {
        loop {
            match rx.recv().await {
                Some(ServerEvent::Heartbeat { .. }) => continue,
                other => return other,
            }
        }
    }

    #[tokio::test]
    async fn ping_gets_pong_and_garbage_is_ignored() {
        let manager = ConnectionManager::new(ManagerConfig::default());
        let (transport, mut rx) = manager.transport();
        let id = manager.connect(transport);
        assert!(matches!(rx.recv().await, Some(ServerEvent::InitialState { .. })));

        handle_client_text(&manager, &id, "not json");
        handle_client_text(&manager, &id, r#"{"type":"dance"}"#);
        handle_client_text(&manager, &id, r#"{"type":"subscribe","agents":["search"]}"#);
        handle_client_text(&manager, &id, r#"{"type":"ping"}"#);

        assert!(matches!(next_non_heartbeat(&mut rx).await, Some(ServerEvent::Pong)));
        assert!(manager.is_connected(&id));
    }
}
