use std::sync::Arc;
use axum::{
    extract::{Query, State, ws::{Message, WebSocket, WebSocketUpgrade}},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::error::CollabError;
use crate::models::{InboundMessage, OutboundMessage};
use crate::services::AnalyticsEvent;
use crate::websocket::dispatch::dispatch;
use crate::ws::{Connection, Credential};

/// Query parameters accepted on the socket upgrade
#[derive(Debug, Deserialize, Default)]
pub struct ConnectParams {
    pub key: Option<String>,
    pub token: Option<String>,
}

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    info!("New WebSocket connection attempt");

    let credential = Credential { api_key: params.key, token: params.token };
    let client = match app_state.connections.authenticate(&credential).await {
        Ok(client) => client,
        Err(e) => {
            warn!("WebSocket connection refused: {}", e);
            return e.into_response();
        }
    };

    ws.on_upgrade(move |socket| async move {
        let (outbox, inbox) = mpsc::unbounded_channel();
        let connection = Connection::new(Uuid::new_v4().to_string(), &client, outbox);
        handle_socket(socket, connection, inbox, app_state).await
    })
}

/// Handle WebSocket connection
async fn handle_socket(
    socket: WebSocket,
    connection: Connection,
    mut inbox: mpsc::UnboundedReceiver<OutboundMessage>,
    app_state: Arc<AppState>,
) {
    let connection_id = connection.id.clone();
    info!("WebSocket connection {} established for tenant {}", connection_id, connection.tenant_id);
    app_state.connections.register(connection.clone()).await;

    // Split the socket into sender and receiver
    let (mut sender, mut receiver) = socket.split();

    // Drain the connection's outbox into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = inbox.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize outbound frame: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Read frames and route them
    let recv_state = app_state.clone();
    let recv_conn_id = connection_id.clone();
    let error_outbox = connection.outbox.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            let text = match msg {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };

            let result = match serde_json::from_str::<InboundMessage>(&text) {
                Ok(inbound) => {
                    debug!("Received frame from {}: {:?}", recv_conn_id, inbound);
                    dispatch(&recv_state, &recv_conn_id, inbound).await
                }
                Err(e) => {
                    error!("Failed to parse frame from {}: {}", recv_conn_id, e);
                    Err(CollabError::Validation(format!("Malformed frame: {}", e)))
                }
            };

            if let Err(e) = result {
                let frame = OutboundMessage::Error { code: e.kind().to_string(), message: e.to_string() };
                if error_outbox.send(frame).is_err() {
                    break;
                }
            }
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Leave whatever room the connection was in
    let was_in_room = app_state
        .connections
        .get(&connection_id)
        .await
        .is_some_and(|c| c.room_id.is_some());
    app_state.connections.deregister(&connection_id, &app_state.presence).await;
    if was_in_room {
        app_state.analytics.track(&connection.tenant_id, AnalyticsEvent::RoomLeave).await;
    }
    info!("WebSocket connection {} terminated", connection_id);
}
