use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::{mpsc, Mutex, MutexGuard};
use tracing::debug;

use super::cursors::{Cursor, TypingState};
use crate::models::{OutboundMessage, Room};

/// Per-connection queue drained by the socket writer task.
pub type Outbox = mpsc::UnboundedSender<OutboundMessage>;

/// A connection that has joined a room.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub user_data: Value,
    pub outbox: Outbox,
}

/// Everything a room mutates in reaction to events. Only ever touched while
/// holding the room lock, which serializes events per room.
#[derive(Debug)]
pub struct RoomState {
    pub room: Room,
    pub sessions: HashMap<String, Session>,
    pub cursors: HashMap<String, Cursor>,
    pub typing: HashMap<String, TypingState>,
}

impl RoomState {
    pub fn new(room: Room) -> Self {
        Self {
            room,
            sessions: HashMap::new(),
            cursors: HashMap::new(),
            typing: HashMap::new(),
        }
    }

    pub fn active_users(&self) -> usize {
        self.sessions.len()
    }

    /// Fan a frame out to every session except `sender`.
    /// Returns the number of sessions the frame was queued for.
    pub fn broadcast_except(&self, sender: Option<&str>, msg: &OutboundMessage) -> usize {
        let mut delivered = 0;
        for (conn_id, session) in &self.sessions {
            if Some(conn_id.as_str()) == sender {
                continue;
            }
            if session.outbox.send(msg.clone()).is_ok() {
                delivered += 1;
            } else {
                debug!("Outbox closed for connection {} in room {}", conn_id, self.room.id);
            }
        }
        delivered
    }

    pub fn send_to(&self, conn_id: &str, msg: OutboundMessage) -> bool {
        match self.sessions.get(conn_id) {
            Some(session) => session.outbox.send(msg).is_ok(),
            None => false,
        }
    }
}

/// Shared handle to one room's state.
#[derive(Debug)]
pub struct RoomHandle {
    pub id: String,
    pub tenant_id: String,
    state: Mutex<RoomState>,
}

impl RoomHandle {
    pub fn new(room: Room) -> Self {
        Self {
            id: room.id.clone(),
            tenant_id: room.tenant_id.clone(),
            state: Mutex::new(RoomState::new(room)),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().await
    }

    pub async fn snapshot(&self) -> Room {
        self.lock().await.room.clone()
    }
}
