//! Ephemeral cursor and typing state.
//!
//! Both tables are keyed by connection id and live inside the room state, so
//! they disappear with the connection's session. A cursor update overwrites the
//! previous value; nothing is retained.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use super::room::{RoomHandle, RoomState};
use crate::models::OutboundMessage;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
    pub text_offset: Option<usize>,
}

#[derive(Debug, Default)]
pub struct TypingState {
    pub is_typing: bool,
    generation: u64,
    idle_timer: Option<JoinHandle<()>>,
}

impl TypingState {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.idle_timer.take() {
            timer.abort();
        }
    }
}

/// Drop everything a connection owns in the room.
pub fn purge(state: &mut RoomState, conn_id: &str) {
    state.cursors.remove(conn_id);
    if let Some(mut typing) = state.typing.remove(conn_id) {
        typing.cancel_timer();
    }
}

/// Relays cursor moves and debounced typing flags to room peers.
#[derive(Debug, Clone)]
pub struct CursorBroadcaster {
    idle_window: Duration,
}

impl CursorBroadcaster {
    pub fn new(idle_window: Duration) -> Self {
        Self { idle_window }
    }

    pub fn idle_window(&self) -> Duration {
        self.idle_window
    }

    pub async fn move_cursor(&self, handle: &RoomHandle, conn_id: &str, x: f64, y: f64, text_position: Option<usize>) {
        let mut guard = handle.lock().await;
        let state = &mut *guard;
        let Some(session) = state.sessions.get(conn_id) else {
            debug!("Cursor move from {} ignored, not in room {}", conn_id, handle.id);
            return;
        };

        let msg = OutboundMessage::CursorUpdate {
            user_id: session.user_id.clone(),
            socket_id: conn_id.to_string(),
            x,
            y,
            text_position,
            user: session.user_data.clone(),
            timestamp: Utc::now().timestamp_millis(),
        };
        state.cursors.insert(conn_id.to_string(), Cursor { x, y, text_offset: text_position });
        state.broadcast_except(Some(conn_id), &msg);
    }

    /// Each `true` restarts the idle timer; peers only hear about transitions.
    /// The timer flips the flag back to `false` once the window passes quietly.
    pub async fn set_typing(&self, handle: &Arc<RoomHandle>, conn_id: &str, is_typing: bool) {
        let mut guard = handle.lock().await;
        let state = &mut *guard;
        let Some(session) = state.sessions.get(conn_id) else {
            return;
        };
        let user = session.user_data.clone();

        let entry = state.typing.entry(conn_id.to_string()).or_default();
        entry.cancel_timer();
        entry.generation += 1;
        let was_typing = entry.is_typing;
        entry.is_typing = is_typing;

        if is_typing {
            let generation = entry.generation;
            let room = Arc::downgrade(handle);
            let conn = conn_id.to_string();
            let idle = self.idle_window;
            entry.idle_timer = Some(tokio::spawn(async move {
                tokio::time::sleep(idle).await;
                if let Some(handle) = room.upgrade() {
                    expire_typing(&handle, &conn, generation).await;
                }
            }));
        }

        if was_typing != is_typing {
            let msg = OutboundMessage::UserTyping {
                socket_id: conn_id.to_string(),
                is_typing,
                user,
            };
            state.broadcast_except(Some(conn_id), &msg);
        }
    }
}

async fn expire_typing(handle: &RoomHandle, conn_id: &str, generation: u64) {
    let mut guard = handle.lock().await;
    let state = &mut *guard;
    let Some(entry) = state.typing.get_mut(conn_id) else {
        return;
    };
    // A newer keystroke or an explicit stop owns the flag now.
    if entry.generation != generation || !entry.is_typing {
        return;
    }
    entry.is_typing = false;
    entry.idle_timer = None;

    let user = state
        .sessions
        .get(conn_id)
        .map(|s| s.user_data.clone())
        .unwrap_or_default();
    let msg = OutboundMessage::UserTyping {
        socket_id: conn_id.to_string(),
        is_typing: false,
        user,
    };
    state.broadcast_except(Some(conn_id), &msg);
}
