use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::cursors;
use super::room::{Outbox, RoomHandle, RoomState, Session};
use crate::error::{CollabError, CollabResult};
use crate::models::{OutboundMessage, Room, WebhookEvent};
use crate::services::WebhookRegistry;

/// A connection asking to enter a room.
#[derive(Debug, Clone)]
pub struct Participant {
    pub conn_id: String,
    pub tenant_id: String,
    pub user_id: String,
    pub user_data: Value,
    pub outbox: Outbox,
}

/// Owns every room for the lifetime of the process.
#[derive(Debug, Default)]
pub struct PresenceManager {
    rooms: RwLock<HashMap<String, Arc<RoomHandle>>>,
    webhooks: Arc<WebhookRegistry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceStats {
    pub rooms: usize,
    pub active_rooms: usize,
    pub sessions: usize,
}

impl PresenceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Room lifecycle events go to the given tenant webhooks.
    pub fn with_webhooks(webhooks: Arc<WebhookRegistry>) -> Self {
        Self { rooms: RwLock::default(), webhooks }
    }

    pub fn webhooks(&self) -> &WebhookRegistry {
        &self.webhooks
    }

    pub async fn create_room(&self, tenant_id: &str, name: &str, description: &str) -> CollabResult<Room> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CollabError::Validation("Room name is required".to_string()));
        }

        let room_id = format!("room_{}", uuid::Uuid::new_v4());
        let room = Room::new(room_id.clone(), tenant_id.to_string(), name.to_string(), description.to_string());
        self.rooms
            .write()
            .await
            .insert(room_id.clone(), Arc::new(RoomHandle::new(room.clone())));

        info!("Room '{}' ({}) created for tenant {}", name, room_id, tenant_id);
        Ok(room)
    }

    pub async fn room(&self, room_id: &str) -> CollabResult<Arc<RoomHandle>> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .ok_or_else(|| CollabError::NotFound(format!("Room '{}' not found", room_id)))
    }

    /// Rooms of another tenant are indistinguishable from missing ones.
    pub async fn room_for_tenant(&self, room_id: &str, tenant_id: &str) -> CollabResult<Arc<RoomHandle>> {
        let handle = self.room(room_id).await?;
        if handle.tenant_id != tenant_id {
            return Err(CollabError::NotFound(format!("Room '{}' not found", room_id)));
        }
        Ok(handle)
    }

    /// Admit a participant. Re-joining is absorbed by the member set but still
    /// announced to peers, so consumers must treat join frames as idempotent.
    pub async fn join_room(&self, room_id: &str, participant: Participant) -> CollabResult<Room> {
        let handle = self.room_for_tenant(room_id, &participant.tenant_id).await?;
        let mut state = handle.lock().await;

        let newly_added = state.room.add_member(&participant.user_id);
        state.sessions.insert(
            participant.conn_id.clone(),
            Session {
                user_id: participant.user_id.clone(),
                user_data: participant.user_data.clone(),
                outbox: participant.outbox,
            },
        );
        let notified = announce_join(&state, &participant.user_id, participant.user_data, Some(&participant.conn_id));

        let room_state = OutboundMessage::RoomState {
            active_users: state.active_users(),
            member_count: state.room.member_count,
            room_id: room_id.to_string(),
        };
        state.send_to(&participant.conn_id, room_state);

        info!(
            "User {} joined room {} via {} (new member: {}, peers notified: {}, members: {})",
            participant.user_id, room_id, participant.conn_id, newly_added, notified, state.room.member_count
        );
        let room = state.room.clone();
        drop(state);

        self.notify(&handle.tenant_id, WebhookEvent::RoomJoined, room_id, &participant.user_id).await;
        Ok(room)
    }

    /// Add a member without a live session, e.g. from the REST surface.
    /// Peers still hear about it.
    pub async fn admit_member(&self, room_id: &str, tenant_id: &str, user_id: &str, user_data: Value) -> CollabResult<Room> {
        if user_id.trim().is_empty() {
            return Err(CollabError::Validation("userId is required".to_string()));
        }
        let handle = self.room_for_tenant(room_id, tenant_id).await?;
        let mut state = handle.lock().await;

        let newly_added = state.room.add_member(user_id);
        let notified = announce_join(&state, user_id, user_data, None);
        info!(
            "User {} admitted to room {} (new member: {}, peers notified: {}, members: {})",
            user_id, room_id, newly_added, notified, state.room.member_count
        );
        let room = state.room.clone();
        drop(state);

        self.notify(tenant_id, WebhookEvent::RoomJoined, room_id, user_id).await;
        Ok(room)
    }

    /// Remove a user (and the connection's session, when given). Missing rooms
    /// and members are a no-op.
    pub async fn leave_room(&self, room_id: &str, user_id: &str, conn_id: Option<&str>) {
        let Ok(handle) = self.room(room_id).await else {
            debug!("Leave for unknown room {} ignored", room_id);
            return;
        };
        let mut state = handle.lock().await;

        if let Some(conn_id) = conn_id {
            state.sessions.remove(conn_id);
            cursors::purge(&mut state, conn_id);
        }

        if !state.room.members.contains(user_id) {
            debug!("User {} is not a member of room {}", user_id, room_id);
            return;
        }
        state.room.remove_member(user_id);

        let left = OutboundMessage::UserLeft {
            user_id: user_id.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };
        let notified = state.broadcast_except(conn_id, &left);
        info!(
            "User {} left room {} (peers notified: {}, members: {})",
            user_id, room_id, notified, state.room.member_count
        );
        drop(state);

        self.notify(&handle.tenant_id, WebhookEvent::RoomLeft, room_id, user_id).await;
    }

    pub async fn list_rooms(&self, tenant_id: &str) -> Vec<Room> {
        let handles: Vec<Arc<RoomHandle>> = self
            .rooms
            .read()
            .await
            .values()
            .filter(|h| h.tenant_id == tenant_id)
            .cloned()
            .collect();

        let mut rooms = Vec::with_capacity(handles.len());
        for handle in handles {
            rooms.push(handle.snapshot().await);
        }
        rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        rooms
    }

    pub async fn count_rooms(&self, tenant_id: &str) -> usize {
        self.rooms
            .read()
            .await
            .values()
            .filter(|h| h.tenant_id == tenant_id)
            .count()
    }

    pub async fn stats(&self) -> PresenceStats {
        let handles: Vec<Arc<RoomHandle>> = self.rooms.read().await.values().cloned().collect();
        let mut stats = PresenceStats { rooms: handles.len(), ..Default::default() };
        for handle in handles {
            let state = handle.lock().await;
            if state.room.is_active {
                stats.active_rooms += 1;
            }
            stats.sessions += state.active_users();
        }
        stats
    }

    async fn notify(&self, tenant_id: &str, event: WebhookEvent, room_id: &str, user_id: &str) {
        let payload = json!({ "roomId": room_id, "userId": user_id });
        self.webhooks.trigger(tenant_id, event, payload).await;
    }
}

fn announce_join(state: &RoomState, user_id: &str, user_data: Value, sender: Option<&str>) -> usize {
    let joined = OutboundMessage::UserJoined {
        user_id: user_id.to_string(),
        user_data,
        timestamp: Utc::now().timestamp_millis(),
    };
    state.broadcast_except(sender, &joined)
}
