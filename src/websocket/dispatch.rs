use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{CollabError, CollabResult};
use crate::models::{InboundMessage, OutboundMessage};
use crate::services::AnalyticsEvent;
use crate::ws::{Connection, Participant};
use crate::AppState;

/// Route one inbound frame from a connection.
pub async fn dispatch(state: &Arc<AppState>, conn_id: &str, msg: InboundMessage) -> CollabResult<()> {
    let conn = state
        .connections
        .get(conn_id)
        .await
        .ok_or_else(|| CollabError::NotFound(format!("Connection '{}' not registered", conn_id)))?;

    match msg {
        InboundMessage::JoinRoom { room_id, user_id, user_data } => {
            join(state, &conn, room_id, user_id, user_data).await
        }
        InboundMessage::LeaveRoom => {
            leave(state, &conn).await;
            Ok(())
        }
        InboundMessage::CursorMove { x, y, text_position } => {
            if let Some(room_id) = &conn.room_id {
                let handle = state.presence.room(room_id).await?;
                state.cursors.move_cursor(&handle, &conn.id, x, y, text_position).await;
            }
            Ok(())
        }
        InboundMessage::UserTyping { is_typing } => {
            if let Some(room_id) = &conn.room_id {
                let handle = state.presence.room(room_id).await?;
                state.cursors.set_typing(&handle, &conn.id, is_typing).await;
            }
            Ok(())
        }
        InboundMessage::ContentChange { content } => state.content.live_edit(&conn, content).await,
        InboundMessage::CommentAdded { comment } => {
            relay(state, &conn, OutboundMessage::CommentAdded { comment }).await
        }
        InboundMessage::CommentDeleted { comment_id } => {
            relay(state, &conn, OutboundMessage::CommentDeleted { comment_id }).await
        }
        InboundMessage::Message { text } => {
            let msg = OutboundMessage::Message {
                user_id: conn.user_id.clone().unwrap_or_default(),
                text,
                timestamp: Utc::now().timestamp_millis(),
            };
            relay(state, &conn, msg).await
        }
        InboundMessage::HistoryUpdate => relay(state, &conn, OutboundMessage::HistoryUpdated).await,
        InboundMessage::Ping => {
            let pong = OutboundMessage::Pong { date: Utc::now().to_rfc3339() };
            if conn.outbox.send(pong).is_err() {
                debug!("Pong to closed connection {} dropped", conn.id);
            }
            Ok(())
        }
    }
}

async fn join(
    state: &Arc<AppState>,
    conn: &Connection,
    room_id: String,
    user_id: String,
    user_data: serde_json::Value,
) -> CollabResult<()> {
    // An authenticated connection always speaks for its token's user
    let user_id = match &conn.principal {
        Some(principal) => principal.user_id.clone(),
        None => user_id,
    };
    if user_id.trim().is_empty() {
        return Err(CollabError::Validation("userId is required".to_string()));
    }

    // Check the room before touching the binding, so a bad join keeps the old room
    state.presence.room_for_tenant(&room_id, &conn.tenant_id).await?;

    let previous = state.connections.bind_room(&conn.id, &room_id, &user_id).await?;
    // Re-joining as the same user keeps the membership, anything else vacates the old seat
    if let Some((previous_room, previous_user)) = previous.filter(|(room, user)| *room != room_id || *user != user_id) {
        info!(
            "Connection {} switching from {} in room {} to {} in room {}",
            conn.id, previous_user, previous_room, user_id, room_id
        );
        state.presence.leave_room(&previous_room, &previous_user, Some(&conn.id)).await;
        state.analytics.track(&conn.tenant_id, AnalyticsEvent::RoomLeave).await;
    }

    let participant = Participant {
        conn_id: conn.id.clone(),
        tenant_id: conn.tenant_id.clone(),
        user_id: user_id.clone(),
        user_data,
        outbox: conn.outbox.clone(),
    };
    if let Err(e) = state.presence.join_room(&room_id, participant).await {
        state.connections.unbind_room(&conn.id).await;
        return Err(e);
    }

    // Membership on the project is best effort
    let store = state.store.clone();
    let project_id = room_id.clone();
    let member = user_id.clone();
    tokio::spawn(async move {
        if let Err(e) = store.add_member(&project_id, &member).await {
            warn!("Failed to record {} as member of project {}: {}", member, project_id, e);
        }
    });

    state.analytics.track(&conn.tenant_id, AnalyticsEvent::RoomJoin).await;
    Ok(())
}

/// Vacate the connection's current room, if any.
pub async fn leave(state: &Arc<AppState>, conn: &Connection) {
    let Some((room_id, user_id)) = state.connections.unbind_room(&conn.id).await else {
        debug!("Leave from {} ignored, not in a room", conn.id);
        return;
    };
    state.presence.leave_room(&room_id, &user_id, Some(&conn.id)).await;
    state.analytics.track(&conn.tenant_id, AnalyticsEvent::RoomLeave).await;
}

/// Forward a frame to every other session of the connection's room.
async fn relay(state: &Arc<AppState>, conn: &Connection, msg: OutboundMessage) -> CollabResult<()> {
    let Some(room_id) = &conn.room_id else {
        debug!("Frame from {} dropped, not in a room", conn.id);
        return Ok(());
    };
    let handle = state.presence.room(room_id).await?;
    let peers = handle.lock().await.broadcast_except(Some(&conn.id), &msg);
    debug!("Relayed frame from {} to {} peers in {}", conn.id, peers, room_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::{CollabStore, InMemoryStore};
    use crate::models::{Plan, Principal, Role, Room, Tenant};
    use crate::services::room_service;
    use crate::ws::{AuthenticatedClient, Connection};
    use serde_json::{json, Value};
    use tokio::sync::mpsc;

    struct Harness {
        state: Arc<AppState>,
        tenant: Tenant,
        room: Room,
    }

    impl Harness {
        async fn new() -> Self {
            let store = Arc::new(InMemoryStore::new());
            let tenant = Tenant::new("cust_1", "Acme", Plan::Pro, "pk_test", "sk_test");
            store.insert_tenant(tenant.clone()).await.unwrap();
            let state = Arc::new(AppState::new(Config::default(), store));
            let admin = Principal {
                user_id: "admin".into(),
                name: "Admin".into(),
                role: Role::Admin,
                tenant_id: "cust_1".into(),
            };
            let room = room_service::open_room(&state.presence, state.store.as_ref(), &admin, "standup", "")
                .await
                .unwrap();
            Self { state, tenant, room }
        }

        async fn connect(&self, conn_id: &str) -> mpsc::UnboundedReceiver<OutboundMessage> {
            let (tx, rx) = mpsc::unbounded_channel();
            let client = AuthenticatedClient { tenant: self.tenant.clone(), principal: None };
            self.state
                .connections
                .register(Connection::new(conn_id.to_string(), &client, tx))
                .await;
            rx
        }

        async fn join(&self, conn_id: &str, user_id: &str) {
            let msg = InboundMessage::JoinRoom {
                room_id: self.room.id.clone(),
                user_id: user_id.to_string(),
                user_data: json!({"name": user_id}),
            };
            dispatch(&self.state, conn_id, msg).await.unwrap();
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundMessage>) -> Vec<OutboundMessage> {
        let mut frames = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            frames.push(msg);
        }
        frames
    }

    #[tokio::test]
    async fn join_announces_peer_and_sends_room_state() {
        let h = Harness::new().await;
        let mut a = h.connect("c1").await;
        let mut b = h.connect("c2").await;

        h.join("c1", "u1").await;
        assert_eq!(
            drain(&mut a),
            vec![OutboundMessage::RoomState { active_users: 1, member_count: 1, room_id: h.room.id.clone() }]
        );

        h.join("c2", "u2").await;
        let to_a = drain(&mut a);
        assert!(matches!(&to_a[..], [OutboundMessage::UserJoined { user_id, .. }] if user_id == "u2"));
        assert_eq!(
            drain(&mut b),
            vec![OutboundMessage::RoomState { active_users: 2, member_count: 2, room_id: h.room.id.clone() }]
        );

        let summary = h.state.analytics.summary("cust_1").await;
        assert_eq!(summary.room_joins, 2);
    }

    #[tokio::test]
    async fn join_unknown_room_is_not_found_and_keeps_binding() {
        let h = Harness::new().await;
        let _a = h.connect("c1").await;
        h.join("c1", "u1").await;

        let msg = InboundMessage::JoinRoom { room_id: "room_missing".into(), user_id: "u1".into(), user_data: Value::Null };
        let err = dispatch(&h.state, "c1", msg).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");

        let conn = h.state.connections.get("c1").await.unwrap();
        assert_eq!(conn.room_id.as_deref(), Some(h.room.id.as_str()));
    }

    #[tokio::test]
    async fn joining_another_room_leaves_the_first() {
        let h = Harness::new().await;
        let mut a = h.connect("c1").await;
        let _b = h.connect("c2").await;
        h.join("c1", "u1").await;
        h.join("c2", "u2").await;
        drain(&mut a);

        let second = h.state.presence.create_room("cust_1", "retro", "").await.unwrap();
        let msg = InboundMessage::JoinRoom { room_id: second.id.clone(), user_id: "u2".into(), user_data: Value::Null };
        dispatch(&h.state, "c2", msg).await.unwrap();

        let to_a = drain(&mut a);
        assert!(matches!(&to_a[..], [OutboundMessage::UserLeft { user_id, .. }] if user_id == "u2"));
        assert_eq!(h.state.presence.room(&h.room.id).await.unwrap().snapshot().await.member_count, 1);
    }

    #[tokio::test]
    async fn leave_room_is_idempotent() {
        let h = Harness::new().await;
        let mut a = h.connect("c1").await;
        let _b = h.connect("c2").await;
        h.join("c1", "u1").await;
        h.join("c2", "u2").await;
        drain(&mut a);

        dispatch(&h.state, "c2", InboundMessage::LeaveRoom).await.unwrap();
        dispatch(&h.state, "c2", InboundMessage::LeaveRoom).await.unwrap();

        assert_eq!(drain(&mut a).len(), 1);
        assert_eq!(h.state.analytics.summary("cust_1").await.room_leaves, 1);
    }

    #[tokio::test]
    async fn content_change_reaches_peers_only() {
        let h = Harness::new().await;
        let mut a = h.connect("c1").await;
        let mut b = h.connect("c2").await;
        h.join("c1", "u1").await;
        h.join("c2", "u2").await;
        drain(&mut a);
        drain(&mut b);

        dispatch(&h.state, "c1", InboundMessage::ContentChange { content: "draft".into() })
            .await
            .unwrap();

        assert!(drain(&mut a).is_empty());
        let to_b = drain(&mut b);
        assert!(matches!(&to_b[..], [OutboundMessage::ContentUpdate { content, .. }] if content == "draft"));
        // Anonymous sockets never write the canonical content
        let project = h.state.store.get_project(&h.room.id).await.unwrap().unwrap();
        assert_eq!(project.content, "");
    }

    #[tokio::test]
    async fn comment_frames_are_relayed_verbatim() {
        let h = Harness::new().await;
        let mut a = h.connect("c1").await;
        let mut b = h.connect("c2").await;
        h.join("c1", "u1").await;
        h.join("c2", "u2").await;
        drain(&mut a);
        drain(&mut b);

        let comment = json!({"id": "comment_1", "text": "nice"});
        dispatch(&h.state, "c1", InboundMessage::CommentAdded { comment: comment.clone() })
            .await
            .unwrap();
        dispatch(&h.state, "c1", InboundMessage::HistoryUpdate).await.unwrap();

        assert_eq!(
            drain(&mut b),
            vec![OutboundMessage::CommentAdded { comment }, OutboundMessage::HistoryUpdated]
        );
        assert!(drain(&mut a).is_empty());
    }

    #[tokio::test]
    async fn ping_answers_only_the_sender() {
        let h = Harness::new().await;
        let mut a = h.connect("c1").await;

        dispatch(&h.state, "c1", InboundMessage::Ping).await.unwrap();

        let frames = drain(&mut a);
        assert!(matches!(&frames[..], [OutboundMessage::Pong { .. }]));
    }

    #[tokio::test]
    async fn frames_before_join_are_ignored() {
        let h = Harness::new().await;
        let mut a = h.connect("c1").await;

        dispatch(&h.state, "c1", InboundMessage::Message { text: "hello?".into() }).await.unwrap();
        dispatch(&h.state, "c1", InboundMessage::CursorMove { x: 1.0, y: 1.0, text_position: None })
            .await
            .unwrap();

        assert!(drain(&mut a).is_empty());
    }

    #[tokio::test]
    async fn unknown_connection_is_rejected() {
        let h = Harness::new().await;
        let err = dispatch(&h.state, "ghost", InboundMessage::Ping).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn rejoining_under_another_user_vacates_the_old_one() {
        let h = Harness::new().await;
        let mut a = h.connect("c1").await;
        let mut b = h.connect("c2").await;
        h.join("c2", "watcher").await;
        h.join("c1", "u1").await;
        drain(&mut a);
        drain(&mut b);

        h.join("c1", "u2").await;
        let handle = h.state.presence.room(&h.room.id).await.unwrap();
        let room = handle.snapshot().await;
        assert!(!room.members.contains("u1"));
        assert!(room.members.contains("u2"));
        assert_eq!(room.member_count, 2);

        let to_b = drain(&mut b);
        assert!(matches!(&to_b[0], OutboundMessage::UserLeft { user_id, .. } if user_id == "u1"));
        assert!(matches!(&to_b[1], OutboundMessage::UserJoined { user_id, .. } if user_id == "u2"));
        assert!(matches!(&drain(&mut a)[..], [OutboundMessage::RoomState { active_users: 2, .. }]));

        h.state.connections.deregister("c1", &h.state.presence).await;
        h.state.connections.deregister("c2", &h.state.presence).await;
        let room = handle.snapshot().await;
        assert_eq!(room.member_count, 0);
        assert!(!room.is_active);
    }

    #[tokio::test]
    async fn rejoining_as_the_same_user_keeps_membership() {
        let h = Harness::new().await;
        let mut a = h.connect("c1").await;
        let mut b = h.connect("c2").await;
        h.join("c2", "watcher").await;
        h.join("c1", "u1").await;
        drain(&mut a);
        drain(&mut b);

        h.join("c1", "u1").await;
        let to_b = drain(&mut b);
        assert!(matches!(&to_b[..], [OutboundMessage::UserJoined { user_id, .. }] if user_id == "u1"));
        assert_eq!(h.state.analytics.summary("cust_1").await.room_leaves, 0);
    }
}
