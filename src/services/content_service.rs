use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use super::analytics_service::{Analytics, AnalyticsEvent};
use super::history_service::HistoryLedger;
use super::line_diff::positional_diff;
use super::room_service::project_for_tenant;
use super::staging_service::StagingEngine;
use crate::db::CollabStore;
use crate::error::CollabResult;
use crate::models::{HistoryEntry, HistoryKind, OutboundMessage, Principal, StagedChange};
use crate::ws::{Connection, PresenceManager};

/// Result of persisting an edit.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Committed,
    Staged(StagedChange),
}

impl SaveOutcome {
    pub fn is_staged(&self) -> bool {
        matches!(self, SaveOutcome::Staged(_))
    }
}

/// Moves content edits into the room. Elevated editors overwrite canonical
/// content (last writer wins); everyone else only shares drafts and persists
/// through the staging workflow.
pub struct ContentChannel {
    store: Arc<dyn CollabStore>,
    presence: Arc<PresenceManager>,
    staging: Arc<StagingEngine>,
    ledger: HistoryLedger,
    analytics: Arc<Analytics>,
}

impl ContentChannel {
    pub fn new(
        store: Arc<dyn CollabStore>,
        presence: Arc<PresenceManager>,
        staging: Arc<StagingEngine>,
        ledger: HistoryLedger,
        analytics: Arc<Analytics>,
    ) -> Self {
        Self { store, presence, staging, ledger, analytics }
    }

    /// A live edit arriving over the socket.
    pub async fn live_edit(&self, conn: &Connection, content: String) -> CollabResult<()> {
        let (Some(room_id), Some(user_id)) = (&conn.room_id, &conn.user_id) else {
            debug!("Content change from {} ignored, not in a room", conn.id);
            return Ok(());
        };
        let handle = self.presence.room(room_id).await?;
        let room = handle.lock().await;

        if conn.role().is_elevated() {
            self.store.set_content(room_id, content.clone()).await?;
        }

        let msg = OutboundMessage::ContentUpdate {
            user_id: user_id.clone(),
            content,
            timestamp: Utc::now().timestamp_millis(),
        };
        let peers = room.broadcast_except(Some(&conn.id), &msg);
        drop(room);

        debug!("Content change from {} relayed to {} peers in {}", conn.id, peers, room_id);
        self.analytics.track(&conn.tenant_id, AnalyticsEvent::ContentChange).await;
        Ok(())
    }

    /// An explicit save. Commits directly for elevated editors, stages otherwise.
    pub async fn save(&self, principal: &Principal, project_id: &str, content: String) -> CollabResult<SaveOutcome> {
        if !principal.is_elevated() {
            let change = self.staging.submit(principal, project_id, content).await?;
            return Ok(SaveOutcome::Staged(change));
        }

        let handle = self.presence.room_for_tenant(project_id, &principal.tenant_id).await?;
        let room = handle.lock().await;

        let project = project_for_tenant(self.store.as_ref(), project_id, &principal.tenant_id).await?;
        let diff = positional_diff(&project.content, &content);
        self.store.set_content(project_id, content.clone()).await?;
        self.ledger
            .append(
                HistoryEntry::new(
                    project_id,
                    &principal.name,
                    HistoryKind::Edit,
                    format!("{} saved changes", principal.name),
                )
                .with_diff(diff),
            )
            .await?;

        room.broadcast_except(
            None,
            &OutboundMessage::ContentUpdate {
                user_id: principal.user_id.clone(),
                content,
                timestamp: Utc::now().timestamp_millis(),
            },
        );
        room.broadcast_except(None, &OutboundMessage::HistoryUpdated);

        info!("Project {} content committed by {}", project_id, principal.user_id);
        Ok(SaveOutcome::Committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::testing::Fixture;
    use tokio::sync::mpsc;

    fn connection(fx: &Fixture, id: &str, role: Role) -> (Connection, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let principal = Principal { role, ..fx.editor.clone() };
        (
            Connection {
                id: id.to_string(),
                tenant_id: principal.tenant_id.clone(),
                user_id: Some(principal.user_id.clone()),
                principal: Some(principal),
                room_id: Some(fx.room_id.clone()),
                outbox: tx,
            },
            rx,
        )
    }

    #[tokio::test]
    async fn elevated_save_commits_and_logs_edit() {
        let fx = Fixture::with_content("old").await;
        let outcome = fx.content.save(&fx.admin, &fx.room_id, "new".into()).await.unwrap();
        assert!(!outcome.is_staged());
        assert_eq!(fx.canonical().await, "new");

        let history = fx.ledger.list(&fx.room_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, HistoryKind::Edit);
        assert!(fx.staging.pending(&fx.admin, &fx.room_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn plain_save_is_staged() {
        let fx = Fixture::with_content("Hi").await;
        let outcome = fx.content.save(&fx.editor, &fx.room_id, "Hello".into()).await.unwrap();
        assert!(outcome.is_staged());
        assert_eq!(fx.canonical().await, "Hi");
        assert!(fx.ledger.list(&fx.room_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn live_edit_from_admin_overwrites_canonical() {
        let fx = Fixture::with_content("base").await;
        let mut peer = fx.watch("peer", "viewer").await;
        let (admin_conn, _rx) = connection(&fx, "admin-conn", Role::Admin);

        fx.content.live_edit(&admin_conn, "first".into()).await.unwrap();
        fx.content.live_edit(&admin_conn, "second".into()).await.unwrap();
        assert_eq!(fx.canonical().await, "second");

        let contents: Vec<String> = std::iter::from_fn(|| peer.try_recv().ok())
            .filter_map(|m| match m {
                OutboundMessage::ContentUpdate { content, .. } => Some(content),
                _ => None,
            })
            .collect();
        assert_eq!(contents, vec!["first".to_string(), "second".to_string()]);
        assert_eq!(fx.analytics.summary("cust_test").await.content_changes, 2);
    }

    #[tokio::test]
    async fn live_edit_from_user_is_draft_only() {
        let fx = Fixture::with_content("base").await;
        let mut peer = fx.watch("peer", "viewer").await;
        let (user_conn, mut own) = connection(&fx, "user-conn", Role::User);

        fx.content.live_edit(&user_conn, "draft".into()).await.unwrap();
        assert_eq!(fx.canonical().await, "base");
        assert!(matches!(peer.try_recv(), Ok(OutboundMessage::ContentUpdate { content, .. }) if content == "draft"));
        assert!(own.try_recv().is_err());
    }

    #[tokio::test]
    async fn live_edit_outside_a_room_is_ignored() {
        let fx = Fixture::with_content("base").await;
        let (mut conn, _rx) = connection(&fx, "lost", Role::Admin);
        conn.room_id = None;
        fx.content.live_edit(&conn, "x".into()).await.unwrap();
        assert_eq!(fx.canonical().await, "base");
    }
}
