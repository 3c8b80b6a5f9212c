//! Staged-change workflow.
//!
//! ```text
//!   submit ──► pending ──approve──► approved  (canonical := proposed, merge entry)
//!                  │
//!                  └────reject────► rejected  (canonical untouched, reject entry)
//! ```
//!
//! Every change freezes the canonical content it was proposed against.
//! Approving one change never rebases the others, so approving an older
//! proposal after a newer one silently overwrites the newer merge.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use super::history_service::HistoryLedger;
use super::line_diff::positional_diff;
use super::room_service::project_for_tenant;
use crate::auth::auth;
use crate::db::CollabStore;
use crate::error::{CollabError, CollabResult};
use crate::models::{ChangeStatus, HistoryEntry, HistoryKind, OutboundMessage, Principal, StagedChange};
use crate::ws::PresenceManager;

pub struct StagingEngine {
    store: Arc<dyn CollabStore>,
    presence: Arc<PresenceManager>,
    ledger: HistoryLedger,
}

impl StagingEngine {
    pub fn new(store: Arc<dyn CollabStore>, presence: Arc<PresenceManager>, ledger: HistoryLedger) -> Self {
        Self { store, presence, ledger }
    }

    /// Record a proposal against the current canonical content.
    pub async fn submit(&self, author: &Principal, project_id: &str, proposed: String) -> CollabResult<StagedChange> {
        let handle = self.presence.room_for_tenant(project_id, &author.tenant_id).await?;
        let _room = handle.lock().await;

        let project = project_for_tenant(self.store.as_ref(), project_id, &author.tenant_id).await?;
        let change = StagedChange {
            id: format!("change_{}", uuid::Uuid::new_v4()),
            project_id: project.id.clone(),
            user_id: author.user_id.clone(),
            user_name: author.name.clone(),
            diff: positional_diff(&project.content, &proposed),
            original_content: project.content,
            proposed_content: proposed,
            status: ChangeStatus::Pending,
            feedback: None,
            reviewed_by: None,
            created_at: Utc::now(),
            resolved_at: None,
        };
        self.store.insert_change(change.clone()).await?;

        info!(
            "Staged change {} submitted by {} for project {} ({} diff lines)",
            change.id,
            author.user_id,
            project_id,
            change.diff.len()
        );
        Ok(change)
    }

    /// Pending changes of a project, oldest first.
    pub async fn pending(&self, caller: &Principal, project_id: &str) -> CollabResult<Vec<StagedChange>> {
        project_for_tenant(self.store.as_ref(), project_id, &caller.tenant_id).await?;
        let changes = self.store.list_changes(project_id).await?;
        Ok(changes.into_iter().filter(StagedChange::is_pending).collect())
    }

    /// Approve or reject a pending change. The first resolution wins; later
    /// attempts fail with `InvalidState`. If a store write fails the change is
    /// left pending so the reviewer can retry.
    pub async fn resolve(
        &self,
        reviewer: &Principal,
        change_id: &str,
        approve: bool,
        feedback: Option<String>,
    ) -> CollabResult<StagedChange> {
        auth::ensure_elevated(reviewer, "Only admins can review staged changes")?;

        let not_found = || CollabError::NotFound(format!("Staged change '{}' not found", change_id));
        let located = self.store.get_change(change_id).await?.ok_or_else(not_found)?;
        let handle = self
            .presence
            .room_for_tenant(&located.project_id, &reviewer.tenant_id)
            .await
            .map_err(|_| not_found())?;
        let room = handle.lock().await;

        // Re-read under the room lock, a concurrent reviewer may have won.
        let change = self.store.get_change(change_id).await?.ok_or_else(not_found)?;
        if !change.is_pending() {
            warn!("Staged change {} already {}", change_id, change.status.as_str());
            return Err(CollabError::InvalidState(format!(
                "Staged change '{}' was already {}",
                change_id,
                change.status.as_str()
            )));
        }

        let feedback = feedback.map(|f| f.trim().to_string()).filter(|f| !f.is_empty());
        let (status, entry) = if approve {
            self.store
                .set_content(&change.project_id, change.proposed_content.clone())
                .await?;
            let entry = HistoryEntry::new(
                &change.project_id,
                &reviewer.name,
                HistoryKind::Merge,
                format!("Approved changes from {}", change.user_name),
            );
            (ChangeStatus::Approved, entry)
        } else {
            if feedback.is_none() {
                return Err(CollabError::Validation("Feedback is required when rejecting a change".to_string()));
            }
            let entry = HistoryEntry::new(
                &change.project_id,
                &reviewer.name,
                HistoryKind::Reject,
                format!("Rejected changes from {}", change.user_name),
            );
            (ChangeStatus::Rejected, entry)
        };

        self.ledger
            .append_for_change(change_id, entry.with_feedback(feedback.clone()).with_diff(change.diff.clone()))
            .await?;

        let resolved = StagedChange {
            status,
            feedback,
            reviewed_by: Some(reviewer.user_id.clone()),
            resolved_at: Some(Utc::now()),
            ..change
        };
        self.store.update_change(resolved.clone()).await?;

        if approve {
            room.broadcast_except(
                None,
                &OutboundMessage::ContentUpdate {
                    user_id: reviewer.user_id.clone(),
                    content: resolved.proposed_content.clone(),
                    timestamp: Utc::now().timestamp_millis(),
                },
            );
        }
        room.broadcast_except(None, &OutboundMessage::HistoryUpdated);

        info!(
            "Staged change {} {} by {}",
            change_id,
            resolved.status.as_str(),
            reviewer.user_id
        );
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    #[tokio::test]
    async fn approve_merges_and_records_one_merge() {
        let fx = Fixture::with_content("Hi").await;
        let change = fx.staging.submit(&fx.editor, &fx.room_id, "Hello".into()).await.unwrap();
        assert_eq!(change.original_content, "Hi");
        assert_eq!(change.proposed_content, "Hello");
        assert!(change.is_pending());
        assert_eq!(fx.staging.pending(&fx.admin, &fx.room_id).await.unwrap().len(), 1);

        let resolved = fx
            .staging
            .resolve(&fx.admin, &change.id, true, Some("ok".into()))
            .await
            .unwrap();
        assert_eq!(resolved.status, ChangeStatus::Approved);
        assert_eq!(fx.canonical().await, "Hello");

        let history = fx.ledger.list(&fx.room_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, HistoryKind::Merge);
        assert_eq!(history[0].feedback.as_deref(), Some("ok"));
        assert!(fx.staging.pending(&fx.admin, &fx.room_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reject_keeps_content_and_requires_feedback() {
        let fx = Fixture::with_content("Hi").await;
        let change = fx.staging.submit(&fx.editor, &fx.room_id, "Hello".into()).await.unwrap();

        let missing = fx.staging.resolve(&fx.admin, &change.id, false, Some("  ".into())).await;
        assert!(matches!(missing, Err(CollabError::Validation(_))));

        let rejected = fx
            .staging
            .resolve(&fx.admin, &change.id, false, Some("too casual".into()))
            .await
            .unwrap();
        assert_eq!(rejected.status, ChangeStatus::Rejected);
        assert_eq!(fx.canonical().await, "Hi");

        let history = fx.ledger.list(&fx.room_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, HistoryKind::Reject);
        assert_eq!(history[0].feedback.as_deref(), Some("too casual"));
    }

    #[tokio::test]
    async fn second_resolution_is_invalid_and_leaves_no_trace() {
        let fx = Fixture::with_content("Hi").await;
        let change = fx.staging.submit(&fx.editor, &fx.room_id, "Hello".into()).await.unwrap();
        fx.staging.resolve(&fx.admin, &change.id, false, Some("no".into())).await.unwrap();

        let again = fx.staging.resolve(&fx.admin, &change.id, false, Some("still no".into())).await;
        assert_eq!(
            again,
            Err(CollabError::InvalidState(format!("Staged change '{}' was already rejected", change.id)))
        );
        let flip = fx.staging.resolve(&fx.admin, &change.id, true, None).await;
        assert!(matches!(flip, Err(CollabError::InvalidState(_))));
        assert_eq!(fx.ledger.list(&fx.room_id).await.unwrap().len(), 1);
        assert_eq!(fx.canonical().await, "Hi");
    }

    #[tokio::test]
    async fn only_elevated_roles_resolve() {
        let fx = Fixture::with_content("Hi").await;
        let change = fx.staging.submit(&fx.editor, &fx.room_id, "Hello".into()).await.unwrap();
        let err = fx.staging.resolve(&fx.other_editor, &change.id, true, None).await;
        assert!(matches!(err, Err(CollabError::Forbidden(_))));

        let missing = fx.staging.resolve(&fx.admin, "change_missing", true, None).await;
        assert!(matches!(missing, Err(CollabError::NotFound(_))));
    }

    #[tokio::test]
    async fn later_approval_overwrites_earlier_merge() {
        let fx = Fixture::with_content("v0").await;
        let a = fx.staging.submit(&fx.editor, &fx.room_id, "v1".into()).await.unwrap();
        let b = fx.staging.submit(&fx.other_editor, &fx.room_id, "v2".into()).await.unwrap();
        assert_eq!(a.original_content, "v0");
        assert_eq!(b.original_content, "v0");

        fx.staging.resolve(&fx.admin, &a.id, true, None).await.unwrap();
        assert_eq!(fx.canonical().await, "v1");

        // B still carries its frozen snapshot and wins outright.
        let b_now = fx.store.get_change(&b.id).await.unwrap().unwrap();
        assert_eq!(b_now.original_content, "v0");
        fx.staging.resolve(&fx.admin, &b.id, true, None).await.unwrap();
        assert_eq!(fx.canonical().await, "v2");
    }

    #[tokio::test]
    async fn store_failure_leaves_change_pending() {
        let fx = Fixture::with_content("Hi").await;
        let change = fx.staging.submit(&fx.editor, &fx.room_id, "Hello".into()).await.unwrap();

        fx.store.inject_write_fault(true);
        let err = fx.staging.resolve(&fx.admin, &change.id, true, None).await;
        assert!(matches!(err, Err(CollabError::Store(_))));
        fx.store.inject_write_fault(false);

        assert_eq!(fx.staging.pending(&fx.admin, &fx.room_id).await.unwrap().len(), 1);
        assert_eq!(fx.canonical().await, "Hi");

        fx.staging.resolve(&fx.admin, &change.id, true, None).await.unwrap();
        assert_eq!(fx.canonical().await, "Hello");
    }

    #[tokio::test]
    async fn retry_after_failed_status_write_records_one_merge() {
        let fx = Fixture::with_content("Hi").await;
        let change = fx.staging.submit(&fx.editor, &fx.room_id, "Hello".into()).await.unwrap();

        fx.store.inject_write_fault_on(Some("update_change"));
        let err = fx.staging.resolve(&fx.admin, &change.id, true, None).await;
        assert!(matches!(err, Err(CollabError::Store(_))));
        fx.store.inject_write_fault_on(None);

        // Content and history landed, the status did not
        assert_eq!(fx.canonical().await, "Hello");
        assert_eq!(fx.staging.pending(&fx.admin, &fx.room_id).await.unwrap().len(), 1);

        let resolved = fx.staging.resolve(&fx.admin, &change.id, true, None).await.unwrap();
        assert_eq!(resolved.status, ChangeStatus::Approved);

        let history = fx.ledger.list(&fx.room_id).await.unwrap();
        let merges = history.iter().filter(|e| e.kind == HistoryKind::Merge).count();
        assert_eq!(merges, 1);
        assert_eq!(history[0].change_id.as_deref(), Some(change.id.as_str()));
        assert!(fx.staging.pending(&fx.admin, &fx.room_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn approval_is_pushed_to_the_room() {
        let fx = Fixture::with_content("Hi").await;
        let mut rx = fx.watch("c1", "viewer").await;
        let change = fx.staging.submit(&fx.editor, &fx.room_id, "Hello".into()).await.unwrap();
        fx.staging.resolve(&fx.admin, &change.id, true, None).await.unwrap();

        let frames: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(matches!(&frames[..], [
            OutboundMessage::ContentUpdate { content, .. },
            OutboundMessage::HistoryUpdated,
        ] if content == "Hello"));
    }
}
