use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::history_service::HistoryLedger;
use super::room_service::project_for_tenant;
use crate::auth::auth;
use crate::db::CollabStore;
use crate::error::{CollabError, CollabResult};
use crate::models::{AddCommentRequest, Comment, HistoryEntry, HistoryKind, Principal};

pub struct CommentService {
    store: Arc<dyn CollabStore>,
    ledger: HistoryLedger,
}

impl CommentService {
    pub fn new(store: Arc<dyn CollabStore>, ledger: HistoryLedger) -> Self {
        Self { store, ledger }
    }

    pub async fn add(&self, author: &Principal, project_id: &str, req: AddCommentRequest) -> CollabResult<Comment> {
        let text = req.text.trim();
        let selected = req.selected_text.trim();
        if text.is_empty() || selected.is_empty() {
            return Err(CollabError::Validation("A comment needs text and a selection".to_string()));
        }
        if req.start_position > req.end_position {
            return Err(CollabError::Validation("Selection start lies after its end".to_string()));
        }
        project_for_tenant(self.store.as_ref(), project_id, &author.tenant_id).await?;

        let comment = Comment {
            id: format!("comment_{}", uuid::Uuid::new_v4()),
            project_id: project_id.to_string(),
            author_id: author.user_id.clone(),
            author: author.name.clone(),
            selected_text: selected.to_string(),
            text: text.to_string(),
            start_position: req.start_position,
            end_position: req.end_position,
            created_at: Utc::now(),
        };
        self.store.insert_comment(comment.clone()).await?;
        self.ledger
            .append(HistoryEntry::new(
                project_id,
                &author.name,
                HistoryKind::Comment,
                format!("{} commented on \"{}\"", author.name, comment.selected_text),
            ))
            .await?;

        info!("Comment {} added to project {} by {}", comment.id, project_id, author.user_id);
        Ok(comment)
    }

    pub async fn list(&self, caller: &Principal, project_id: &str) -> CollabResult<Vec<Comment>> {
        project_for_tenant(self.store.as_ref(), project_id, &caller.tenant_id).await?;
        Ok(self.store.list_comments(project_id).await?)
    }

    pub async fn delete(&self, caller: &Principal, project_id: &str, comment_id: &str) -> CollabResult<()> {
        auth::ensure_elevated(caller, "Only admins can delete comments")?;
        project_for_tenant(self.store.as_ref(), project_id, &caller.tenant_id).await?;
        if !self.store.delete_comment(project_id, comment_id).await? {
            return Err(CollabError::NotFound(format!("Comment '{}' not found", comment_id)));
        }
        info!("Comment {} deleted from project {} by {}", comment_id, project_id, caller.user_id);
        Ok(())
    }
}
