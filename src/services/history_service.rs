use std::sync::Arc;
use tracing::debug;

use crate::db::CollabStore;
use crate::error::CollabResult;
use crate::models::HistoryEntry;

/// Append-only per-project audit trail.
#[derive(Clone)]
pub struct HistoryLedger {
    store: Arc<dyn CollabStore>,
}

impl HistoryLedger {
    pub fn new(store: Arc<dyn CollabStore>) -> Self {
        Self { store }
    }

    pub async fn append(&self, entry: HistoryEntry) -> CollabResult<()> {
        debug!("History {:?} appended to project {}", entry.kind, entry.project_id);
        self.store.append_history(entry).await?;
        Ok(())
    }

    /// Append a staged-change resolution once. A retry after a failed
    /// resolution finds the earlier entry and appends nothing.
    pub async fn append_for_change(&self, change_id: &str, entry: HistoryEntry) -> CollabResult<bool> {
        let existing = self.store.list_history(&entry.project_id).await?;
        if existing.iter().any(|e| e.change_id.as_deref() == Some(change_id)) {
            debug!("History for staged change {} already recorded", change_id);
            return Ok(false);
        }
        self.append(entry.for_change(change_id)).await?;
        Ok(true)
    }

    /// Newest first.
    pub async fn list(&self, project_id: &str) -> CollabResult<Vec<HistoryEntry>> {
        let mut entries = self.store.list_history(project_id).await?;
        entries.reverse();
        Ok(entries)
    }
}
