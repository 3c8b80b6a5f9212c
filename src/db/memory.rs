use chrono::Utc;
use std::collections::HashMap;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(test)]
use std::sync::Mutex;
use tokio::sync::RwLock;

use super::store::{CollabStore, StoreError, StoreFuture};
use crate::models::{ChangeStatus, Comment, HistoryEntry, Project, StagedChange, Tenant};

#[derive(Default)]
struct Tables {
    tenants: HashMap<String, Tenant>,
    projects: HashMap<String, Project>,
    changes: HashMap<String, StagedChange>,
    history: HashMap<String, Vec<HistoryEntry>>,
    comments: HashMap<String, Vec<Comment>>,
}

/// Process-local store used by the binary and the tests.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    #[cfg(test)]
    write_fault: AtomicBool,
    #[cfg(test)]
    failing_write: Mutex<Option<&'static str>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail until switched off again.
    #[cfg(test)]
    pub fn inject_write_fault(&self, on: bool) {
        self.write_fault.store(on, Ordering::SeqCst);
    }

    /// Make only the named write operation fail, `None` to clear.
    #[cfg(test)]
    pub fn inject_write_fault_on(&self, op: Option<&'static str>) {
        if let Ok(mut failing) = self.failing_write.lock() {
            *failing = op;
        }
    }

    fn writable(&self, op: &'static str) -> Result<(), StoreError> {
        #[cfg(test)]
        {
            let targeted = self.failing_write.lock().map(|f| *f == Some(op)).unwrap_or(false);
            if targeted || self.write_fault.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable(format!("injected write fault on {}", op)));
            }
        }
        #[cfg(not(test))]
        let _ = op;
        Ok(())
    }
}

impl CollabStore for InMemoryStore {
    fn insert_tenant(&self, tenant: Tenant) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.writable("insert_tenant")?;
            self.tables.write().await.tenants.insert(tenant.id.clone(), tenant);
            Ok(())
        })
    }

    fn find_tenant_by_key<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Tenant>> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables.tenants.values().find(|t| t.accepts_key(key)).cloned())
        })
    }

    fn get_tenant<'a>(&'a self, tenant_id: &'a str) -> StoreFuture<'a, Option<Tenant>> {
        Box::pin(async move { Ok(self.tables.read().await.tenants.get(tenant_id).cloned()) })
    }

    fn insert_project(&self, project: Project) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.writable("insert_project")?;
            self.tables.write().await.projects.insert(project.id.clone(), project);
            Ok(())
        })
    }

    fn get_project<'a>(&'a self, project_id: &'a str) -> StoreFuture<'a, Option<Project>> {
        Box::pin(async move { Ok(self.tables.read().await.projects.get(project_id).cloned()) })
    }

    fn set_content<'a>(&'a self, project_id: &'a str, content: String) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.writable("set_content")?;
            let mut tables = self.tables.write().await;
            let project = tables
                .projects
                .get_mut(project_id)
                .ok_or_else(|| StoreError::Missing(project_id.to_string()))?;
            project.content = content;
            project.updated_at = Utc::now();
            Ok(())
        })
    }

    fn add_member<'a>(&'a self, project_id: &'a str, user_id: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.writable("add_member")?;
            let mut tables = self.tables.write().await;
            let project = tables
                .projects
                .get_mut(project_id)
                .ok_or_else(|| StoreError::Missing(project_id.to_string()))?;
            if !project.members.iter().any(|m| m == user_id) {
                project.members.push(user_id.to_string());
            }
            Ok(())
        })
    }

    fn insert_change(&self, change: StagedChange) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.writable("insert_change")?;
            self.tables.write().await.changes.insert(change.id.clone(), change);
            Ok(())
        })
    }

    fn get_change<'a>(&'a self, change_id: &'a str) -> StoreFuture<'a, Option<StagedChange>> {
        Box::pin(async move { Ok(self.tables.read().await.changes.get(change_id).cloned()) })
    }

    fn update_change(&self, change: StagedChange) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.writable("update_change")?;
            let mut tables = self.tables.write().await;
            match tables.changes.get_mut(&change.id) {
                Some(slot) => {
                    *slot = change;
                    Ok(())
                }
                None => Err(StoreError::Missing(change.id)),
            }
        })
    }

    fn list_changes<'a>(&'a self, project_id: &'a str) -> StoreFuture<'a, Vec<StagedChange>> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            let mut changes: Vec<StagedChange> = tables
                .changes
                .values()
                .filter(|c| c.project_id == project_id)
                .cloned()
                .collect();
            changes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            Ok(changes)
        })
    }

    fn count_pending(&self) -> StoreFuture<'_, usize> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables.changes.values().filter(|c| c.status == ChangeStatus::Pending).count())
        })
    }

    fn append_history(&self, entry: HistoryEntry) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.writable("append_history")?;
            self.tables
                .write()
                .await
                .history
                .entry(entry.project_id.clone())
                .or_default()
                .push(entry);
            Ok(())
        })
    }

    fn list_history<'a>(&'a self, project_id: &'a str) -> StoreFuture<'a, Vec<HistoryEntry>> {
        Box::pin(async move {
            Ok(self.tables.read().await.history.get(project_id).cloned().unwrap_or_default())
        })
    }

    fn insert_comment(&self, comment: Comment) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.writable("insert_comment")?;
            self.tables
                .write()
                .await
                .comments
                .entry(comment.project_id.clone())
                .or_default()
                .push(comment);
            Ok(())
        })
    }

    fn delete_comment<'a>(&'a self, project_id: &'a str, comment_id: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            self.writable("delete_comment")?;
            let mut tables = self.tables.write().await;
            let Some(comments) = tables.comments.get_mut(project_id) else {
                return Ok(false);
            };
            let before = comments.len();
            comments.retain(|c| c.id != comment_id);
            Ok(comments.len() != before)
        })
    }

    fn list_comments<'a>(&'a self, project_id: &'a str) -> StoreFuture<'a, Vec<Comment>> {
        Box::pin(async move {
            Ok(self.tables.read().await.comments.get(project_id).cloned().unwrap_or_default())
        })
    }
}
