use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::models::{Comment, HistoryEntry, Project, StagedChange, Tenant};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record '{0}' does not exist")]
    Missing(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreFuture<'a, T> = BoxFuture<'a, Result<T, StoreError>>;

/// Record store for tenants and project state.
///
/// Every call is a potential suspension point. Room presence never goes
/// through here; content, staged changes, history and comments do.
pub trait CollabStore: Send + Sync {
    fn insert_tenant(&self, tenant: Tenant) -> StoreFuture<'_, ()>;
    fn find_tenant_by_key<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Tenant>>;
    fn get_tenant<'a>(&'a self, tenant_id: &'a str) -> StoreFuture<'a, Option<Tenant>>;

    fn insert_project(&self, project: Project) -> StoreFuture<'_, ()>;
    fn get_project<'a>(&'a self, project_id: &'a str) -> StoreFuture<'a, Option<Project>>;
    fn set_content<'a>(&'a self, project_id: &'a str, content: String) -> StoreFuture<'a, ()>;
    fn add_member<'a>(&'a self, project_id: &'a str, user_id: &'a str) -> StoreFuture<'a, ()>;

    fn insert_change(&self, change: StagedChange) -> StoreFuture<'_, ()>;
    fn get_change<'a>(&'a self, change_id: &'a str) -> StoreFuture<'a, Option<StagedChange>>;
    fn update_change(&self, change: StagedChange) -> StoreFuture<'_, ()>;
    /// All changes of a project, oldest first.
    fn list_changes<'a>(&'a self, project_id: &'a str) -> StoreFuture<'a, Vec<StagedChange>>;
    fn count_pending(&self) -> StoreFuture<'_, usize>;

    fn append_history(&self, entry: HistoryEntry) -> StoreFuture<'_, ()>;
    /// History of a project in append order.
    fn list_history<'a>(&'a self, project_id: &'a str) -> StoreFuture<'a, Vec<HistoryEntry>>;

    fn insert_comment(&self, comment: Comment) -> StoreFuture<'_, ()>;
    fn delete_comment<'a>(&'a self, project_id: &'a str, comment_id: &'a str) -> StoreFuture<'a, bool>;
    fn list_comments<'a>(&'a self, project_id: &'a str) -> StoreFuture<'a, Vec<Comment>>;
}
