use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Unchanged,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    pub line_number: usize,
    #[serde(rename = "type")]
    pub kind: DiffKind,
    pub content: String,
}

impl DiffLine {
    pub fn new(line_number: usize, kind: DiffKind, content: &str) -> Self {
        Self { line_number, kind, content: content.to_string() }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Pending,
    Approved,
    Rejected,
}

impl ChangeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeStatus::Pending => "pending",
            ChangeStatus::Approved => "approved",
            ChangeStatus::Rejected => "rejected",
        }
    }
}

/// An edit proposed by a non-elevated user, frozen against the canonical
/// content at submission time.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StagedChange {
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    pub user_name: String,
    pub original_content: String,
    pub proposed_content: String,
    pub diff: Vec<DiffLine>,
    pub status: ChangeStatus,
    pub feedback: Option<String>,
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl StagedChange {
    pub fn is_pending(&self) -> bool {
        self.status == ChangeStatus::Pending
    }
}
