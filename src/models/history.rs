use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::DiffLine;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Edit,
    Merge,
    Reject,
    Comment,
}

/// Append-only audit record of a committing action on a project.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub project_id: String,
    pub user_name: String,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    pub message: String,
    pub feedback: Option<String>,
    pub diff: Option<Vec<DiffLine>>,
    /// Staged change that produced a merge or reject entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(project_id: &str, user_name: &str, kind: HistoryKind, message: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            user_name: user_name.to_string(),
            kind,
            message,
            feedback: None,
            diff: None,
            change_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_feedback(mut self, feedback: Option<String>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn for_change(mut self, change_id: &str) -> Self {
        self.change_id = Some(change_id.to_string());
        self
    }

    pub fn with_diff(mut self, diff: Vec<DiffLine>) -> Self {
        self.diff = Some(diff);
        self
    }
}
