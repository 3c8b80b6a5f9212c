use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Persisted document state behind a room.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: String,
    pub content: String,
    pub members: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A note anchored to raw character offsets of the content it was made on.
/// Offsets are not re-anchored when the content later changes.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub project_id: String,
    pub author_id: String,
    pub author: String,
    pub selected_text: String,
    pub text: String,
    pub start_position: usize,
    pub end_position: usize,
    pub created_at: DateTime<Utc>,
}
