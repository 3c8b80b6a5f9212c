use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use serde_json::Value;

use super::{Comment, HistoryEntry, Project, Room, StagedChange, Webhook, WebhookEvent};

#[derive(Deserialize, ToSchema, Debug)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, ToSchema)]
pub struct RoomResponse {
    pub success: bool,
    pub room: Room,
}

#[derive(Serialize, ToSchema)]
pub struct RoomListResponse {
    pub success: bool,
    pub rooms: Vec<Room>,
}

#[derive(Serialize, ToSchema)]
pub struct ProjectResponse {
    pub success: bool,
    pub project: Project,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct SaveContentRequest {
    pub content: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct SaveContentResponse {
    pub success: bool,
    pub staged: bool,
}

#[derive(Serialize, ToSchema)]
pub struct StagedChangesResponse {
    pub success: bool,
    pub changes: Vec<StagedChange>,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct ReviewChangeRequest {
    pub approve: bool,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ReviewChangeResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<HistoryEntry>,
}

#[derive(Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub text: String,
    pub selected_text: String,
    pub start_position: usize,
    pub end_position: usize,
}

#[derive(Serialize, ToSchema)]
pub struct CommentResponse {
    pub success: bool,
    pub comment: Comment,
}

#[derive(Serialize, ToSchema)]
pub struct CommentListResponse {
    pub success: bool,
    pub comments: Vec<Comment>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_events: u64,
    pub room_joins: u64,
    pub room_leaves: u64,
    pub content_changes: u64,
}

#[derive(Serialize, ToSchema)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub analytics: AnalyticsSummary,
}

#[derive(Deserialize, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    /// Defaults to the caller's own user id
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub user_data: Value,
}

#[derive(Deserialize, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct CreateWebhookRequest {
    pub url: String,
    /// All room events when omitted
    #[serde(default)]
    pub events: Option<Vec<WebhookEvent>>,
}

#[derive(Serialize, ToSchema)]
pub struct WebhookResponse {
    pub success: bool,
    pub webhook: Webhook,
}
