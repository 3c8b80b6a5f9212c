use utoipa::OpenApi;
use crate::models::*;

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Create a room and its project
#[utoipa::path(
    post,
    path = "/rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = RoomResponse),
        (status = 403, description = "Room limit exceeded for the tenant's plan", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_room_doc() {}

/// List the tenant's rooms
#[utoipa::path(
    get,
    path = "/rooms",
    responses(
        (status = 200, description = "Rooms of the caller's tenant", body = RoomListResponse)
    )
)]
#[allow(dead_code)]
pub async fn list_rooms_doc() {}

/// Join a room without a socket
#[utoipa::path(
    post,
    path = "/rooms/{id}/join",
    params(("id" = String, Path, description = "Room id")),
    request_body = JoinRoomRequest,
    responses(
        (status = 200, description = "Room after the join", body = RoomResponse),
        (status = 404, description = "Room not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn join_room_doc() {}

/// Leave a room without a socket
#[utoipa::path(
    post,
    path = "/rooms/{id}/leave",
    params(("id" = String, Path, description = "Room id")),
    request_body = LeaveRoomRequest,
    responses(
        (status = 200, description = "Left the room", body = SuccessResponse)
    )
)]
#[allow(dead_code)]
pub async fn leave_room_doc() {}

/// Register a webhook for room events
#[utoipa::path(
    post,
    path = "/webhooks",
    request_body = CreateWebhookRequest,
    responses(
        (status = 201, description = "Webhook registered", body = WebhookResponse),
        (status = 403, description = "Caller may not register webhooks", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_webhook_doc() {}

/// Get a project
#[utoipa::path(
    get,
    path = "/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project with canonical content", body = ProjectResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_project_doc() {}

/// Save project content. Non-admins get a staged change instead of a commit.
#[utoipa::path(
    post,
    path = "/projects/{id}/content",
    params(("id" = String, Path, description = "Project id")),
    request_body = SaveContentRequest,
    responses(
        (status = 200, description = "Content committed or staged", body = SaveContentResponse)
    )
)]
#[allow(dead_code)]
pub async fn save_content_doc() {}

/// Pending staged changes of a project
#[utoipa::path(
    get,
    path = "/projects/{id}/staged-changes",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Pending changes, oldest first", body = StagedChangesResponse)
    )
)]
#[allow(dead_code)]
pub async fn staged_changes_doc() {}

/// Approve or reject a staged change
#[utoipa::path(
    put,
    path = "/staged-changes/{id}",
    params(("id" = String, Path, description = "Staged change id")),
    request_body = ReviewChangeRequest,
    responses(
        (status = 200, description = "Change resolved", body = ReviewChangeResponse),
        (status = 403, description = "Caller may not review", body = ErrorResponse),
        (status = 409, description = "Change already resolved", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn review_staged_change_doc() {}

/// Project history, newest first
#[utoipa::path(
    get,
    path = "/projects/{id}/history",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "History entries", body = HistoryResponse)
    )
)]
#[allow(dead_code)]
pub async fn project_history_doc() {}

/// Add a comment to a text selection
#[utoipa::path(
    post,
    path = "/projects/{id}/comments",
    params(("id" = String, Path, description = "Project id")),
    request_body = AddCommentRequest,
    responses(
        (status = 200, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Invalid selection", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn add_comment_doc() {}

/// List the comments of a project
#[utoipa::path(
    get,
    path = "/projects/{id}/comments",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Comments", body = CommentListResponse)
    )
)]
#[allow(dead_code)]
pub async fn list_comments_doc() {}

/// Delete a comment
#[utoipa::path(
    delete,
    path = "/projects/{id}/comments/{comment_id}",
    params(
        ("id" = String, Path, description = "Project id"),
        ("comment_id" = String, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = SuccessResponse),
        (status = 403, description = "Caller may not delete comments", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn delete_comment_doc() {}

/// Event counters of the caller's tenant
#[utoipa::path(
    get,
    path = "/analytics",
    responses(
        (status = 200, description = "Analytics summary", body = AnalyticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn analytics_doc() {}

/// Process diagnostics
#[utoipa::path(
    get,
    path = "/diagnostics",
    responses(
        (status = 200, description = "Diagnostics", body = DiagnosticsResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        create_room_doc,
        list_rooms_doc,
        join_room_doc,
        leave_room_doc,
        create_webhook_doc,
        get_project_doc,
        save_content_doc,
        staged_changes_doc,
        review_staged_change_doc,
        project_history_doc,
        add_comment_doc,
        list_comments_doc,
        delete_comment_doc,
        analytics_doc,
        diagnostics_doc,
    ),
    components(
        schemas(
            HealthResponse, ErrorResponse, DiagnosticsResponse,
            Room, Project, Comment, StagedChange, ChangeStatus, DiffLine, DiffKind,
            HistoryEntry, HistoryKind,
            CreateRoomRequest, RoomResponse, RoomListResponse, ProjectResponse,
            SaveContentRequest, SaveContentResponse, StagedChangesResponse,
            ReviewChangeRequest, ReviewChangeResponse, HistoryResponse,
            AddCommentRequest, CommentResponse, CommentListResponse, SuccessResponse,
            AnalyticsSummary, AnalyticsResponse,
            JoinRoomRequest, LeaveRoomRequest, CreateWebhookRequest, WebhookResponse, Webhook, WebhookEvent
        )
    ),
    tags(
        (name = "rooms", description = "Rooms, projects, review workflow and comments")
    )
)]
pub struct ApiDoc;
