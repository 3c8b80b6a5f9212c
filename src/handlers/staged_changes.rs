use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::error::CollabError;
use crate::models::{ChangeStatus, Principal, ReviewChangeRequest, ReviewChangeResponse, StagedChangesResponse};
use crate::AppState;

/// Pending staged changes of a project
pub async fn staged_changes(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<String>,
) -> Result<(StatusCode, Json<StagedChangesResponse>), CollabError> {
    let changes = state.staging.pending(&principal, &project_id).await?;
    Ok((StatusCode::OK, Json(StagedChangesResponse { success: true, changes })))
}

/// Approve or reject a staged change
pub async fn review_staged_change(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(change_id): Path<String>,
    Json(request): Json<ReviewChangeRequest>,
) -> Result<(StatusCode, Json<ReviewChangeResponse>), CollabError> {
    let resolved = state
        .staging
        .resolve(&principal, &change_id, request.approve, request.feedback)
        .await?;

    let message = match resolved.status {
        ChangeStatus::Approved => "Changes approved and merged successfully",
        _ => "Changes rejected with feedback",
    };
    Ok((
        StatusCode::OK,
        Json(ReviewChangeResponse { success: true, message: message.to_string() }),
    ))
}
