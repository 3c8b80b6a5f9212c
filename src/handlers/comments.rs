use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::error::CollabError;
use crate::models::{AddCommentRequest, CommentListResponse, CommentResponse, Principal, SuccessResponse};
use crate::AppState;

/// Anchor a comment to a text selection
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<String>,
    Json(request): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), CollabError> {
    let comment = state.comments.add(&principal, &project_id, request).await?;
    Ok((StatusCode::OK, Json(CommentResponse { success: true, comment })))
}

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<String>,
) -> Result<(StatusCode, Json<CommentListResponse>), CollabError> {
    let comments = state.comments.list(&principal, &project_id).await?;
    Ok((StatusCode::OK, Json(CommentListResponse { success: true, comments })))
}

/// Delete a comment (admins only)
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path((project_id, comment_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<SuccessResponse>), CollabError> {
    state.comments.delete(&principal, &project_id, &comment_id).await?;
    Ok((StatusCode::OK, Json(SuccessResponse { success: true })))
}
