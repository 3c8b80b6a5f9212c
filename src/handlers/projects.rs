use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::error::CollabError;
use crate::models::{HistoryResponse, Principal, ProjectResponse, SaveContentRequest, SaveContentResponse};
use crate::services::room_service;
use crate::AppState;

/// Get a project, including its canonical content
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<String>,
) -> Result<(StatusCode, Json<ProjectResponse>), CollabError> {
    let project = room_service::project_for_tenant(state.store.as_ref(), &project_id, &principal.tenant_id).await?;
    Ok((StatusCode::OK, Json(ProjectResponse { success: true, project })))
}

/// Save content. Elevated callers commit, everyone else stages a change.
pub async fn save_content(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<String>,
    Json(request): Json<SaveContentRequest>,
) -> Result<(StatusCode, Json<SaveContentResponse>), CollabError> {
    let outcome = state.content.save(&principal, &project_id, request.content).await?;
    info!(
        "Content for project {} saved by {} (staged: {})",
        project_id,
        principal.user_id,
        outcome.is_staged()
    );
    Ok((
        StatusCode::OK,
        Json(SaveContentResponse { success: true, staged: outcome.is_staged() }),
    ))
}

/// Project history, newest first
pub async fn project_history(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<String>,
) -> Result<(StatusCode, Json<HistoryResponse>), CollabError> {
    room_service::project_for_tenant(state.store.as_ref(), &project_id, &principal.tenant_id).await?;
    let history = state.ledger.list(&project_id).await?;
    Ok((StatusCode::OK, Json(HistoryResponse { success: true, history })))
}
