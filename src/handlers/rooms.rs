use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::error::CollabError;
use crate::models::{
    CreateRoomRequest, JoinRoomRequest, LeaveRoomRequest, Principal, RoomListResponse, RoomResponse, SuccessResponse,
};
use crate::services::{room_service, AnalyticsEvent};
use crate::AppState;

/// Create a room (and its project) for the caller's tenant
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), CollabError> {
    let room = room_service::open_room(
        &state.presence,
        state.store.as_ref(),
        &principal,
        &request.name,
        &request.description,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(RoomResponse { success: true, room })))
}

/// List the caller tenant's rooms
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> (StatusCode, Json<RoomListResponse>) {
    let rooms = state.presence.list_rooms(&principal.tenant_id).await;
    (StatusCode::OK, Json(RoomListResponse { success: true, rooms }))
}

/// Join a room without opening a socket
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(room_id): Path<String>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), CollabError> {
    let room = room_service::enter_room(
        &state.presence,
        state.store.as_ref(),
        &principal,
        &room_id,
        request.user_id,
        request.user_data,
    )
    .await?;
    state.analytics.track(&principal.tenant_id, AnalyticsEvent::RoomJoin).await;
    Ok((StatusCode::OK, Json(RoomResponse { success: true, room })))
}

/// Leave a room without a socket
pub async fn leave_room(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(room_id): Path<String>,
    Json(request): Json<LeaveRoomRequest>,
) -> Result<(StatusCode, Json<SuccessResponse>), CollabError> {
    room_service::exit_room(&state.presence, &principal, &room_id, request.user_id).await?;
    state.analytics.track(&principal.tenant_id, AnalyticsEvent::RoomLeave).await;
    Ok((StatusCode::OK, Json(SuccessResponse { success: true })))
}
