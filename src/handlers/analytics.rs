use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::models::{AnalyticsResponse, Principal};
use crate::AppState;

/// Event counters of the caller's tenant
pub async fn analytics(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> (StatusCode, Json<AnalyticsResponse>) {
    let analytics = state.analytics.summary(&principal.tenant_id).await;
    (StatusCode::OK, Json(AnalyticsResponse { success: true, analytics }))
}
