use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::auth::auth;
use crate::error::CollabError;
use crate::models::{CreateWebhookRequest, Principal, WebhookResponse};
use crate::AppState;

/// Subscribe a url to the tenant's room events (admins only)
pub async fn create_webhook(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateWebhookRequest>,
) -> Result<(StatusCode, Json<WebhookResponse>), CollabError> {
    auth::ensure_elevated(&principal, "Only admins can register webhooks")?;
    let webhook = state.webhooks.register(&principal.tenant_id, request).await?;
    Ok((StatusCode::CREATED, Json(WebhookResponse { success: true, webhook })))
}
