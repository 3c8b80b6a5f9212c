use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::error::CollabError;
use crate::services::auth_service::{get_auth_token, principal_from_token};
use crate::AppState;

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, CollabError> {
    // 1. Get the auth token from the request
    let token = get_auth_token(&req).map_err(|e| {
        info!("Rejected unauthenticated request: {}", e);
        CollabError::Unauthorized("Authentication required".to_string())
    })?;

    // 2. Validate the token and resolve the caller
    let principal = principal_from_token(&token, state.config.auth_jwt_secret.as_deref()).map_err(|e| {
        error!("{}", e);
        CollabError::Unauthorized("Invalid or expired token".to_string())
    })?;

    // 3. Hand the caller to downstream handlers
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
