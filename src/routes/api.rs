use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    add_comment, analytics, create_room, create_webhook, delete_comment, diagnostics, get_project, health_check,
    join_room, leave_room, list_comments, list_rooms, project_history, ready_check, review_staged_change, save_content,
    staged_changes,
};
use crate::routes::auth_middleware::auth_middleware;
use crate::websocket::handler::websocket_handler;
use crate::AppState;

/// Routes reachable without a user token
pub fn create_public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
}

/// Create API routes
pub fn create_api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/rooms", post(create_room).get(list_rooms))
        .route("/rooms/:id/join", post(join_room))
        .route("/rooms/:id/leave", post(leave_room))
        .route("/webhooks", post(create_webhook))
        .route("/projects/:id", get(get_project))
        .route("/projects/:id/content", post(save_content).put(save_content))
        .route("/projects/:id/staged-changes", get(staged_changes))
        .route("/staged-changes/:id", put(review_staged_change))
        .route("/projects/:id/history", get(project_history))
        .route("/projects/:id/comments", post(add_comment).get(list_comments))
        .route("/projects/:id/comments/:comment_id", delete(delete_comment))
        .route("/analytics", get(analytics))
        .route("/diagnostics", get(diagnostics))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware)) // Applies to all routes added above
}

/// Socket upgrade. Authenticates with the tenant key instead of the user middleware.
pub fn create_ws_routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(websocket_handler))
}
