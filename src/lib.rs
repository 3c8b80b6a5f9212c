pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod websocket;
pub mod ws;

#[cfg(test)]
mod testing;

use axum::{http::HeaderValue, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;
use db::CollabStore;
use services::{Analytics, CommentService, ContentChannel, HistoryLedger, StagingEngine, WebhookRegistry};
use ws::{ConnectionRegistry, CursorBroadcaster, PresenceManager};

/// Process-wide state shared by the REST handlers and socket sessions.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn CollabStore>,
    pub connections: ConnectionRegistry,
    pub presence: Arc<PresenceManager>,
    pub cursors: CursorBroadcaster,
    pub ledger: HistoryLedger,
    pub staging: Arc<StagingEngine>,
    pub content: ContentChannel,
    pub comments: CommentService,
    pub analytics: Arc<Analytics>,
    pub webhooks: Arc<WebhookRegistry>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn CollabStore>) -> Self {
        let webhooks = Arc::new(WebhookRegistry::new());
        let presence = Arc::new(PresenceManager::with_webhooks(webhooks.clone()));
        let analytics = Arc::new(Analytics::new());
        let ledger = HistoryLedger::new(store.clone());
        let staging = Arc::new(StagingEngine::new(store.clone(), presence.clone(), ledger.clone()));
        let content = ContentChannel::new(
            store.clone(),
            presence.clone(),
            staging.clone(),
            ledger.clone(),
            analytics.clone(),
        );
        let connections = ConnectionRegistry::new(
            store.clone(),
            config.auth_jwt_secret.clone(),
            config.tenant_cache_ttl(),
        );

        Self {
            cursors: CursorBroadcaster::new(config.typing_idle()),
            comments: CommentService::new(store.clone(), ledger.clone()),
            connections,
            presence,
            ledger,
            staging,
            content,
            analytics,
            webhooks,
            store,
            config,
        }
    }
}

/// Assemble the full HTTP + socket application.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(routes::create_public_routes())
        .merge(routes::create_api_routes(state.clone()))
        .merge(routes::create_ws_routes())
        .with_state(state)
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .layer(cors)
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = config.cors_origin_list();
    if origins.is_empty() {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    CorsLayer::new().allow_origin(parsed).allow_methods(Any).allow_headers(Any)
}
