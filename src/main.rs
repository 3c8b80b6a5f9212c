use colabri_rooms::config::Config;
use colabri_rooms::db::{CollabStore, InMemoryStore};
use colabri_rooms::models::{Plan, Tenant};
use colabri_rooms::{build_app, AppState};
use std::panic;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Configuration first, the log level comes from it
    let loaded = Config::load();
    let log_level = loaded
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to the configured level, but allow debug for our app
            format!("colabri_rooms=debug,tower_http=debug,axum::rejection=trace,{}", log_level).into()
        }))
        .init();

    let config = loaded.unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });
    info!("Starting {} ({})...", config.service_name, config.environment);

    if config.auth_jwt_secret.is_none() {
        if config.is_development() {
            warn!("No JWT secret configured - user tokens will be rejected");
        } else {
            error!("No JWT secret configured outside development - user tokens will be rejected");
        }
    }

    let store = Arc::new(InMemoryStore::new());
    if let Some(key) = &config.demo_publishable_key {
        let secret = format!("sk_demo_{}", uuid::Uuid::new_v4().simple());
        let tenant = Tenant::new("cust_demo", "Demo", Plan::Free, key, &secret);
        match store.insert_tenant(tenant).await {
            Ok(_) => info!("Demo tenant seeded"),
            Err(e) => error!("Failed to seed demo tenant: {}", e),
        }
    }

    let state = Arc::new(AppState::new(config.clone(), store));
    let app = build_app(state);

    let listener = match tokio::net::TcpListener::bind(config.server_address()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", config.server_address(), e);
            return;
        }
    };

    info!("🚀 Server running on http://{}", config.server_address());
    info!("📡 WebSocket available at ws://{}/ws", config.server_address());
    info!("📚 Swagger UI available at http://{}/swagger", config.server_address());

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
