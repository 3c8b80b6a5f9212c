use axum::{extract::{State, Extension}, http::StatusCode, Json};
use std::sync::{Arc, Mutex, OnceLock};
use sysinfo::System;
use tracing::info;

use crate::{auth::auth, error::CollabError, models::{DiagnosticsResponse, Principal}, AppState};

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Process and room statistics
pub async fn diagnostics(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<(StatusCode, Json<DiagnosticsResponse>), CollabError> {
    // Only reviewers may look at process internals
    auth::ensure_elevated(&principal, "Admin access required")?;

    // Aggregate from the registry and the rooms
    let presence = state.presence.stats().await;
    let n_conn = state.connections.len().await as u32;
    let n_pending_changes = state.store.count_pending().await? as u32;
    let n_cached_tenants = state.connections.cached_tenants() as u32;
    let n_webhook_deliveries = state.webhooks.deliveries();

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| {
            Mutex::new(System::new_all())
        });
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0)
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Conn: {}, Rooms: {} ({} active)",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        n_conn,
        presence.rooms,
        presence.active_rooms
    );

    Ok((
        StatusCode::OK,
        Json(DiagnosticsResponse {
            n_conn,
            n_rooms: presence.rooms as u32,
            n_active_rooms: presence.active_rooms as u32,
            n_pending_changes,
            n_cached_tenants,
            n_webhook_deliveries,
            cpu_usage,
            memory_alloc,
            memory_total,
            memory_free,
        }),
    ))
}
