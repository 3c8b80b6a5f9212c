use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::db::CollabStore;
use crate::error::{CollabError, CollabResult};
use crate::models::{Principal, Project, Room, WebhookEvent};
use crate::ws::PresenceManager;

/// Create a room and the project that backs it, within the tenant's plan.
pub async fn open_room(
    presence: &PresenceManager,
    store: &dyn CollabStore,
    principal: &Principal,
    name: &str,
    description: &str,
) -> CollabResult<Room> {
    let tenant = store
        .get_tenant(&principal.tenant_id)
        .await?
        .ok_or_else(|| CollabError::NotFound(format!("Tenant '{}' not found", principal.tenant_id)))?;

    let existing = presence.count_rooms(&tenant.id).await;
    if !tenant.limits.allows_another_room(existing) {
        warn!("Tenant {} hit its room limit ({} rooms)", tenant.id, existing);
        return Err(CollabError::Forbidden("Room limit exceeded for your plan".to_string()));
    }

    let room = presence.create_room(&tenant.id, name, description).await?;
    let now = Utc::now();
    store
        .insert_project(Project {
            id: room.id.clone(),
            tenant_id: tenant.id.clone(),
            name: room.name.clone(),
            description: room.description.clone(),
            content: String::new(),
            members: vec![principal.user_id.clone()],
            created_by: principal.user_id.clone(),
            created_at: now,
            updated_at: now,
        })
        .await?;

    info!("Project {} opened by {}", room.id, principal.user_id);
    presence
        .webhooks()
        .trigger(
            &tenant.id,
            WebhookEvent::RoomCreated,
            json!({ "roomId": room.id, "name": room.name, "createdBy": principal.user_id }),
        )
        .await;
    Ok(room)
}

/// Users act for themselves; admins may act for anyone in their tenant.
fn acting_user(principal: &Principal, user_id: Option<String>) -> CollabResult<String> {
    let user_id = user_id
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| principal.user_id.clone());
    if user_id != principal.user_id && !principal.is_elevated() {
        return Err(CollabError::Forbidden("Only admins can move other users".to_string()));
    }
    Ok(user_id)
}

/// Join a room without a live connection.
pub async fn enter_room(
    presence: &PresenceManager,
    store: &dyn CollabStore,
    principal: &Principal,
    room_id: &str,
    user_id: Option<String>,
    user_data: Value,
) -> CollabResult<Room> {
    let user_id = acting_user(principal, user_id)?;
    let room = presence.admit_member(room_id, &principal.tenant_id, &user_id, user_data).await?;
    store.add_member(room_id, &user_id).await?;
    Ok(room)
}

/// Leave a room without a live connection. Leaving a room one is not in is a no-op.
pub async fn exit_room(presence: &PresenceManager, principal: &Principal, room_id: &str, user_id: Option<String>) -> CollabResult<()> {
    let user_id = acting_user(principal, user_id)?;
    presence.room_for_tenant(room_id, &principal.tenant_id).await?;
    presence.leave_room(room_id, &user_id, None).await;
    Ok(())
}

/// Projects of another tenant are reported as missing.
pub async fn project_for_tenant(store: &dyn CollabStore, project_id: &str, tenant_id: &str) -> CollabResult<Project> {
    match store.get_project(project_id).await? {
        Some(project) if project.tenant_id == tenant_id => Ok(project),
        _ => Err(CollabError::NotFound(format!("Project '{}' not found", project_id))),
    }
}
