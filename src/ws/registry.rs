use moka::future::Cache;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::presence::PresenceManager;
use super::room::Outbox;
use crate::db::CollabStore;
use crate::error::{CollabError, CollabResult};
use crate::models::{Principal, Role, Tenant};
use crate::services::auth_service;

/// What a client presents when opening a socket.
#[derive(Debug, Clone, Default)]
pub struct Credential {
    pub api_key: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    pub tenant: Tenant,
    pub principal: Option<Principal>,
}

/// A live transport session. Never persisted.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: String,
    pub tenant_id: String,
    pub principal: Option<Principal>,
    pub user_id: Option<String>,
    pub room_id: Option<String>,
    pub outbox: Outbox,
}

impl Connection {
    pub fn new(id: String, client: &AuthenticatedClient, outbox: Outbox) -> Self {
        Self {
            id,
            tenant_id: client.tenant.id.clone(),
            principal: client.principal.clone(),
            user_id: client.principal.as_ref().map(|p| p.user_id.clone()),
            room_id: None,
            outbox,
        }
    }

    pub fn role(&self) -> Role {
        self.principal.as_ref().map(|p| p.role).unwrap_or_default()
    }

    pub fn display_name(&self) -> String {
        match (&self.principal, &self.user_id) {
            (Some(p), _) => p.name.clone(),
            (None, Some(uid)) => uid.clone(),
            (None, None) => self.id.clone(),
        }
    }
}

/// Maps connection ↔ user ↔ room.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<String, Connection>>,
    tenant_cache: Cache<String, Tenant>,
    store: Arc<dyn CollabStore>,
    jwt_secret: Option<String>,
}

impl ConnectionRegistry {
    pub fn new(store: Arc<dyn CollabStore>, jwt_secret: Option<String>, tenant_cache_ttl: Duration) -> Self {
        let tenant_cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(tenant_cache_ttl)
            .build();
        info!("Tenant key cache initialized");
        Self {
            connections: RwLock::new(HashMap::new()),
            tenant_cache,
            store,
            jwt_secret,
        }
    }

    /// Resolve the tenant behind an API key, and the user behind an optional token.
    pub async fn authenticate(&self, credential: &Credential) -> CollabResult<AuthenticatedClient> {
        let key = credential
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CollabError::Unauthorized("API key required".to_string()))?;

        let tenant = match self.tenant_cache.get(key).await {
            Some(tenant) => tenant,
            None => {
                let tenant = self
                    .store
                    .find_tenant_by_key(key)
                    .await?
                    .ok_or_else(|| CollabError::Unauthorized("Invalid API key".to_string()))?;
                self.tenant_cache.insert(key.to_string(), tenant.clone()).await;
                tenant
            }
        };

        let principal = match credential.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => {
                let principal = auth_service::principal_from_token(token, self.jwt_secret.as_deref())
                    .map_err(|e| {
                        warn!("Socket token rejected: {}", e);
                        CollabError::Unauthorized("Invalid user token".to_string())
                    })?;
                if principal.tenant_id != tenant.id {
                    return Err(CollabError::Unauthorized("Token does not belong to this tenant".to_string()));
                }
                Some(principal)
            }
            None => None,
        };

        Ok(AuthenticatedClient { tenant, principal })
    }

    pub async fn register(&self, connection: Connection) {
        info!("Connection {} registered for tenant {}", connection.id, connection.tenant_id);
        self.connections.write().await.insert(connection.id.clone(), connection);
    }

    pub async fn get(&self, conn_id: &str) -> Option<Connection> {
        self.connections.read().await.get(conn_id).cloned()
    }

    /// Record the room a connection entered. Returns the room and user it was
    /// bound to before, which the caller must leave.
    pub async fn bind_room(&self, conn_id: &str, room_id: &str, user_id: &str) -> CollabResult<Option<(String, String)>> {
        let mut connections = self.connections.write().await;
        let connection = connections
            .get_mut(conn_id)
            .ok_or_else(|| CollabError::NotFound(format!("Connection '{}' not registered", conn_id)))?;
        let previous = match (connection.room_id.take(), connection.user_id.clone()) {
            (Some(room), Some(user)) => Some((room, user)),
            _ => None,
        };
        connection.room_id = Some(room_id.to_string());
        connection.user_id = Some(user_id.to_string());
        Ok(previous)
    }

    /// Forget the room binding. Returns what was bound.
    pub async fn unbind_room(&self, conn_id: &str) -> Option<(String, String)> {
        let mut connections = self.connections.write().await;
        let connection = connections.get_mut(conn_id)?;
        let room = connection.room_id.take()?;
        Some((room, connection.user_id.clone().unwrap_or_default()))
    }

    /// Idempotent. Vacates the connection's room, which drops its cursor and
    /// tells the remaining peers.
    pub async fn deregister(&self, conn_id: &str, presence: &PresenceManager) {
        let removed = self.connections.write().await.remove(conn_id);
        let Some(connection) = removed else {
            return;
        };
        if let (Some(room_id), Some(user_id)) = (&connection.room_id, &connection.user_id) {
            presence.leave_room(room_id, user_id, Some(conn_id)).await;
        }
        info!("Connection {} deregistered", conn_id);
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn cached_tenants(&self) -> u64 {
        self.tenant_cache.entry_count()
    }
}
