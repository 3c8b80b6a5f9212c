use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Room lifecycle events a tenant can subscribe to.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEvent {
    #[serde(rename = "room.created")]
    RoomCreated,
    #[serde(rename = "room.joined")]
    RoomJoined,
    #[serde(rename = "room.left")]
    RoomLeft,
}

impl WebhookEvent {
    pub fn all() -> Vec<WebhookEvent> {
        vec![WebhookEvent::RoomCreated, WebhookEvent::RoomJoined, WebhookEvent::RoomLeft]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEvent::RoomCreated => "room.created",
            WebhookEvent::RoomJoined => "room.joined",
            WebhookEvent::RoomLeft => "room.left",
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub tenant_id: String,
    pub url: String,
    pub events: Vec<WebhookEvent>,
    /// Returned once on registration so the receiver can verify deliveries.
    pub secret: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Webhook {
    pub fn wants(&self, event: WebhookEvent) -> bool {
        self.active && self.events.contains(&event)
    }
}
