use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{CollabError, CollabResult};
use crate::models::{CreateWebhookRequest, Webhook, WebhookEvent};

/// Per-tenant webhook subscriptions for room lifecycle events.
#[derive(Debug, Default)]
pub struct WebhookRegistry {
    hooks: RwLock<HashMap<String, Vec<Webhook>>>,
    deliveries: AtomicU64,
}

impl WebhookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, tenant_id: &str, req: CreateWebhookRequest) -> CollabResult<Webhook> {
        let url = req.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CollabError::Validation("Webhook url must be an http(s) url".to_string()));
        }
        let events = match req.events {
            Some(events) if !events.is_empty() => events,
            _ => WebhookEvent::all(),
        };

        let webhook = Webhook {
            id: format!("wh_{}", uuid::Uuid::new_v4()),
            tenant_id: tenant_id.to_string(),
            url: url.to_string(),
            events,
            secret: format!("whsec_{}", uuid::Uuid::new_v4().simple()),
            active: true,
            created_at: Utc::now(),
        };
        self.hooks
            .write()
            .await
            .entry(tenant_id.to_string())
            .or_default()
            .push(webhook.clone());

        info!("Webhook {} registered for tenant {} -> {}", webhook.id, tenant_id, webhook.url);
        Ok(webhook)
    }

    pub async fn list(&self, tenant_id: &str) -> Vec<Webhook> {
        self.hooks.read().await.get(tenant_id).cloned().unwrap_or_default()
    }

    /// Deliver an event to the tenant's subscribed webhooks. Delivery is a log
    /// line per webhook. Returns how many webhooks were hit.
    pub async fn trigger(&self, tenant_id: &str, event: WebhookEvent, payload: Value) -> usize {
        let hooks = self.hooks.read().await;
        let Some(hooks) = hooks.get(tenant_id) else {
            debug!("No webhooks for tenant {} ({})", tenant_id, event.as_str());
            return 0;
        };

        let mut delivered = 0;
        for hook in hooks.iter().filter(|h| h.wants(event)) {
            info!("Webhook triggered: {} event={} data={}", hook.url, event.as_str(), payload);
            delivered += 1;
        }
        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);
        delivered
    }

    /// Deliveries since start, across tenants.
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }
}
