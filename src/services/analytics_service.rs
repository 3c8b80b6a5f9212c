use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::AnalyticsSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsEvent {
    RoomJoin,
    RoomLeave,
    ContentChange,
}

/// Per-tenant event counters.
#[derive(Debug, Default)]
pub struct Analytics {
    counters: RwLock<HashMap<String, AnalyticsSummary>>,
}

impl Analytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn track(&self, tenant_id: &str, event: AnalyticsEvent) {
        let mut counters = self.counters.write().await;
        let summary = counters.entry(tenant_id.to_string()).or_default();
        summary.total_events += 1;
        match event {
            AnalyticsEvent::RoomJoin => summary.room_joins += 1,
            AnalyticsEvent::RoomLeave => summary.room_leaves += 1,
            AnalyticsEvent::ContentChange => summary.content_changes += 1,
        }
    }

    pub async fn summary(&self, tenant_id: &str) -> AnalyticsSummary {
        self.counters.read().await.get(tenant_id).cloned().unwrap_or_default()
    }
}
