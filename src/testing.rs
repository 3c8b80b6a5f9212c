//! Shared fixture for service tests.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::db::{CollabStore, InMemoryStore};
use crate::models::{OutboundMessage, Plan, Principal, Role, Tenant};
use crate::services::{room_service, Analytics, CommentService, ContentChannel, HistoryLedger, StagingEngine};
use crate::ws::{Participant, PresenceManager};

pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub presence: Arc<PresenceManager>,
    pub ledger: HistoryLedger,
    pub staging: Arc<StagingEngine>,
    pub content: ContentChannel,
    pub comments: CommentService,
    pub analytics: Arc<Analytics>,
    pub admin: Principal,
    pub editor: Principal,
    pub other_editor: Principal,
    pub room_id: String,
}

fn principal(user_id: &str, role: Role) -> Principal {
    Principal {
        user_id: user_id.to_string(),
        name: user_id.to_uppercase(),
        role,
        tenant_id: "cust_test".to_string(),
    }
}

impl Fixture {
    /// Tenant `cust_test` on the free plan with one room, "standup".
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_tenant(Tenant::new("cust_test", "Test", Plan::Free, "pk_test", "sk_test"))
            .await
            .unwrap();
        let dyn_store: Arc<dyn CollabStore> = store.clone();

        let presence = Arc::new(PresenceManager::new());
        let analytics = Arc::new(Analytics::new());
        let ledger = HistoryLedger::new(dyn_store.clone());
        let staging = Arc::new(StagingEngine::new(dyn_store.clone(), presence.clone(), ledger.clone()));
        let content = ContentChannel::new(
            dyn_store.clone(),
            presence.clone(),
            staging.clone(),
            ledger.clone(),
            analytics.clone(),
        );
        let comments = CommentService::new(dyn_store.clone(), ledger.clone());

        let admin = principal("admin", Role::Admin);
        let room = room_service::open_room(&presence, dyn_store.as_ref(), &admin, "standup", "daily")
            .await
            .unwrap();

        Self {
            store,
            presence,
            ledger,
            staging,
            content,
            comments,
            analytics,
            admin,
            editor: principal("editor", Role::User),
            other_editor: principal("other", Role::User),
            room_id: room.id,
        }
    }

    pub async fn with_content(content: &str) -> Self {
        let fx = Self::new().await;
        fx.store.set_content(&fx.room_id, content.to_string()).await.unwrap();
        fx
    }

    pub async fn canonical(&self) -> String {
        self.store.get_project(&self.room_id).await.unwrap().unwrap().content
    }

    /// Join the room as a passive peer and return its outbox, already drained.
    pub async fn watch(&self, conn_id: &str, user_id: &str) -> mpsc::UnboundedReceiver<OutboundMessage> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.presence
            .join_room(
                &self.room_id,
                Participant {
                    conn_id: conn_id.to_string(),
                    tenant_id: "cust_test".to_string(),
                    user_id: user_id.to_string(),
                    user_data: Value::Null,
                    outbox: tx,
                },
            )
            .await
            .unwrap();
        while rx.try_recv().is_ok() {}
        rx
    }
}
