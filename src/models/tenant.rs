use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Enterprise,
}

/// Resource limits attached to a plan. `None` means unlimited.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub rooms: Option<usize>,
    pub concurrent_users: Option<usize>,
}

impl Plan {
    pub fn limits(self) -> PlanLimits {
        match self {
            Plan::Free => PlanLimits { rooms: Some(3), concurrent_users: Some(10) },
            Plan::Pro => PlanLimits { rooms: Some(100), concurrent_users: Some(100) },
            Plan::Enterprise => PlanLimits { rooms: None, concurrent_users: None },
        }
    }
}

impl PlanLimits {
    pub fn allows_another_room(&self, existing: usize) -> bool {
        self.rooms.map_or(true, |max| existing < max)
    }
}

/// A customer of the service. Rooms and projects are scoped to one tenant.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub plan: Plan,
    pub publishable_key: String,
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub limits: PlanLimits,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, plan: Plan, publishable_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            plan,
            publishable_key: publishable_key.into(),
            secret_key: secret_key.into(),
            limits: plan.limits(),
            created_at: Utc::now(),
        }
    }

    pub fn accepts_key(&self, key: &str) -> bool {
        self.publishable_key == key || self.secret_key == key
    }
}
