use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

/// Live presence unit. Shares its id with the backing project.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: String,
    #[serde(skip)]
    pub members: HashSet<String>,
    pub member_count: usize,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Room {
    pub fn new(id: String, tenant_id: String, name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            tenant_id,
            name,
            description,
            members: HashSet::new(),
            member_count: 0,
            is_active: false,
            created_at: now,
            last_activity: now,
        }
    }

    /// Returns true when the user was not already a member.
    pub fn add_member(&mut self, user_id: &str) -> bool {
        let inserted = self.members.insert(user_id.to_string());
        self.touch();
        inserted
    }

    /// Returns true when the user was a member.
    pub fn remove_member(&mut self, user_id: &str) -> bool {
        let removed = self.members.remove(user_id);
        self.touch();
        removed
    }

    fn touch(&mut self) {
        self.member_count = self.members.len();
        self.is_active = self.member_count > 0;
        self.last_activity = Utc::now();
    }
}
