use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(rename = "superadmin")]
    SuperAdmin,
    Admin,
    #[default]
    User,
}

impl Role {
    /// Elevated roles write canonical content directly and review staged changes.
    pub fn is_elevated(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

/// Authenticated caller, extracted from a user token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub name: String,
    pub role: Role,
    pub tenant_id: String,
}

impl Principal {
    pub fn is_elevated(&self) -> bool {
        self.role.is_elevated()
    }
}
