#![allow(dead_code)]

use colabri_rooms::config::Config;
use colabri_rooms::db::{CollabStore, InMemoryStore};
use colabri_rooms::models::{Plan, Role, Tenant};
use colabri_rooms::services::auth_service::{issue_jwt, UserClaims};
use colabri_rooms::AppState;
use std::sync::Arc;

pub const SECRET: &str = "integration-secret";
pub const TENANT: &str = "cust_it";
pub const PUBLISHABLE_KEY: &str = "pk_it";

pub async fn app_state(plan: Plan) -> Arc<AppState> {
    let store = Arc::new(InMemoryStore::new());
    store
        .insert_tenant(Tenant::new(TENANT, "Integration", plan, PUBLISHABLE_KEY, "sk_it"))
        .await
        .unwrap();
    let config = Config {
        auth_jwt_secret: Some(SECRET.to_string()),
        ..Config::default()
    };
    Arc::new(AppState::new(config, store))
}

pub fn token(user_id: &str, name: &str, role: Role) -> String {
    let claims = UserClaims {
        sub: user_id.to_string(),
        name: Some(name.to_string()),
        role,
        tenant: TENANT.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    issue_jwt(&claims, SECRET).unwrap()
}
