use axum::http;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{Principal, Role};

/// Claims carried by a user token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub tenant: String,
    pub exp: usize,
}

impl From<UserClaims> for Principal {
    fn from(claims: UserClaims) -> Self {
        Principal {
            name: claims.name.unwrap_or_else(|| claims.sub.clone()),
            user_id: claims.sub,
            role: claims.role,
            tenant_id: claims.tenant,
        }
    }
}

// Get the auth token from a request
pub fn get_auth_token<B>(req: &http::Request<B>) -> Result<String, String> {
    // 1. Try to get token from Authorization header
    if let Some(auth_header) = req.headers().get(http::header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| "Invalid Authorization header".to_string())?;
        Ok(auth_str
            .strip_prefix("Bearer ")
            .unwrap_or(auth_str)
            .to_string())
    }
    // 2. Try to get token from cookies
    else {
        let cookie_header = req.headers().get(http::header::COOKIE)
            .ok_or_else(|| "Missing Authorization header or Cookie".to_string())?
            .to_str()
            .map_err(|_| "Invalid Cookie header".to_string())?;

        for c in cookie::Cookie::split_parse(cookie_header).flatten() {
            if c.name() == "auth_token" {
                return Ok(c.value().to_string());
            }
        }
        Err("auth_token cookie not found".to_string())
    }
}

// Validate a JWT token and return its claims
pub fn validate_jwt(token: &str, secret: &str) -> Result<UserClaims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<UserClaims>(token, &decoding_key, &validation).map(|data| data.claims)
}

// Resolve the caller behind a user token
pub fn principal_from_token(token: &str, secret: Option<&str>) -> Result<Principal, String> {
    let secret = secret.ok_or_else(|| "No JWT secret configured!".to_string())?;
    let claims = validate_jwt(token, secret).map_err(|e| format!("JWT validation failed: {}", e))?;
    info!("JWT token validated successfully for user: {}", claims.sub);
    Ok(claims.into())
}

// Issue a user token, used by tooling and tests
pub fn issue_jwt(claims: &UserClaims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret.as_bytes()))
}
