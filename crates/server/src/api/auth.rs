//! Bearer token extractors.
//!
//! Tokens are HS256 JWTs issued by the platform's auth service and signed with the shared
//! `jwt_secret`. This service only verifies them.

use crate::AppResources;
use crate::entity::user::Role;
use crate::error::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: i32,
    pub role: Role,
    pub exp: usize,
}

impl AccessClaims {
    pub fn new(user_id: i32, role: Role, ttl: time::Duration) -> Self {
        let exp = (OffsetDateTime::now_utc() + ttl).unix_timestamp() as usize;
        Self { user_id, role, exp }
    }

    /// Signs the claims. Used by operators and tests; end users get tokens from the auth service.
    pub fn issue(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins may act on any account, everyone else only on their own.
    pub fn can_access_user(&self, user_id: i32) -> bool {
        self.is_admin() || self.user_id == user_id
    }
}

/// Any valid bearer token.
pub struct BearerAuth(pub AccessClaims);

/// A valid bearer token with the Admin role.
pub struct AdminAuth(pub AccessClaims);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resources = parts
            .extensions
            .get::<AppResources>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("AppResources not found in extensions");
                ApiError::server_error("AppResources not configured")
            })?;

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("No token provided"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid token"))?;

        let claims = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(resources.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            ApiError::unauthorized("Invalid token")
        })?
        .claims;

        Ok(BearerAuth(claims))
    }
}

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerAuth(claims) = BearerAuth::from_request_parts(parts, state).await?;
        if !claims.is_admin() {
            tracing::info!(user_id = claims.user_id, "Non-admin caller on admin route");
            return Err(ApiError::forbidden("Admin access required"));
        }
        Ok(AdminAuth(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn issued_token_round_trips() {
        let claims = AccessClaims::new(3, Role::Admin, time::Duration::minutes(5));
        let token = claims.issue(SECRET).unwrap();
        let decoded = decode::<AccessClaims>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims, claims);
    }

    #[test]
    fn access_rules() {
        let client = AccessClaims::new(5, Role::Client, time::Duration::minutes(5));
        assert!(client.can_access_user(5));
        assert!(!client.can_access_user(6));
        assert!(!client.is_admin());

        let admin = AccessClaims::new(1, Role::Admin, time::Duration::minutes(5));
        assert!(admin.can_access_user(6));
    }
}
