use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use uuid::Uuid;

use crate::auth::service::JwtKeys;
use crate::error::AppError;
use crate::state::AppState;

/// Extracts and validates the bearer JWT, yielding the caller's user ID.
/// Every ledger operation takes this as its identity input.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Unauthorized("Missing Authorization header"))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AppError::Unauthorized("Invalid auth scheme"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys
            .verify(token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token"))?;

        Ok(AuthUser(claims.sub))
    }
}
