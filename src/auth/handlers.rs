use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::{
    dto::{LoginData, LoginRequest, PublicUser},
    extractors::AuthUser,
    repo::User,
    service::{verify_password, JwtKeys},
};
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginData>>, AppError> {
    payload.username = payload.username.trim().to_string();

    if payload.username.is_empty() {
        return Err(AppError::MissingField("username"));
    }
    if payload.password.is_empty() {
        return Err(AppError::MissingField("password"));
    }

    // Unknown username and wrong password are indistinguishable.
    let user = User::find_by_username(&state.db, &payload.username)
        .await?
        .ok_or_else(|| {
            warn!(username = %payload.username, "login unknown username");
            AppError::Unauthorized("Invalid username or password")
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid username or password"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(ApiResponse::with_message(
        LoginData {
            token,
            user: PublicUser {
                id: user.id,
                username: user.username,
                full_name: user.full_name,
            },
        },
        "Login successful",
    )))
}

/// Tokens are stateless, so there is no server-side session to destroy;
/// the client discards its token and the response acknowledges.
#[instrument]
async fn logout(AuthUser(user_id): AuthUser) -> Json<ApiResponse<()>> {
    info!(user_id = %user_id, "user logged out");
    Json(ApiResponse::with_message((), "Logout successful"))
}

#[instrument(skip(state))]
async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<PublicUser>>, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::Unauthorized("User not found"))?;

    Ok(Json(ApiResponse::new(PublicUser {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn public_user_serializes_with_camel_case_full_name() {
        let user = PublicUser {
            id: Uuid::new_v4(),
            username: "demo".to_string(),
            full_name: Some("Demo User".to_string()),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains(r#""username":"demo""#));
        assert!(json.contains(r#""fullName":"Demo User""#));
    }

    #[test]
    fn login_data_never_exposes_a_password_hash() {
        let data = LoginData {
            token: "jwt".to_string(),
            user: PublicUser {
                id: Uuid::new_v4(),
                username: "demo".to_string(),
                full_name: None,
            },
        };
        let json = serde_json::to_string(&data).unwrap();
        assert!(!json.contains("password"));
    }
}
