use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
}
