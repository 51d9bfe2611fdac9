use axum::Router;

use crate::state::AppState;

pub mod claims;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod repo;
pub mod service;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
