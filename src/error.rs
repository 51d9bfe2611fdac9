use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::error;

/// Service failure taxonomy. Validation variants are raised before any
/// store mutation; `Storage` and `Internal` carry causes that must not
/// leak to clients in release builds.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Amount must be a positive number")]
    InvalidAmount,
    #[error("Date must be a valid calendar date not in the future")]
    FutureDate,
    #[error("Invalid income type")]
    InvalidEnum,
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingField(_)
            | AppError::InvalidAmount
            | AppError::FutureDate
            | AppError::InvalidEnum => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let error = match &self {
            AppError::Storage(e) => {
                error!(error = %e, "storage error");
                masked(e.to_string())
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                masked(e.to_string())
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { success: false, error })).into_response()
    }
}

fn masked(detail: String) -> String {
    if cfg!(debug_assertions) {
        detail
    } else {
        "Internal server error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_400() {
        assert_eq!(AppError::MissingField("category").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidAmount.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::FutureDate.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidEnum.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn auth_and_lookup_errors_map_to_401_and_404() {
        assert_eq!(
            AppError::Unauthorized("Invalid username or password").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::NotFound("Expense").status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_errors_map_to_500() {
        let res = AppError::Storage(sqlx::Error::RowNotFound).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_names_the_resource() {
        assert_eq!(AppError::NotFound("Expense").to_string(), "Expense not found");
        assert_eq!(
            AppError::NotFound("Income entry").to_string(),
            "Income entry not found"
        );
    }
}
