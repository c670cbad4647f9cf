use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Subscription not found")]
    SubscriptionNotFound,

    #[error("Generation quota exceeded. Please upgrade to Pro for unlimited generations.")]
    QuotaExceeded,

    #[error("Image generation failed: {0}")]
    GenerationFailed(String),

    #[error("Stored object not found")]
    ObjectNotFound,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "Invalid request"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            AppError::SubscriptionNotFound => (StatusCode::NOT_FOUND, "Subscription not found"),
            AppError::QuotaExceeded => (StatusCode::FORBIDDEN, "Quota exceeded"),
            AppError::GenerationFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Image generation failed")
            }
            AppError::ObjectNotFound => (StatusCode::NOT_FOUND, "Stored object not found"),
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Storage error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        // Quota exhaustion is an expected business condition; the client uses
        // the flag to show an upgrade prompt instead of a generic failure.
        let body = if matches!(self, AppError::QuotaExceeded) {
            Json(json!({
                "error": error_message,
                "message": self.to_string(),
                "quotaExceeded": true
            }))
        } else {
            Json(json!({
                "error": error_message,
                "message": self.to_string()
            }))
        };

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_exceeded_maps_to_forbidden_with_flag() {
        let response = AppError::QuotaExceeded.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_subscription_maps_to_not_found() {
        let response = AppError::SubscriptionNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
