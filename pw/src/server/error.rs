//! HTTP-facing error taxonomy

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

/// Errors a route can answer with; every body is `{"error": message}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing input")]
    MissingInput,

    #[error("User already exists")]
    UserExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Login required")]
    LoginRequired,

    /// Authenticated but not the owner
    #[error("Unauthorized")]
    Forbidden,

    #[error("Project not found")]
    ProjectNotFound,

    /// Details are logged, never sent to the client
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingInput | ApiError::UserExists => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::LoginRequired => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::ProjectNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserExists { .. } => ApiError::UserExists,
            other => ApiError::internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!(%detail, "request failed");
        }
        let body = json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::MissingInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UserExists.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::LoginRequired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::ProjectNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::internal("disk full").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        assert_eq!(ApiError::internal("secret path").to_string(), "Internal server error");
    }

    #[test]
    fn test_store_error_mapping() {
        let exists = StoreError::UserExists {
            username: "ada".to_string(),
        };
        assert!(matches!(ApiError::from(exists), ApiError::UserExists));
        assert!(matches!(ApiError::from(StoreError::Poisoned), ApiError::Internal(_)));
    }
}
