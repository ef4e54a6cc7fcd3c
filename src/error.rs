use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// Rule violation reported by a stored procedure.
    #[error("Validation Error: {0}")]
    Rejected(String),

    #[error("{0}")]
    NotFound(String),

    #[error("UnauthorizedError: {0}")]
    Unauthorized(String),

    #[error("User is not authorized")]
    Forbidden,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Maps a store failure, prefixing infrastructure errors with `context`.
    pub fn storage(context: &str, err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(detail) => {
                tracing::info!(detail = %detail, "{}: duplicate key", context);
                ApiError::Conflict(format!("{}: a record with this key already exists.", context))
            }
            StoreError::Rejected(message) => ApiError::Rejected(message),
            StoreError::Database(e) => {
                error!(error = %e, "{}", context);
                ApiError::Internal(format!("{}: {}", context, e))
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Rejected(details) => json!({
                "error": "Validation Error",
                "details": details,
            }),
            other => json!({ "error": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_uniform_statuses() {
        let conflict = ApiError::storage("Could not create job", StoreError::Duplicate("k".into()));
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        let rejected =
            ApiError::storage("Could not create job", StoreError::Rejected("too low".into()));
        assert_eq!(rejected.status_code(), StatusCode::BAD_REQUEST);

        let internal = ApiError::storage(
            "Could not list jobs",
            StoreError::Database(sqlx::Error::PoolTimedOut),
        );
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(internal.to_string().starts_with("Could not list jobs: "));
    }

    #[test]
    fn unauthorized_carries_the_error_kind() {
        let err = ApiError::Unauthorized("jwt expired".into());
        assert_eq!(err.to_string(), "UnauthorizedError: jwt expired");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
