use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

use crate::{db::BlueprintError, routes::util::ApiResponse};

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Everything a handler can fail with, mapped onto HTTP statuses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Blueprint(#[from] BlueprintError),
    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),
    #[error("{0}")]
    Unauthorized(String),
    #[error("missing required scope: {0}")]
    Forbidden(String),
    #[error("invalid_credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Blueprint(BlueprintError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Blueprint(BlueprintError::AlreadyExists(_)) => StatusCode::BAD_REQUEST,
            ApiError::Blueprint(BlueprintError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("request failed: {:#}", self);
        }

        match self {
            ApiError::InvalidCredentials => {
                HttpResponse::build(status).json(json!({ "error": "invalid_credentials" }))
            }
            _ => HttpResponse::build(status).json(ApiResponse::<()>::error(status, self.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let not_found: ApiError = BlueprintError::not_found("a", "b").into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Blueprint not found: a/b");

        let exists: ApiError = BlueprintError::already_exists("a", "b").into();
        assert_eq!(exists.status_code(), StatusCode::BAD_REQUEST);

        let store: ApiError = BlueprintError::Store(anyhow::anyhow!("connection reset")).into();
        assert_eq!(store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            ApiError::Forbidden("blueprints.write".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
