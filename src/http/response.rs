//! Error taxonomy and the `{ok:false, error}` response envelope.
//!
//! # Design Decisions
//! - Status codes are decided per variant, so handlers pick the variant
//!   that matches their route's policy (tokens → 500, quote/swap → 400)
//! - Internal failures are logged in full but rendered generically

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::aggregator::UpstreamError;
use crate::quoting::ValidationError;

/// Every failure a request can end with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Upstream failure on a route that reports it as a bad request.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Upstream failure on a route that reports it as a server error.
    #[error(transparent)]
    UpstreamUnavailable(UpstreamError),

    #[error("Origin not allowed by CORS")]
    OriginRejected,

    #[error("Too many requests, please try again later.")]
    RateLimited,

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Upstream(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamUnavailable(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::OriginRejected => StatusCode::FORBIDDEN,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

/// Failure body shared by every route.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Unhandled internal error");
        }
        (self.status_code(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let validation = ApiError::from(ValidationError::Missing("amount"));
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);

        let upstream = ApiError::from(UpstreamError::Timeout(10));
        assert_eq!(upstream.status_code(), StatusCode::BAD_REQUEST);

        let listing = ApiError::UpstreamUnavailable(UpstreamError::Timeout(10));
        assert_eq!(listing.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(ApiError::OriginRejected.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err = ApiError::Internal("db password is hunter2".to_string());
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn test_messages_pass_through() {
        let err = ApiError::from(ValidationError::Missing("inputMint"));
        assert_eq!(err.to_string(), "inputMint is required");

        let err = ApiError::from(UpstreamError::Status {
            status: 400,
            message: "Route not found".to_string(),
        });
        assert_eq!(err.to_string(), "Route not found");
    }
}
