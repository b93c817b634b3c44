use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error payload returned on every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error kind (e.g., "not_found", "conflict")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// Error taxonomy for the marketplace services.
///
/// Every variant surfaces directly to the caller with a machine-readable
/// kind; nothing here is retried by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or missing input; fixable by resubmission.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Referenced order/product/user record is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller could not be authenticated at all.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks authority for the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Requested order status is not reachable from the current status.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Refund requested outside the post-delivery window.
    #[error("Refund window expired: {0}")]
    RefundWindowExpired(String),

    /// The order changed between validation and write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The record store or identity provider is unreachable.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ValidationError(_)
            | ServiceError::InvalidTransition(_)
            | ServiceError::RefundWindowExpired(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            ServiceError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable kind, independent of the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::ValidationError(_) => "validation_error",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Unauthorized(_) => "unauthorized",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::InvalidTransition(_) => "invalid_transition",
            ServiceError::RefundWindowExpired(_) => "refund_window_expired",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::UpstreamUnavailable(_) => "upstream_unavailable",
            ServiceError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 5xx details stay in the logs, not on the wire
        let message = if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "request failed");
            match &self {
                ServiceError::UpstreamUnavailable(_) => {
                    "A dependent service is unavailable".to_string()
                }
                _ => "An internal error occurred".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error: self.kind().to_string(),
            message,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<crate::store::StoreError> for ServiceError {
    fn from(err: crate::store::StoreError) -> Self {
        match err {
            crate::store::StoreError::Unavailable(msg) => ServiceError::UpstreamUnavailable(msg),
            crate::store::StoreError::Serialization(msg) => ServiceError::InternalError(msg),
        }
    }
}
