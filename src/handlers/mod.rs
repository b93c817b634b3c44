//! HTTP surface. Handlers stay thin: decode and validate the payload,
//! resolve the caller, call one service method, wrap the result.

use serde::Serialize;
use utoipa::ToSchema;

pub mod admin;
pub mod carts;
pub mod catalog;
pub mod orders;
pub mod users;

/// Uniform success envelope. Errors bypass this and render through
/// `ServiceError`'s `IntoResponse`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

pub(crate) fn validate<T: validator::Validate>(
    payload: &T,
) -> Result<(), crate::errors::ServiceError> {
    payload
        .validate()
        .map_err(|e| crate::errors::ServiceError::ValidationError(e.to_string()))
}
