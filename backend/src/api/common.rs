//! Response envelope and error mapping shared by all endpoints.
//!
//! All responses use the `ApiResponse` shape:
//! - `success`: whether the request succeeded
//! - `data`: payload on success
//! - `message`: human-readable message
//! - `error`: machine-readable `error_type`
//!
//! # Error Handling Flow
//! 1. Service layer returns a `ServiceError`
//! 2. `service_error_to_http` converts it to a status code and envelope
//! 3. Internal failures are logged and replaced by a generic message

use crate::errors::ServiceError;
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message
    pub message: String,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Response timestamp
    pub timestamp: String,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetails {
    /// Machine-readable error type identifier
    pub error_type: String,
}

/// Error half of every handler's return type.
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>, error_type: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: message.into(),
            error: Some(ErrorDetails {
                error_type: error_type.into(),
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ApiResponse<()> {
    /// Create a successful response without payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Converts ServiceError to appropriate HTTP response with standard format
pub fn service_error_to_http(error: ServiceError) -> ApiError {
    let (status, error_type, message) = match error {
        ServiceError::Validation { message } => {
            (StatusCode::BAD_REQUEST, "validation_error", message)
        }
        ServiceError::NotFound { entity, .. } => (
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{entity} does not exist"),
        ),
        ServiceError::AlreadyExists { entity, .. } => (
            StatusCode::CONFLICT,
            "already_exists",
            format!("{entity} already exists"),
        ),
        ServiceError::InvalidOperation { message } => {
            (StatusCode::BAD_REQUEST, "invalid_operation", message)
        }
        ServiceError::Unauthorized { message } => {
            (StatusCode::UNAUTHORIZED, "unauthorized", message)
        }
        ServiceError::Configuration { message } => {
            tracing::error!("Configuration error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            )
        }
        ServiceError::Database { source } => {
            tracing::error!("Database error: {:#}", source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            )
        }
        ServiceError::ExternalService { message } | ServiceError::InternalError { message } => {
            tracing::error!("Internal error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            )
        }
    };

    (status, Json(ApiResponse::<()>::error(message, error_type)))
}
