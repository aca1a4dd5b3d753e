//! Central module for assembling the HTTP API.
//!
//! Mounts the auth routes, the service root and the OpenAPI document, and
//! attaches the shared application state.

pub mod common;
pub mod openapi;

use crate::api::common::{ApiError, ApiResponse};
use crate::api::openapi::ApiDoc;
use crate::auth;
use crate::state::AppState;
use axum::{Extension, Json, Router, http::StatusCode, routing::get};
use utoipa::OpenApi;

/// Builds the complete application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api-doc/openapi.json", get(openapi_handler))
        .nest("/api/v1/auth", auth::routes::auth_router())
        .fallback(not_found)
        .layer(Extension(state))
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to Relocator Auth API",
    ))
}

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("Route not found", "not_found")),
    )
}
