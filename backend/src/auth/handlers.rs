//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse the JSON body, call the matching `AuthService`
//! operation and shape the result into the standard response envelope.
//! Token-issuing endpoints also set the `token` cookie.

use crate::api::common::{ApiError, ApiResponse, service_error_to_http};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::errors::ServiceError;
use crate::state::AppState;
use axum::{
    extract::{Extension, Json, rejection::JsonRejection},
    http::{
        HeaderMap, HeaderValue,
        header::{InvalidHeaderValue, SET_COOKIE},
    },
};

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE_NAME: &str = "token";

type TokenReply = (HeaderMap, Json<ApiResponse<TokenResponse>>);

/// Register a new user and email a verification code.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-up",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Verification email sent"),
        (status = 400, description = "Missing required fields"),
        (status = 409, description = "User already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
#[axum::debug_handler]
pub async fn sign_up(
    Extension(state): Extension<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let payload = parse_body(payload)?;
    let auth_service = AuthService::from_state(&state);

    match auth_service.register(payload).await {
        Ok(_) => Ok(Json(ApiResponse::message("Verification email sent"))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Send a new sign-up verification code.
#[utoipa::path(
    post,
    path = "/api/v1/auth/resend-verification",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Verification code resent"),
        (status = 400, description = "Missing email or user already verified"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
#[axum::debug_handler]
pub async fn resend_verification(
    Extension(state): Extension<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let payload = parse_body(payload)?;
    let auth_service = AuthService::from_state(&state);

    match auth_service.resend_verification(payload).await {
        Ok(()) => Ok(Json(ApiResponse::message(
            "Verification code resent successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Verify the user's email with the emailed code and sign them in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Verification successful, token set as cookie", body = ApiResponse<TokenResponse>),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Invalid verification code"),
        (status = 404, description = "User does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
#[axum::debug_handler]
pub async fn verify_email(
    Extension(state): Extension<AppState>,
    payload: Result<Json<VerifyEmailRequest>, JsonRejection>,
) -> Result<TokenReply, ApiError> {
    let payload = parse_body(payload)?;
    let auth_service = AuthService::from_state(&state);

    match auth_service.verify_email(payload).await {
        Ok(issued) => token_reply(&state, issued, "Verification successful"),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Email a password reset code.
#[utoipa::path(
    post,
    path = "/api/v1/auth/forget-password/email",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Verification code sent to email"),
        (status = 400, description = "Missing required fields"),
        (status = 404, description = "User does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
#[axum::debug_handler]
pub async fn forget_password_email(
    Extension(state): Extension<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let payload = parse_body(payload)?;
    let auth_service = AuthService::from_state(&state);

    match auth_service.request_password_reset(payload).await {
        Ok(()) => Ok(Json(ApiResponse::message("Verification code sent to email"))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Check a password reset code without consuming it.
#[utoipa::path(
    post,
    path = "/api/v1/auth/forget-password/verify",
    request_body = VerifyResetCodeRequest,
    responses(
        (status = 200, description = "Verification successful"),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Invalid verification code"),
        (status = 404, description = "User does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
#[axum::debug_handler]
pub async fn forget_password_verify(
    Extension(state): Extension<AppState>,
    payload: Result<Json<VerifyResetCodeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let payload = parse_body(payload)?;
    let auth_service = AuthService::from_state(&state);

    match auth_service.verify_reset_code(payload).await {
        Ok(()) => Ok(Json(ApiResponse::message("Verification successful"))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Set a new password using the reset code and sign the user in for 7 days.
#[utoipa::path(
    post,
    path = "/api/v1/auth/forget-password/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset successful, token set as cookie", body = ApiResponse<TokenResponse>),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Invalid verification code"),
        (status = 404, description = "User does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
#[axum::debug_handler]
pub async fn reset_password(
    Extension(state): Extension<AppState>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<TokenReply, ApiError> {
    let payload = parse_body(payload)?;
    let auth_service = AuthService::from_state(&state);

    match auth_service.reset_password(payload).await {
        Ok(issued) => token_reply(&state, issued, "Password reset successful"),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Sign in with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Login successful, token set as cookie", body = ApiResponse<TokenResponse>),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Invalid password"),
        (status = 404, description = "User does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
#[axum::debug_handler]
pub async fn sign_in(
    Extension(state): Extension<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<TokenReply, ApiError> {
    let payload = parse_body(payload)?;
    let auth_service = AuthService::from_state(&state);

    match auth_service.sign_in(payload).await {
        Ok(issued) => token_reply(&state, issued, "Login successful"),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Malformed or non-JSON bodies are validation failures like missing fields.
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(payload)| payload).map_err(|rejection| {
        service_error_to_http(ServiceError::validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    })
}

fn token_reply(
    state: &AppState,
    issued: IssuedToken,
    message: &str,
) -> Result<TokenReply, ApiError> {
    let cookie = token_cookie(&issued.token, issued.max_age_seconds, state.config().production)
        .map_err(|e| {
            service_error_to_http(ServiceError::internal_error(format!(
                "Invalid cookie value: {e}"
            )))
        })?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    let body = TokenResponse {
        token: issued.token,
        expires_in: issued.max_age_seconds,
    };
    Ok((headers, Json(ApiResponse::success(body, message))))
}

/// Build an `HttpOnly` cookie whose max-age matches the token lifetime.
pub fn token_cookie(
    token: &str,
    max_age_seconds: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{TOKEN_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_cookie_attributes() {
        let cookie = token_cookie("abc", 86_400, false).unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "token=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=86400"
        );

        let cookie = token_cookie("abc", 604_800, true).unwrap();
        assert!(cookie.to_str().unwrap().ends_with("Max-Age=604800; Secure"));
    }
}
