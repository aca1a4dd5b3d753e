//! Data structures for authentication requests and responses.
//!
//! Every request field defaults when absent so that missing input is reported
//! as a validation error (400) rather than as a JSON extractor rejection.

use crate::database::models::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Sign-up request payload
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Must be a valid email")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    #[validate(custom(function = "must_accept"))]
    pub terms_and_conditions: bool,

    pub marketing_consent: Option<bool>,

    pub role: Option<Role>,
}

/// Resend-verification and forgot-password request payload
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct EmailRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

/// Email verification request payload
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Verification code is required"))]
    pub verification_code: String,

    pub remember_me: Option<bool>,
}

/// Password reset code check payload
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyResetCodeRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Verification code is required"))]
    pub verification_code: String,
}

/// New password payload
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,

    #[validate(length(min = 1, message = "Verification code is required"))]
    pub verification_code: String,
}

/// Sign-in request payload
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SignInRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub remember_me: Option<bool>,
}

/// Token returned by sign-in, email verification and password reset.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    /// Token and cookie lifetime in seconds
    pub expires_in: i64,
}

/// A freshly signed session token and the cookie max-age that matches it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub max_age_seconds: i64,
}

fn must_accept(accepted: &bool) -> Result<(), ValidationError> {
    if *accepted {
        Ok(())
    } else {
        let mut error = ValidationError::new("terms_and_conditions");
        error.message = Some("Terms and conditions must be accepted".into());
        Err(error)
    }
}
