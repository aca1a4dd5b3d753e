//! OpenAPI document for the auth API, served as JSON.

use crate::auth::handlers;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Relocator Auth API",
        description = "Registration, email verification, sign-in and password reset"
    ),
    paths(
        handlers::sign_up,
        handlers::resend_verification,
        handlers::verify_email,
        handlers::forget_password_email,
        handlers::forget_password_verify,
        handlers::reset_password,
        handlers::sign_in,
    ),
    tags((name = "auth", description = "Sign-up, verification, sign-in and password reset"))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_auth_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for path in [
            "/api/v1/auth/sign-up",
            "/api/v1/auth/resend-verification",
            "/api/v1/auth/verify",
            "/api/v1/auth/forget-password/email",
            "/api/v1/auth/forget-password/verify",
            "/api/v1/auth/forget-password/reset-password",
            "/api/v1/auth/sign-in",
        ] {
            assert!(paths.contains(&path), "missing {path}");
        }
    }
}
