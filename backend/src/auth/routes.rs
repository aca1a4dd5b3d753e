//! Defines the HTTP routes for the credential lifecycle.
//!
//! Mounted under `/api/v1/auth` by the application router.

use crate::auth::handlers::*;
use axum::{Router, routing::post};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/resend-verification", post(resend_verification))
        .route("/verify", post(verify_email))
        .route("/forget-password/email", post(forget_password_email))
        .route("/forget-password/verify", post(forget_password_verify))
        .route(
            "/forget-password/reset-password",
            post(reset_password),
        )
        .route("/sign-in", post(sign_in))
}

#[cfg(test)]
mod tests {
    use crate::api::app_router;
    use crate::config::Config;
    use crate::database::test_pool;
    use crate::services::email_service::testing::{Outbox, RecordingMailer};
    use crate::state::AppState;
    use crate::utils::jwt;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const SECRET: &str = "route-test-secret";

    async fn test_app(jwt_secret: Option<&str>) -> (Router, Outbox) {
        let (mailer, outbox) = RecordingMailer::new();
        let state = AppState::new(Config::for_tests(jwt_secret), test_pool().await, mailer);
        (app_router(state), outbox)
    }

    struct Reply {
        status: StatusCode,
        cookie: Option<String>,
        body: Value,
    }

    async fn post(app: &Router, path: &str, body: Value) -> Reply {
        post_raw(app, path, body.to_string()).await
    }

    async fn post_raw(app: &Router, path: &str, body: String) -> Reply {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/auth{path}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Reply {
            status,
            cookie,
            body,
        }
    }

    fn sign_up_body(email: &str, password: &str) -> Value {
        json!({
            "email": email,
            "password": password,
            "firstName": "A",
            "lastName": "B",
            "termsAndConditions": true
        })
    }

    #[tokio::test]
    async fn test_register_verify_sign_in_scenario() {
        let (app, outbox) = test_app(Some(SECRET)).await;

        let reply = post(&app, "/sign-up", sign_up_body("a@x.com", "p1")).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["message"], "Verification email sent");
        assert!(reply.body.get("data").is_none());
        let code = outbox.next().await.code;

        let reply = post(&app, "/sign-up", sign_up_body("a@x.com", "p1")).await;
        assert_eq!(reply.status, StatusCode::CONFLICT);
        assert_eq!(reply.body["success"], false);

        let reply = post(
            &app,
            "/verify",
            json!({"email": "a@x.com", "verificationCode": "00000"}),
        )
        .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert!(reply.cookie.is_none());

        let reply = post(
            &app,
            "/verify",
            json!({"email": "a@x.com", "verificationCode": code}),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        let token = reply.body["data"]["token"].as_str().unwrap().to_string();
        let cookie = reply.cookie.unwrap();
        assert!(cookie.starts_with(&format!("token={token};")));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));

        let reply = post(
            &app,
            "/sign-in",
            json!({"email": "a@x.com", "password": "p1", "rememberMe": true}),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["data"]["expiresIn"], 604_800);
        assert!(reply.cookie.unwrap().contains("Max-Age=604800"));

        let token = reply.body["data"]["token"].as_str().unwrap();
        let claims = jwt::validate_token(SECRET, token).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.lifetime_seconds(), 604_800);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (app, outbox) = test_app(Some(SECRET)).await;

        let reply = post(&app, "/sign-up", json!({"email": "a@x.com"})).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["error"]["error_type"], "validation_error");

        let reply = post_raw(&app, "/sign-in", "{not json".to_string()).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);

        let reply = post(&app, "/resend-verification", json!({"email": "b@x.com"})).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);

        let reply = post(&app, "/sign-in", json!({"email": "b@x.com", "password": "p1"})).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);

        let reply = post(&app, "/forget-password/email", json!({})).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);

        for path in [
            "/verify",
            "/forget-password/verify",
            "/forget-password/reset-password",
        ] {
            let reply = post(
                &app,
                path,
                json!({"email": "a@x.com", "newPassword": "p2"}),
            )
            .await;
            assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{path}");
            assert_eq!(reply.body["error"]["error_type"], "validation_error");
        }

        post(&app, "/sign-up", sign_up_body("a@x.com", "p1")).await;
        let code = outbox.next().await.code;

        let reply = post(&app, "/sign-in", json!({"email": "a@x.com", "password": "P1"})).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

        post(
            &app,
            "/verify",
            json!({"email": "a@x.com", "verificationCode": code}),
        )
        .await;
        let reply = post(&app, "/resend-verification", json!({"email": "a@x.com"})).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["message"], "User is already verified");
    }

    #[tokio::test]
    async fn test_password_reset_over_http() {
        let (app, outbox) = test_app(Some(SECRET)).await;
        post(&app, "/sign-up", sign_up_body("a@x.com", "p1")).await;
        outbox.next().await;

        let reply = post(&app, "/forget-password/email", json!({"email": "a@x.com"})).await;
        assert_eq!(reply.status, StatusCode::OK);
        let code = outbox.next().await.code;

        let reply = post(
            &app,
            "/forget-password/verify",
            json!({"email": "a@x.com", "verificationCode": code}),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.cookie.is_none());

        let reply = post(
            &app,
            "/forget-password/reset-password",
            json!({"email": "a@x.com", "newPassword": "p2", "verificationCode": code}),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.cookie.unwrap().contains("Max-Age=604800"));

        let reply = post(&app, "/sign-in", json!({"email": "a@x.com", "password": "p2"})).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.cookie.unwrap().contains("Max-Age=86400"));

        let reply = post(&app, "/sign-in", json!({"email": "a@x.com", "password": "p1"})).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_secret_is_a_server_error() {
        let (app, _outbox) = test_app(None).await;
        post(&app, "/sign-up", sign_up_body("a@x.com", "p1")).await;

        let reply = post(&app, "/sign-in", json!({"email": "a@x.com", "password": "p1"})).await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_root_and_openapi() {
        let (app, _outbox) = test_app(Some(SECRET)).await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api-doc/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(doc["paths"].get("/api/v1/auth/sign-in").is_some());

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
