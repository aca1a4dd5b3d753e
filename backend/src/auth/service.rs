//! Core business logic for the credential lifecycle.
//!
//! Two independent sub-states are tracked per user:
//!
//! - verification: `Unverified(code)` -> `verify_email` -> `Verified`, never back
//! - password reset: `NoPendingReset` -> `request_password_reset` ->
//!   `PendingReset(code)` -> `reset_password` -> `NoPendingReset`
//!
//! Codes are compared by exact string equality and do not expire.

use crate::auth::models::*;
use crate::config::Config;
use crate::database::models::{CreateUser, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::services::email_service::{CodeEmail, CodePurpose, Mailer, dispatch_code_email};
use crate::state::AppState;
use crate::utils::jwt::{JwtUtils, TokenLifetime};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::verification_code::generate_verification_code;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

/// Authentication service for sign-up, verification, sign-in and password reset
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    config: &'a Config,
    mailer: Arc<dyn Mailer>,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(pool: &'a SqlitePool, config: &'a Config, mailer: Arc<dyn Mailer>) -> Self {
        AuthService {
            pool,
            config,
            mailer,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(state.pool(), state.config(), state.mailer())
    }

    fn users(&self) -> UserRepository<'a> {
        UserRepository::new(self.pool)
    }

    /// Create an unverified user and email them a sign-up code.
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<User> {
        validate(&request)?;

        let repo = self.users();
        if repo.email_exists(&request.email).await? {
            return Err(ServiceError::already_exists("User", &request.email));
        }

        let password_hash = hash_password(&request.password, self.config.bcrypt_cost)?;
        let verification_code = generate_verification_code();

        let data = CreateUser {
            id: Uuid::now_v7().to_string(),
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            role: request.role.unwrap_or_default(),
            verification_code: verification_code.clone(),
            marketing_consent: request.marketing_consent.unwrap_or(false),
            terms_and_conditions: request.terms_and_conditions,
        };
        let email = data.email.clone();

        // A concurrent sign-up may win between the check above and the insert.
        let user = repo
            .create_user(data)
            .await?
            .ok_or_else(|| ServiceError::already_exists("User", &email))?;

        tracing::info!(email = %user.email, user_id = %user.id, "User registered");
        self.send_code(&user, verification_code, CodePurpose::Signup);

        Ok(user)
    }

    /// Replace the pending sign-up code of an unverified user and email it.
    pub async fn resend_verification(&self, request: EmailRequest) -> ServiceResult<()> {
        validate(&request)?;

        let code = generate_verification_code();
        let repo = self.users();
        let Some(user) = repo
            .replace_verification_code(&request.email, &code)
            .await?
        else {
            return match repo.get_user_by_email(&request.email).await? {
                None => Err(ServiceError::not_found("User", &request.email)),
                Some(_) => Err(ServiceError::invalid_operation("User is already verified")),
            };
        };

        tracing::info!(email = %user.email, "Verification code reissued");
        self.send_code(&user, code, CodePurpose::Signup);

        Ok(())
    }

    /// Consume the sign-up code, mark the user verified and issue a token.
    pub async fn verify_email(&self, request: VerifyEmailRequest) -> ServiceResult<IssuedToken> {
        validate(&request)?;

        let repo = self.users();
        let Some(user) = repo
            .consume_verification_code(&request.email, &request.verification_code)
            .await?
        else {
            return Err(self.code_mismatch(&request.email).await);
        };

        tracing::info!(email = %user.email, "Email verified");
        self.issue_token(
            &user,
            TokenLifetime::from_remember_me(request.remember_me.unwrap_or(false)),
        )
    }

    /// Store a fresh password reset code and email it.
    pub async fn request_password_reset(&self, request: EmailRequest) -> ServiceResult<()> {
        validate(&request)?;

        let code = generate_verification_code();
        let user = self
            .users()
            .replace_reset_code(&request.email, &code)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &request.email))?;

        tracing::info!(email = %user.email, "Password reset code issued");
        self.send_code(&user, code, CodePurpose::ResetPassword);

        Ok(())
    }

    /// Confirm a password reset code without consuming it.
    pub async fn verify_reset_code(&self, request: VerifyResetCodeRequest) -> ServiceResult<()> {
        validate(&request)?;

        let user = self
            .users()
            .get_user_by_email(&request.email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &request.email))?;

        if user.reset_code.as_deref() != Some(request.verification_code.as_str()) {
            return Err(ServiceError::unauthorized("Invalid verification code"));
        }

        Ok(())
    }

    /// Replace the password if the reset code matches, then issue a 7-day token.
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> ServiceResult<IssuedToken> {
        validate(&request)?;

        let password_hash = hash_password(&request.new_password, self.config.bcrypt_cost)?;
        let Some(user) = self
            .users()
            .apply_password_reset(&request.email, &request.verification_code, &password_hash)
            .await?
        else {
            return Err(self.code_mismatch(&request.email).await);
        };

        tracing::info!(email = %user.email, "Password reset");
        self.issue_token(&user, TokenLifetime::Remembered)
    }

    /// Check the password and issue a token.
    pub async fn sign_in(&self, request: SignInRequest) -> ServiceResult<IssuedToken> {
        validate(&request)?;

        let user = self
            .users()
            .get_user_by_email(&request.email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &request.email))?;

        if !verify_password(&request.password, &user.password_hash) {
            tracing::info!(email = %user.email, "Sign-in rejected");
            return Err(ServiceError::unauthorized("Invalid password"));
        }

        self.issue_token(
            &user,
            TokenLifetime::from_remember_me(request.remember_me.unwrap_or(false)),
        )
    }

    fn issue_token(&self, user: &User, lifetime: TokenLifetime) -> ServiceResult<IssuedToken> {
        let jwt_utils = JwtUtils::new(self.config.jwt_secret.as_deref())?;
        let token = jwt_utils.generate_token(&user.email, &user.id, lifetime)?;

        Ok(IssuedToken {
            token,
            max_age_seconds: lifetime.as_seconds(),
        })
    }

    /// Distinguishes a missing user from a wrong code after a failed conditional update.
    async fn code_mismatch(&self, email: &str) -> ServiceError {
        match self.users().get_user_by_email(email).await {
            Ok(Some(_)) => ServiceError::unauthorized("Invalid verification code"),
            Ok(None) => ServiceError::not_found("User", email),
            Err(e) => e.into(),
        }
    }

    fn send_code(&self, user: &User, code: String, purpose: CodePurpose) {
        let email = CodeEmail {
            to_email: user.email.clone(),
            recipient_name: user.display_name(),
            code,
            purpose,
        };
        dispatch_code_email(
            Arc::clone(&self.mailer),
            email,
            Duration::from_secs(self.config.email_timeout_seconds),
        );
    }
}

fn validate(request: &impl Validate) -> ServiceResult<()> {
    request
        .validate()
        .map_err(|errors| ServiceError::from_validation_errors(&errors))
}
