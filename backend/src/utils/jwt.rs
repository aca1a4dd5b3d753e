//! JWT token utilities for session issuance.
//!
//! Tokens assert `{email, id}` and are signed with HS256 using the server
//! secret. They are handed to the client both in the response body and as the
//! `token` cookie.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// JWT claims asserted by an issued session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User email
    pub email: String,
    /// User ID
    pub id: String,
    /// Token expiration timestamp
    pub exp: usize,
    /// Token issued at timestamp
    pub iat: usize,
}

/// How long an issued token (and its cookie) stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLifetime {
    /// One day.
    Session,
    /// Seven days.
    Remembered,
}

impl TokenLifetime {
    pub fn from_remember_me(remember_me: bool) -> Self {
        if remember_me {
            TokenLifetime::Remembered
        } else {
            TokenLifetime::Session
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            TokenLifetime::Session => Duration::days(1),
            TokenLifetime::Remembered => Duration::days(7),
        }
    }

    pub fn as_seconds(self) -> i64 {
        self.duration().num_seconds()
    }
}

/// Signs session tokens with the configured secret.
pub struct JwtUtils {
    encoding_key: EncodingKey,
}

impl JwtUtils {
    /// Create a new JwtUtils instance from the configured secret.
    ///
    /// # Errors
    /// Returns `ServiceError::Configuration` when no secret is configured.
    pub fn new(secret: Option<&str>) -> Result<Self, ServiceError> {
        let secret = secret
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| ServiceError::configuration("JWT_SECRET is not defined"))?;

        Ok(JwtUtils {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Generate a signed token for the given user.
    pub fn generate_token(
        &self,
        email: &str,
        user_id: &str,
        lifetime: TokenLifetime,
    ) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now + lifetime.duration();

        let claims = Claims {
            email: email.to_string(),
            id: user_id.to_string(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal_error(format!("Token generation failed: {e}")))
    }
}

/// Decodes a token signed with `secret`, rejecting expired ones.
#[cfg(test)]
pub fn validate_token(secret: &str, token: &str) -> Result<Claims, ServiceError> {
    use jsonwebtoken::{DecodingKey, Validation, decode};

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|token_data| token_data.claims)
        .map_err(|e| ServiceError::unauthorized(format!("Token validation failed: {e}")))
}

#[cfg(test)]
impl Claims {
    pub fn user_id(&self) -> &str {
        &self.id
    }

    /// Lifetime the token was issued with, in seconds.
    pub fn lifetime_seconds(&self) -> i64 {
        self.exp as i64 - self.iat as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secret_is_a_configuration_error() {
        assert!(matches!(
            JwtUtils::new(None),
            Err(ServiceError::Configuration { .. })
        ));
        assert!(matches!(
            JwtUtils::new(Some("")),
            Err(ServiceError::Configuration { .. })
        ));
    }

    #[test]
    fn test_token_lifetimes() {
        let jwt = JwtUtils::new(Some("test-secret")).unwrap();

        let token = jwt
            .generate_token("a@x.com", "user-1", TokenLifetime::Remembered)
            .unwrap();
        let claims = validate_token("test-secret", &token).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.user_id(), "user-1");
        assert_eq!(claims.lifetime_seconds(), 7 * 24 * 60 * 60);

        let token = jwt
            .generate_token("a@x.com", "user-1", TokenLifetime::from_remember_me(false))
            .unwrap();
        let claims = validate_token("test-secret", &token).unwrap();
        assert_eq!(claims.lifetime_seconds(), 24 * 60 * 60);
    }

    #[test]
    fn test_rejects_token_signed_with_other_secret() {
        let issuer = JwtUtils::new(Some("secret-a")).unwrap();

        let token = issuer
            .generate_token("a@x.com", "user-1", TokenLifetime::Session)
            .unwrap();
        assert!(matches!(
            validate_token("secret-b", &token),
            Err(ServiceError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_rejects_expired_token() {
        let jwt = JwtUtils::new(Some("test-secret")).unwrap();
        let issued = Utc::now() - Duration::days(2);
        let claims = Claims {
            email: "a@x.com".to_string(),
            id: "user-1".to_string(),
            exp: (issued + Duration::days(1)).timestamp() as usize,
            iat: issued.timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &jwt.encoding_key).unwrap();

        assert!(validate_token("test-secret", &token).is_err());
    }
}
