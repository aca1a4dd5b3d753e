//! Password hashing helpers built on bcrypt.

use crate::errors::{ServiceError, ServiceResult};
use bcrypt::{hash, verify};

/// Hashes a password before it is stored in the database.
///
/// # Errors
/// Returns `ServiceError::InternalError` if hashing fails (e.g. invalid cost).
pub fn hash_password(password: &str, cost: u32) -> ServiceResult<String> {
    hash(password, cost)
        .map_err(|e| ServiceError::internal_error(format!("Password hashing failed: {e}")))
}

/// Checks a password against a stored hash.
///
/// A stored hash that bcrypt cannot parse is treated as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match verify(password, password_hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("p1", 4).unwrap();
        assert_ne!(hashed, "p1");
        assert!(verify_password("p1", &hashed));
    }

    #[test]
    fn test_variants_do_not_match() {
        let hashed = hash_password("Secret pass", 4).unwrap();
        for candidate in ["secret pass", "SECRET PASS", " Secret pass", "Secret pass ", "Secretpass"] {
            assert!(!verify_password(candidate, &hashed), "{candidate:?} should not match");
        }
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        assert!(!verify_password("p1", "not-a-bcrypt-hash"));
    }
}
