//! services/api/src/password.rs
//!
//! One-way password hashing and verification. Argon2 with a random salt;
//! the work factor is not exposed to callers.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::ApiError;

/// Hashes a plaintext password with a freshly generated salt.
pub fn hash(plaintext: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
}

/// Verifies a plaintext against a stored digest.
///
/// Returns `false` (never errors) when the digest is empty or unparseable, so
/// a user row without a stored hash simply fails verification.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    if digest.is_empty() {
        return false;
    }
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let digest = hash("who's gonna carry the boats").unwrap();
        assert!(verify("who's gonna carry the boats", &digest));
        assert!(!verify("the wrong boats", &digest));
    }

    #[test]
    fn empty_or_garbage_digest_never_verifies() {
        assert!(!verify("anything", ""));
        assert!(!verify("anything", "not-a-phc-string"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash("stay hard").unwrap();
        let b = hash("stay hard").unwrap();
        assert_ne!(a, b);
    }
}
