//! Argon2id password hashing and verification.

use super::CredentialHasher;
use crate::error::AuthError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Argon2id with default parameters and a random salt per digest.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored digest cannot be parsed.
    fn compare(&self, plaintext: &str, digest: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(digest).map_err(|e| AuthError::MalformedDigest(e.to_string()))?;
        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::MalformedDigest(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_compare() {
        let hasher = Argon2Hasher::new();
        let digest = hasher.hash("Secret123!").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.compare("Secret123!", &digest).unwrap());
        assert!(!hasher.compare("secret123!", &digest).unwrap());
    }

    #[test]
    fn salts_differ() {
        let hasher = Argon2Hasher::new();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn garbage_digest_is_an_error() {
        assert!(matches!(
            Argon2Hasher::new().compare("x", "plaintext"),
            Err(AuthError::MalformedDigest(_))
        ));
    }
}
