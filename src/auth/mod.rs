//! Credential and token capabilities consumed by the user service.

mod password;
mod token;

pub use password::Argon2Hasher;
pub use token::{Claims, JwtIssuer};

use crate::error::{AuthError, TokenError};
use std::time::Duration;

pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, AuthError>;
    fn compare(&self, plaintext: &str, digest: &str) -> Result<bool, AuthError>;
}

/// Signs and verifies access tokens. Secret and lifetime are fixed at construction.
pub trait TokenIssuer: Send + Sync {
    fn ttl(&self) -> Duration;
    fn sign(&self, claims: &Claims) -> Result<String, AuthError>;
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}
