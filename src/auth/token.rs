//! HS256 access tokens.

use super::TokenIssuer;
use crate::error::{AuthError, TokenError};
use crate::model::User;
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: i64,
    pub account: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, ttl: Duration) -> Result<Self, AuthError> {
        let now = Utc::now().timestamp();
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(secs))
            .ok_or(AuthError::TtlOutOfRange(ttl))?;
        Ok(Claims {
            sub: user.id,
            account: user.account.clone(),
            iat: now,
            exp,
        })
    }

    pub fn user_id(&self) -> i64 {
        self.sub
    }
}

#[derive(Clone)]
pub struct JwtIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIssuer").field("ttl", &self.ttl).finish()
    }
}

impl JwtIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;
        JwtIssuer {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }
}

impl TokenIssuer for JwtIssuer {
    fn ttl(&self) -> Duration {
        self.ttl
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| AuthError::Sign(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp_offset: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: 7,
            account: "alice".into(),
            iat: now,
            exp: now + exp_offset,
        }
    }

    #[test]
    fn sign_then_verify() {
        let issuer = JwtIssuer::new("test-secret", Duration::from_secs(60));
        let c = claims(60);
        let token = issuer.sign(&c).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), c);
    }

    #[test]
    fn expired_tokens_are_distinguished() {
        let issuer = JwtIssuer::new("test-secret", Duration::from_secs(60));
        let token = issuer.sign(&claims(-3600)).unwrap();
        assert_eq!(issuer.verify(&token), Err(TokenError::Expired));
    }

    fn user() -> User {
        let fields = serde_json::json!({ "account": "alice", "password": "digest" });
        User::from_fields(7, fields.as_object().unwrap(), Utc::now()).unwrap()
    }

    #[test]
    fn claims_expire_after_ttl() {
        let c = Claims::new(&user(), Duration::from_secs(3600)).unwrap();
        assert_eq!(c.exp - c.iat, 3600);
        assert_eq!(c.user_id(), 7);
    }

    #[test]
    fn oversized_ttl_is_an_error_not_a_wrap() {
        for secs in [u64::MAX, i64::MAX as u64] {
            let err = Claims::new(&user(), Duration::from_secs(secs)).unwrap_err();
            assert!(matches!(err, AuthError::TtlOutOfRange(_)));
        }
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let ours = JwtIssuer::new("test-secret", Duration::from_secs(60));
        let theirs = JwtIssuer::new("other-secret", Duration::from_secs(60));
        let token = theirs.sign(&claims(60)).unwrap();
        assert_eq!(ours.verify(&token), Err(TokenError::Invalid));
        assert_eq!(ours.verify("not.a.token"), Err(TokenError::Invalid));
    }
}
