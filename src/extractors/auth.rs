//! Resolve the calling user from an `Authorization: Bearer <token>` header.

use crate::error::{AppError, TokenError};
use crate::response::{BizCode, ResponseEnvelope};
use crate::service::Caller;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated caller. Rejections are envelopes (HTTP 200) except internal faults.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Caller);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn token_invalid(message: &str) -> Response {
    ResponseEnvelope::error(BizCode::TokenInvalid, message).into_response()
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Err(token_invalid("missing bearer token"));
        };
        let claims = match state.users.tokens().verify(token) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => {
                return Err(ResponseEnvelope::error(BizCode::TokenExpired, "token expired").into_response())
            }
            Err(TokenError::Invalid) => {
                tracing::warn!("rejected invalid bearer token");
                return Err(token_invalid("invalid token"));
            }
        };
        let user = state
            .store()
            .find_by_key(claims.user_id())
            .await
            .map_err(|e| AppError::from(e).into_response())?;
        match user {
            Some(user) => Ok(AuthUser(Caller {
                id: user.id,
                account: user.account,
            })),
            None => {
                tracing::warn!(user_id = claims.user_id(), "token for missing user");
                Err(token_invalid("invalid token"))
            }
        }
    }
}
