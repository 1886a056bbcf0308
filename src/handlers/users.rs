//! User handlers: thin adapters from HTTP extractors to [`UserService`](crate::service::UserService).

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::response::ResponseEnvelope;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

type Body = Result<Json<Value>, JsonRejection>;

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id: {}", id_str)))
}

pub async fn register(State(state): State<AppState>, body: Body) -> Result<ResponseEnvelope, AppError> {
    let Json(body) = body?;
    state.users.register(&body).await
}

pub async fn login(State(state): State<AppState>, body: Body) -> Result<ResponseEnvelope, AppError> {
    let Json(body) = body?;
    state.users.login(&body).await
}

pub async fn me(State(state): State<AppState>, AuthUser(caller): AuthUser) -> Result<ResponseEnvelope, AppError> {
    state.users.me(&caller).await
}

pub async fn list(State(state): State<AppState>) -> Result<ResponseEnvelope, AppError> {
    state.users.list().await
}

pub async fn create(State(state): State<AppState>, body: Body) -> Result<ResponseEnvelope, AppError> {
    let Json(body) = body?;
    state.users.create(&body).await
}

pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> Result<ResponseEnvelope, AppError> {
    state.users.get(parse_id(&id)?).await
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    body: Body,
) -> Result<ResponseEnvelope, AppError> {
    let id = parse_id(&id)?;
    let Json(body) = body?;
    state.users.update(&caller, id, &body).await
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<ResponseEnvelope, AppError> {
    state.users.delete(&caller, parse_id(&id)?).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_id("1.5"), Err(AppError::BadRequest(_))));
    }
}
