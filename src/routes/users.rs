//! User account routes.

use crate::handlers::users::{create, delete as delete_handler, list, login, me, read, register, update};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/me", get(me))
        .route("/users", get(list).post(create))
        .route("/users/:id", get(read).put(update).delete(delete_handler))
        .with_state(state)
}
