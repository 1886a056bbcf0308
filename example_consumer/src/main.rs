//! Example consumer: a separate Rust project that uses account-kit as a dependency.
//!
//! Runs against the in-memory store, so no database is needed.
//! Run from repo root: `cargo run -p example-consumer`

use account_kit::{
    build_router, user_record_type, AppState, Argon2Hasher, JwtIssuer, MemoryUserStore, Settings, UserSchemas,
    UserService,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("account_kit=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let users = UserService::new(
        Arc::new(MemoryUserStore::new()),
        Arc::new(Argon2Hasher::new()),
        Arc::new(JwtIssuer::new(&settings.token_secret, settings.token_ttl)),
        UserSchemas::derive(&user_record_type())?,
    );
    let app = build_router(AppState::new(users), settings.body_limit_bytes);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("Example consumer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
