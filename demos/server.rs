//! Example server: reads settings from the environment, ensures the database and
//! users table exist, then serves the account routes.

use account_kit::{
    apply_migrations, build_router, ensure_database_exists, user_record_type, AppState, Argon2Hasher, JwtIssuer,
    PgUserStore, Settings, UserSchemas, UserService,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("account_kit=info".parse()?))
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;

    let record = user_record_type();
    apply_migrations(&pool, "public", &record).await?;

    let users = UserService::new(
        Arc::new(PgUserStore::new(pool, "public", &record)),
        Arc::new(Argon2Hasher::new()),
        Arc::new(JwtIssuer::new(&settings.token_secret, settings.token_ttl)),
        UserSchemas::derive(&record)?,
    );
    let app = build_router(AppState::new(users), settings.body_limit_bytes);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
