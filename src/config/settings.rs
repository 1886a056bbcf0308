//! Process settings read once from the environment and passed into components explicitly.

use crate::error::ConfigError;
use std::time::Duration;

const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
/// Upper bound for `TOKEN_TTL_SECS`: ten years.
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub token_secret: String,
    pub token_ttl: Duration,
    pub body_limit_bytes: usize,
}

impl Settings {
    /// Reads `DATABASE_URL`, `ACCESS_TOKEN_SECRET` (required), `TOKEN_TTL_SECS`,
    /// `BIND_ADDR`, `DB_MAX_CONNECTIONS` and `BODY_LIMIT_BYTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_secret = lookup("ACCESS_TOKEN_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingVar("ACCESS_TOKEN_SECRET"))?;
        let ttl_secs = parse_or(&lookup, "TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?;
        if ttl_secs == 0 || ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Load(format!(
                "TOKEN_TTL_SECS must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_SECS, ttl_secs
            )));
        }
        Ok(Settings {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "postgres://localhost/accounts".into()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            token_secret,
            token_ttl: Duration::from_secs(ttl_secs),
            body_limit_bytes: parse_or(&lookup, "BODY_LIMIT_BYTES", DEFAULT_BODY_LIMIT)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Load(format!("{} is not a valid value: {}", key, raw))),
    }
}
