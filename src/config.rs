use crate::error::AppError;
use chrono::Duration;
use std::env;
use std::str::FromStr;

const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60 * 24; // 24 hours
const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 366; // one year

pub struct Config {
    /// PostgreSQL connection string. `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| AppError::Configuration("JWT_SECRET must be set".into()))?;

        let ttl_secs: i64 = parse_or(&lookup, "JWT_ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS)?;
        if !(1..=MAX_ACCESS_TOKEN_TTL_SECS).contains(&ttl_secs) {
            return Err(AppError::Configuration(format!(
                "JWT_ACCESS_TOKEN_TTL_SECS must be between 1 and {}",
                MAX_ACCESS_TOKEN_TTL_SECS
            )));
        }
        let access_token_ttl = Duration::try_seconds(ttl_secs).ok_or_else(|| {
            AppError::Configuration("JWT_ACCESS_TOKEN_TTL_SECS is out of range".into())
        })?;

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            access_token_ttl,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} must be a number", key))),
        None => Ok(default),
    }
}
