use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use dotenvy::dotenv;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    MySql,
    /// ephemeral, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(StorageBackend::MySql),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("STORAGE_BACKEND must be `mysql` or `memory`, got `{other}`"),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
    pub day_lock_idle: Duration,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value `{raw}`")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        let storage_backend: StorageBackend = var_or("STORAGE_BACKEND", "mysql").parse()?;
        let database_url = env::var("DATABASE_URL").ok();
        if storage_backend == StorageBackend::MySql && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND is mysql");
        }

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "0.0.0.0:8001"),
            storage_backend,
            database_url,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: parsed_or("ACCESS_TOKEN_TTL", 1800)?, // default 30 min

            rate_login_per_min: parsed_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: parsed_or("RATE_REGISTER_PER_MIN", 30)?,
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: var_or("API_PREFIX", "/api"),
            log_dir: var_or("LOG_DIR", "logs"),
            day_lock_idle: Duration::from_secs(parsed_or("DAY_LOCK_IDLE_SECS", 600)?),
        })
    }
}

#[cfg(test)]
impl Config {
    /// In-memory configuration for handler tests.
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            storage_backend: StorageBackend::Memory,
            database_url: None,
            jwt_secret: "test-secret".to_string(),
            access_token_ttl: 1800,
            rate_login_per_min: 1000,
            rate_register_per_min: 1000,
            rate_protected_per_min: 10_000,
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
            day_lock_idle: Duration::from_secs(60),
        }
    }
}
