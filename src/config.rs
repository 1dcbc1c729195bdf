// config.rs
// Environment-driven configuration, read once at startup.

use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{Result, bail};

/// Which storage engine backs the record store for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Sql,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongo_uri: String,
    pub mongo_db: String,
    pub sql_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub store: StoreConfig,
    pub jwt_secret: String,
    pub token_days: i64,
    pub upload_dir: PathBuf,
    pub storage_url: Option<String>,
    pub renderer_url: Option<String>,
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        let backend = match env_or("STORE_BACKEND", "mongo").to_lowercase().as_str() {
            "mongo" | "mongodb" => StoreBackend::Mongo,
            "sql" | "sqlite" | "postgres" => StoreBackend::Sql,
            other => bail!("unsupported STORE_BACKEND: {other}"),
        };

        let listen_addr: SocketAddr = env_or("LISTEN_ADDR", "0.0.0.0:8080").parse()?;

        let store = StoreConfig {
            backend,
            mongo_uri: env_or("MONGODB_URI", "mongodb://localhost:27017"),
            mongo_db: env_or("MONGODB_DB", "dealerdesk"),
            sql_url: env_or("DATABASE_URL", "sqlite://dealerdesk.db?mode=rwc"),
            max_connections: parse_env("STORE_MAX_CONNECTIONS", 10)?,
            min_connections: parse_env("STORE_MIN_CONNECTIONS", 1)?,
            acquire_timeout: Duration::from_secs(parse_env("STORE_ACQUIRE_TIMEOUT_SECS", 5)?),
            idle_timeout: Duration::from_secs(parse_env("STORE_IDLE_TIMEOUT_SECS", 300)?),
        };

        Ok(Config {
            listen_addr,
            store,
            jwt_secret: env_or("JWT_SECRET", "dev-secret-change-me"),
            token_days: parse_env("TOKEN_DAYS", 30)?,
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            storage_url: env_opt("STORAGE_URL"),
            renderer_url: env_opt("PDF_RENDERER_URL"),
            admin_name: env_or("ADMIN_NAME", "Administrator"),
            admin_email: env_or("ADMIN_EMAIL", "admin@dealerdesk.local"),
            admin_password: env_or("ADMIN_PASSWORD", "admin123"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(err) => bail!("invalid {key}: {err}"),
        },
        Err(_) => Ok(default),
    }
}
