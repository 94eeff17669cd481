use anyhow::{Context, Result};

/// S3 / MinIO credentials used to resolve `s3://bucket/key` resume URLs.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    /// Enables the favorites/applied read-through cache when set.
    pub redis_url: Option<String>,
    pub s3: Option<S3Config>,
    pub port: u16,
    pub rust_log: String,
    pub list_cache_ttl_secs: u64,
    pub document_download_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3 = match optional_env("S3_ENDPOINT") {
            Some(endpoint) => Some(S3Config {
                endpoint,
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            }),
            None => None,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            redis_url: optional_env("REDIS_URL"),
            s3,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            list_cache_ttl_secs: parse_env("LIST_CACHE_TTL_SECS", 300)?,
            document_download_timeout_secs: parse_env("DOCUMENT_DOWNLOAD_TIMEOUT_SECS", 30)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
