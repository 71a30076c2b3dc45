use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use relgate_core::AppError;
use tracing_subscriber::EnvFilter;

const DEFAULT_CACHE_KEY_PREFIX: &str = "relgate:access";
const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessCacheBackend {
    Memory,
    Redis { redis_url: String },
    Disabled,
}

impl AccessCacheBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Redis { .. } => "redis",
            Self::Disabled => "none",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cache_backend: AccessCacheBackend,
    pub cache_key_prefix: String,
    pub default_cache_ttl_seconds: u64,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cache_backend = parse_cache_backend(
            env::var("ACCESS_CACHE_BACKEND")
                .unwrap_or_else(|_| "memory".to_owned())
                .as_str(),
            env::var("REDIS_URL").ok(),
        )?;
        let cache_key_prefix = env::var("ACCESS_CACHE_KEY_PREFIX")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CACHE_KEY_PREFIX.to_owned());
        let default_cache_ttl_seconds = match env::var("ACCESS_CACHE_DEFAULT_TTL_SECONDS") {
            Ok(value) => value.trim().parse::<u64>().map_err(|error| {
                AppError::Validation(format!(
                    "invalid ACCESS_CACHE_DEFAULT_TTL_SECONDS '{value}': {error}"
                ))
            })?,
            Err(_) => DEFAULT_CACHE_TTL_SECONDS,
        };

        Ok(Self {
            migrate_only,
            database_url,
            api_host,
            api_port,
            cache_backend,
            cache_key_prefix,
            default_cache_ttl_seconds,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_cache_backend(
    value: &str,
    redis_url: Option<String>,
) -> Result<AccessCacheBackend, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "memory" => Ok(AccessCacheBackend::Memory),
        "none" => Ok(AccessCacheBackend::Disabled),
        "redis" => {
            let redis_url = redis_url
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Validation(
                        "REDIS_URL is required when ACCESS_CACHE_BACKEND=redis".to_owned(),
                    )
                })?;
            Ok(AccessCacheBackend::Redis { redis_url })
        }
        other => Err(AppError::Validation(format!(
            "ACCESS_CACHE_BACKEND must be one of 'memory', 'redis' or 'none', got '{other}'"
        ))),
    }
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
