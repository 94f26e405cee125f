//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CALLBACK_BASE_URL, DEFAULT_CHALLENGE_POINTS, DEFAULT_CPU_TIME_LIMIT_SECONDS,
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_JUDGE_REQUEST_TIMEOUT_SECS, DEFAULT_JUDGE_URL,
    DEFAULT_MEMORY_LIMIT_KB, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub judge: JudgeConfig,
    pub scoring: ScoringConfig,
    pub admin: AdminConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// Emit JSON log lines instead of the human-readable format
    pub json_logs: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Required only when the postgres backend is selected
    pub url: Option<String>,
    pub max_connections: u32,
}

/// Which datastore implementation backs the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub sources_path: PathBuf,
}

/// External judge configuration
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    /// Public base URL of this service, as reachable from the judge
    pub callback_base_url: String,
    /// Path segment the judge must echo back on every callback
    pub callback_secret: String,
    pub default_cpu_time_limit: f64,
    pub default_memory_limit_kb: i64,
    pub request_timeout: Duration,
}

/// Scoring configuration
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub default_challenge_points: f64,
}

/// Administrative endpoint configuration
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `None` disables the reset endpoint
    pub reset_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let storage = StorageConfig::from_env()?;
        let database = DatabaseConfig::from_env()?;
        if storage.backend == StorageBackend::Postgres && database.url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL".to_string()));
        }

        Ok(Self {
            server: ServerConfig::from_env()?,
            database,
            storage,
            judge: JudgeConfig::from_env()?,
            scoring: ScoringConfig::from_env()?,
            admin: AdminConfig::from_env(),
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "arbiter=info,tower_http=info".to_string()),
            json_logs: env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false),
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL").ok(),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS)?,
        })
    }
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let backend = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("postgres") | Err(_) => StorageBackend::Postgres,
            Ok("memory") => StorageBackend::Memory,
            Ok(_) => return Err(ConfigError::InvalidValue("STORAGE_BACKEND".to_string())),
        };

        Ok(Self {
            backend,
            sources_path: PathBuf::from(
                env::var("SOURCES_PATH").unwrap_or_else(|_| "/data/sources".to_string()),
            ),
        })
    }
}

impl JudgeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let callback_secret = env::var("JUDGE_CALLBACK_SECRET")
            .map_err(|_| ConfigError::Missing("JUDGE_CALLBACK_SECRET".to_string()))?;
        if callback_secret.is_empty() || callback_secret.contains('/') {
            return Err(ConfigError::InvalidValue("JUDGE_CALLBACK_SECRET".to_string()));
        }

        Ok(Self {
            base_url: env::var("JUDGE_URL").unwrap_or_else(|_| DEFAULT_JUDGE_URL.to_string()),
            auth_token: env::var("JUDGE_AUTH_TOKEN").ok(),
            callback_base_url: env::var("CALLBACK_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_CALLBACK_BASE_URL.to_string()),
            callback_secret,
            default_cpu_time_limit: parse_var("DEFAULT_CPU_TIME_LIMIT", DEFAULT_CPU_TIME_LIMIT_SECONDS)?,
            default_memory_limit_kb: parse_var("DEFAULT_MEMORY_LIMIT_KB", DEFAULT_MEMORY_LIMIT_KB)?,
            request_timeout: Duration::from_secs(parse_var(
                "JUDGE_REQUEST_TIMEOUT_SECS",
                DEFAULT_JUDGE_REQUEST_TIMEOUT_SECS,
            )?),
        })
    }
}

impl ScoringConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            default_challenge_points: parse_var("DEFAULT_CHALLENGE_POINTS", DEFAULT_CHALLENGE_POINTS)?,
        })
    }
}

impl AdminConfig {
    fn from_env() -> Self {
        Self {
            reset_token: env::var("ADMIN_RESET_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Configuration built from defaults, independent of the environment
    pub(crate) fn sample_config() -> Config {
        Config {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                rust_log: "info".to_string(),
                json_logs: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                sources_path: PathBuf::from("/tmp/arbiter-sources"),
            },
            judge: JudgeConfig {
                base_url: DEFAULT_JUDGE_URL.to_string(),
                auth_token: None,
                callback_base_url: DEFAULT_CALLBACK_BASE_URL.to_string(),
                callback_secret: "test-secret".to_string(),
                default_cpu_time_limit: DEFAULT_CPU_TIME_LIMIT_SECONDS,
                default_memory_limit_kb: DEFAULT_MEMORY_LIMIT_KB,
                request_timeout: Duration::from_secs(DEFAULT_JUDGE_REQUEST_TIMEOUT_SECS),
            },
            scoring: ScoringConfig {
                default_challenge_points: DEFAULT_CHALLENGE_POINTS,
            },
            admin: AdminConfig { reset_token: None },
        }
    }

    #[test]
    fn test_sample_config_uses_memory_backend() {
        let config = sample_config();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.admin.reset_token.is_none());
    }

    #[test]
    fn test_default_values() {
        let server = ServerConfig {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: "info".to_string(),
            json_logs: false,
        };
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
    }

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let value: u32 = parse_var("ARBITER_TEST_SURELY_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }
}
