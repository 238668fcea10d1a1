/*
 * Responsibility
 * - Environment-sourced configuration (Supabase credentials, rate limits, port)
 * - Validation at startup (missing required values abort boot)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
    Test,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub supabase_url: Url,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,

    pub rate_limit_window_secs: u64,
    pub rate_limit_max_requests: u32,

    pub cors_allowed_origins: Vec<String>,

    // When true, the readiness probe fails if the probe table is missing.
    // By default a missing table only means the environment is unprovisioned,
    // not that the Supabase connection is down.
    pub readiness_require_probe_table: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let supabase_url = std::env::var("SUPABASE_URL")
            .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?;
        let supabase_url =
            Url::parse(&supabase_url).map_err(|_| ConfigError::Invalid("SUPABASE_URL"))?;

        let supabase_anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        let supabase_service_role_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .map_err(|_| ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?;

        let rate_limit_window_secs = std::env::var("API_RATE_LIMIT_TTL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let rate_limit_max_requests = std::env::var("API_RATE_LIMIT_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(100);

        if rate_limit_window_secs == 0 {
            return Err(ConfigError::Invalid("API_RATE_LIMIT_TTL"));
        }
        if rate_limit_max_requests == 0 {
            return Err(ConfigError::Invalid("API_RATE_LIMIT_LIMIT"));
        }

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let readiness_require_probe_table = std::env::var("READINESS_REQUIRE_PROBE_TABLE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);

        Ok(Self {
            addr,
            app_env,
            supabase_url,
            supabase_anon_key,
            supabase_service_role_key,
            rate_limit_window_secs,
            rate_limit_max_requests,
            cors_allowed_origins,
            readiness_require_probe_table,
        })
    }
}
