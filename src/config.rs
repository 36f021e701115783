use std::net::SocketAddr;
use std::time::Duration;

use crate::inference::TogetherClientConfig;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Read once from the environment at startup:
//   TOGETHER_API_KEY        bearer token for the inference endpoint
//   DATABASE_URL            PostgreSQL URL; unset → in-memory store
//   BIND_ADDR               listen address (default 0.0.0.0:8000)
//   INFERENCE_ENDPOINT      text-generation URL
//   INFERENCE_MODEL         model name sent with each request
//   INFERENCE_TIMEOUT_SECS  hard timeout per inference call (default 10)
//   CORS_ALLOWED_ORIGINS    comma-separated frontend origins
//
// ============================================================================

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CORS_ORIGINS: [&str; 2] = [
    "http://localhost:5173",
    "https://your-frontend-domain.vercel.app",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub inference: TogetherClientConfig,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let timeout_secs = match get("INFERENCE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "INFERENCE_TIMEOUT_SECS",
                    reason: format!("expected a positive number of seconds, got {:?}", raw),
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let defaults = TogetherClientConfig::default();
        let inference = TogetherClientConfig {
            endpoint: get("INFERENCE_ENDPOINT").unwrap_or(defaults.endpoint.clone()),
            api_key: get("TOGETHER_API_KEY"),
            model: get("INFERENCE_MODEL").unwrap_or(defaults.model.clone()),
            timeout: Duration::from_secs(timeout_secs),
            ..defaults
        };

        let cors_allowed_origins = match get("CORS_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            inference,
            cors_allowed_origins,
        })
    }
}
