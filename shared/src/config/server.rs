//! HTTP server configuration

use serde::{Deserialize, Serialize};

use super::{env_opt, env_or};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Number of worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,

    /// Token required in the `X-Admin-Token` header for admin endpoints.
    /// Admin endpoints are disabled when unset.
    #[serde(default, skip_serializing)]
    pub admin_token: Option<String>,

    /// Origins allowed to call the API from a browser (the chat widget)
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 8080,
            workers: 0,
            admin_token: None,
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Apply `SERVER_*`, `ADMIN_TOKEN` and `CORS_ALLOWED_ORIGINS` overrides on top of `base`
    pub fn from_env_or(base: Self) -> Self {
        let allowed_origins = env_opt("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(base.allowed_origins);

        Self {
            host: env_opt("SERVER_HOST").unwrap_or(base.host),
            port: env_or("SERVER_PORT", base.port),
            workers: env_or("SERVER_WORKERS", base.workers),
            admin_token: env_opt("ADMIN_TOKEN").or(base.admin_token),
            allowed_origins,
        }
    }

    /// Socket address string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
