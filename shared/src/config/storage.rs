//! Storage backend configuration

use serde::{Deserialize, Serialize};

use super::{env_opt, env_or};

/// Where verification codes, leads and send statistics live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; state is lost on restart
    Memory,
    /// Codes in Redis, leads and statistics in MySQL
    Persistent,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            "persistent" | "redis" | "mysql" => Ok(StorageBackend::Persistent),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Selected backend
    pub backend: StorageBackend,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Key prefix for everything written to Redis
    #[serde(default = "default_key_prefix")]
    pub redis_key_prefix: String,

    /// MySQL connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Maximum MySQL pool connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            redis_url: default_redis_url(),
            redis_key_prefix: default_key_prefix(),
            database_url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl StorageConfig {
    /// Production defaults use the persistent backend
    pub fn production() -> Self {
        Self {
            backend: StorageBackend::Persistent,
            ..Default::default()
        }
    }

    /// Apply `STORAGE_BACKEND`, `REDIS_URL` and `DATABASE_URL` overrides on top of `base`
    pub fn from_env_or(base: Self) -> Self {
        Self {
            backend: env_or("STORAGE_BACKEND", base.backend),
            redis_url: env_opt("REDIS_URL").unwrap_or(base.redis_url),
            redis_key_prefix: env_opt("REDIS_KEY_PREFIX").unwrap_or(base.redis_key_prefix),
            database_url: env_opt("DATABASE_URL").unwrap_or(base.database_url),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", base.max_connections),
        }
    }
}

fn default_redis_url() -> String {
    String::from("redis://localhost:6379")
}

fn default_key_prefix() -> String {
    String::from("leadcall")
}

fn default_database_url() -> String {
    String::from("mysql://localhost:3306/leadcall")
}

fn default_max_connections() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!("redis".parse::<StorageBackend>().unwrap(), StorageBackend::Persistent);
        assert!("floppy".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_production_is_persistent() {
        assert_eq!(StorageConfig::production().backend, StorageBackend::Persistent);
        assert_eq!(StorageConfig::default().backend, StorageBackend::Memory);
    }
}
