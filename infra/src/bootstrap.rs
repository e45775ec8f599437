//! Wiring of the verification engine from configuration
//!
//! Picks the storage backend, SMS provider and alert sink named in
//! `AppConfig` and assembles a ready `VerificationEngine`.

use std::sync::Arc;

use lc_core::{
    AlertSink, Clock, CodeStore, CostGuard, LeadStore, RateLimiter, RetryingDispatcher,
    StatsSink, SystemClock, VerificationEngine, VerificationServiceConfig,
};
use lc_shared::{AppConfig, HealthStatus, ServiceHealth, StorageBackend, StorageConfig};

use crate::alerts::create_alert_sink;
use crate::cache::{RedisClient, RedisCodeStore};
#[cfg(feature = "mysql")]
use crate::database::{DatabasePool, MySqlLeadStore, MySqlStatsSink};
use crate::memory::{InMemoryCodeStore, InMemoryLeadStore, InMemoryStatsSink};
use crate::sms::create_sms_sender;
use crate::InfrastructureError;

/// Assembled engine plus the connections behind it
pub struct Infrastructure {
    pub engine: VerificationEngine,
    pub redis: Option<RedisClient>,
    #[cfg(feature = "mysql")]
    pub database: Option<DatabasePool>,
}

impl Infrastructure {
    /// Health of Redis, MySQL and the SMS provider, in that order
    ///
    /// Backends that are not in use are omitted.
    pub async fn service_health(&self) -> Vec<(&'static str, ServiceHealth)> {
        let mut services = Vec::new();

        if let Some(redis) = &self.redis {
            services.push(("redis", probe(redis.health_check().await, HealthStatus::Unhealthy)));
        }
        #[cfg(feature = "mysql")]
        if let Some(database) = &self.database {
            services.push(("database", probe(database.health_check().await, HealthStatus::Unhealthy)));
        }
        // Codes can still be verified while the provider is down
        services.push(("sms", probe(self.engine.sms_healthy().await, HealthStatus::Degraded)));

        services
    }

    /// Close pooled connections
    pub async fn close(&self) {
        #[cfg(feature = "mysql")]
        if let Some(database) = &self.database {
            database.close().await;
        }
    }
}

fn probe(healthy: bool, failed: HealthStatus) -> ServiceHealth {
    if healthy {
        ServiceHealth::healthy()
    } else {
        ServiceHealth::with_status(failed, "health check failed")
    }
}

struct Stores {
    codes: Arc<dyn CodeStore>,
    leads: Arc<dyn LeadStore>,
    stats: Arc<dyn StatsSink>,
    redis: Option<RedisClient>,
    #[cfg(feature = "mysql")]
    database: Option<DatabasePool>,
}

fn memory_stores() -> Stores {
    Stores {
        codes: Arc::new(InMemoryCodeStore::new()),
        leads: Arc::new(InMemoryLeadStore::new()),
        stats: Arc::new(InMemoryStatsSink::new()),
        redis: None,
        #[cfg(feature = "mysql")]
        database: None,
    }
}

#[cfg(feature = "mysql")]
async fn persistent_stores(config: &StorageConfig) -> Result<Stores, InfrastructureError> {
    let redis = RedisClient::new(config).await?;
    let database = DatabasePool::new(config).await?;
    database.run_migrations().await?;

    Ok(Stores {
        codes: Arc::new(RedisCodeStore::new(redis.clone())),
        leads: Arc::new(MySqlLeadStore::new(database.get_pool().clone())),
        stats: Arc::new(MySqlStatsSink::new(database.get_pool().clone())),
        redis: Some(redis),
        database: Some(database),
    })
}

#[cfg(not(feature = "mysql"))]
async fn persistent_stores(_config: &StorageConfig) -> Result<Stores, InfrastructureError> {
    Err(InfrastructureError::Config(
        "Persistent storage requires the mysql feature".to_string(),
    ))
}

/// Build the engine described by `config`
///
/// The cost guard starts with empty counters; the caller loads monthly
/// history with `engine.cost_guard().load_history()` before serving.
pub async fn build_infrastructure(config: &AppConfig) -> Result<Infrastructure, InfrastructureError> {
    config.validate().map_err(InfrastructureError::Config)?;

    let stores = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; codes and statistics are lost on restart");
            memory_stores()
        }
        StorageBackend::Persistent => persistent_stores(&config.storage).await?,
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sms_sender = create_sms_sender(&config.sms)?;
    let alert_sink: Arc<dyn AlertSink> = create_alert_sink(&config.alert)?;

    let engine = VerificationEngine::new(
        stores.codes,
        stores.leads,
        Arc::new(RetryingDispatcher::new(sms_sender, config.dispatch.clone())),
        Arc::new(RateLimiter::new(config.rate_limit.clone(), clock.clone())),
        Arc::new(CostGuard::new(
            config.cost.clone(),
            clock.clone(),
            stores.stats,
            alert_sink,
        )),
        clock,
        VerificationServiceConfig::from_app_config(config),
    );

    tracing::info!(
        environment = ?config.environment,
        storage = ?config.storage.backend,
        sms_provider = ?config.sms.provider,
        "Verification engine assembled"
    );

    Ok(Infrastructure {
        engine,
        redis: stores.redis,
        #[cfg(feature = "mysql")]
        database: stores.database,
    })
}
