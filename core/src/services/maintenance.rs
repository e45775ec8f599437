//! Scheduled maintenance for the verification engine
//!
//! Runs the periodic jobs that keep in-memory state bounded and the daily
//! cost counters rolling: rate-limit sweep, duplicate-window purge, day
//! rollover check and expired-code cleanup. Each job runs on its own task
//! and stops when the handle is shut down.

use lc_shared::AppConfig;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::services::verification::VerificationEngine;

/// Job intervals
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    pub rate_limit_sweep_interval: Duration,
    pub recent_send_purge_interval: Duration,
    pub rollover_check_interval: Duration,
    pub code_cleanup_interval: Duration,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

impl MaintenanceConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            rate_limit_sweep_interval: secs(config.rate_limit.sweep_interval_seconds),
            recent_send_purge_interval: secs(config.cost.purge_interval_seconds),
            rollover_check_interval: secs(config.cost.rollover_check_interval_seconds),
            code_cleanup_interval: secs(config.verification.cleanup_interval_seconds),
        }
    }
}

fn secs(seconds: u64) -> Duration {
    Duration::from_secs(seconds.max(1))
}

/// Periodic maintenance over one engine
pub struct MaintenanceService {
    engine: VerificationEngine,
    config: MaintenanceConfig,
}

impl MaintenanceService {
    pub fn new(engine: VerificationEngine, config: MaintenanceConfig) -> Self {
        Self { engine, config }
    }

    /// Forget phones idle past the inactivity TTL
    pub async fn run_rate_limit_sweep(&self) -> usize {
        let removed = self.engine.rate_limiter().sweep().await;
        if removed > 0 {
            info!(removed = removed, event = "rate_limit_sweep", "Removed idle rate limit entries");
        }
        removed
    }

    /// Drop duplicate-window entries older than the window
    pub async fn run_recent_send_purge(&self) -> usize {
        let removed = self.engine.cost_guard().purge_recent_sends().await;
        if removed > 0 {
            debug!(removed = removed, event = "recent_send_purge", "Purged stale recent sends");
        }
        removed
    }

    /// Roll the daily cost counters if the local date changed
    pub async fn run_rollover_check(&self) -> bool {
        self.engine.cost_guard().check_rollover().await
    }

    /// Delete codes past their expiry
    pub async fn run_code_cleanup(&self) -> usize {
        match self.engine.purge_expired_codes().await {
            Ok(removed) => {
                if removed > 0 {
                    info!(removed = removed, event = "code_cleanup", "Deleted expired verification codes");
                }
                removed
            }
            Err(e) => {
                error!(error = %e, event = "code_cleanup_failed", "Expired code cleanup failed");
                0
            }
        }
    }

    /// Start every job as a background task
    ///
    /// The first run of each job happens one interval after start.
    pub fn start_background_tasks(self: Arc<Self>) -> MaintenanceHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            sweep_seconds = self.config.rate_limit_sweep_interval.as_secs(),
            purge_seconds = self.config.recent_send_purge_interval.as_secs(),
            rollover_seconds = self.config.rollover_check_interval.as_secs(),
            cleanup_seconds = self.config.code_cleanup_interval.as_secs(),
            "Maintenance tasks started"
        );

        let tasks = vec![
            spawn_job("rate_limit_sweep", self.config.rate_limit_sweep_interval, shutdown_rx.clone(), {
                let service = self.clone();
                move || {
                    let service = service.clone();
                    async move {
                        service.run_rate_limit_sweep().await;
                    }
                }
            }),
            spawn_job("recent_send_purge", self.config.recent_send_purge_interval, shutdown_rx.clone(), {
                let service = self.clone();
                move || {
                    let service = service.clone();
                    async move {
                        service.run_recent_send_purge().await;
                    }
                }
            }),
            spawn_job("rollover_check", self.config.rollover_check_interval, shutdown_rx.clone(), {
                let service = self.clone();
                move || {
                    let service = service.clone();
                    async move {
                        service.run_rollover_check().await;
                    }
                }
            }),
            spawn_job("code_cleanup", self.config.code_cleanup_interval, shutdown_rx, {
                let service = self.clone();
                move || {
                    let service = service.clone();
                    async move {
                        service.run_code_cleanup().await;
                    }
                }
            }),
        ];

        MaintenanceHandle {
            shutdown: shutdown_tx,
            tasks,
            service: self,
        }
    }
}

fn spawn_job<F, Fut>(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer.tick().await;

        loop {
            tokio::select! {
                _ = timer.tick() => job().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!(job = name, "Maintenance job stopped");
    })
}

/// Running maintenance tasks
pub struct MaintenanceHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
    service: Arc<MaintenanceService>,
}

impl MaintenanceHandle {
    /// Stop every job, wait for them to exit and persist today's counters
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Maintenance task ended abnormally");
            }
        }
        self.service.engine.cost_guard().flush().await;
        info!("Maintenance tasks stopped");
    }
}
