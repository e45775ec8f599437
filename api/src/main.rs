use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use lc_api::{configure, middleware::create_cors, telemetry, AppState};
use lc_core::{MaintenanceConfig, MaintenanceService};
use lc_infra::build_infrastructure;
use lc_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_tracing(&config.logging);

    tracing::info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting LeadCall API server"
    );

    let infrastructure = Arc::new(
        build_infrastructure(&config)
            .await
            .context("failed to initialize infrastructure")?,
    );
    infrastructure.engine.cost_guard().load_history().await;

    let maintenance = Arc::new(MaintenanceService::new(
        infrastructure.engine.clone(),
        MaintenanceConfig::from_app_config(&config),
    ))
    .start_background_tasks();

    if config.server.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set; admin endpoints are disabled");
    }

    let state = web::Data::new(AppState::new(
        infrastructure.clone(),
        config.server.admin_token.clone(),
    ));
    let bind_address = config.server.bind_address();
    let environment = config.environment;
    let server_config = config.server.clone();

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(create_cors(environment, &server_config))
            .wrap(TracingLogger::default())
            .configure(configure)
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    tracing::info!(address = %bind_address, "HTTP server listening");
    let result = server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await;

    // Persist today's counters before the process exits
    maintenance.shutdown().await;
    infrastructure.close().await;
    tracing::info!("LeadCall API server stopped");

    result.context("HTTP server error")
}
