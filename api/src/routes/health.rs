//! Health check

use actix_web::{web, HttpResponse};
use std::collections::HashMap;

use lc_shared::{HealthResponse, HealthStatus};

use crate::app::AppState;

/// `GET /health`
///
/// 200 while healthy or degraded, 503 when a storage backend is down.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let services: HashMap<String, _> = state
        .infrastructure
        .service_health()
        .await
        .into_iter()
        .map(|(name, health)| (name.to_string(), health))
        .collect();

    let body = HealthResponse::from_services(services, env!("CARGO_PKG_VERSION"));
    match body.status {
        HealthStatus::Unhealthy => HttpResponse::ServiceUnavailable().json(body),
        HealthStatus::Healthy | HealthStatus::Degraded => HttpResponse::Ok().json(body),
    }
}
