//! Application state and route table

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use lc_core::VerificationEngine;
use lc_infra::Infrastructure;
use lc_shared::{error_codes, ErrorResponse};

use crate::routes::{admin, health, verification};

/// Shared state handed to every handler
pub struct AppState {
    pub infrastructure: Arc<Infrastructure>,
    /// Expected `X-Admin-Token`; admin endpoints are disabled when `None`
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(infrastructure: Arc<Infrastructure>, admin_token: Option<String>) -> Self {
        Self {
            infrastructure,
            admin_token,
        }
    }

    pub fn engine(&self) -> &VerificationEngine {
        &self.infrastructure.engine
    }
}

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/verification")
                        .route("/request", web::post().to(verification::request_code))
                        .route("/submit", web::post().to(verification::submit_code)),
                )
                .service(
                    web::scope("/admin")
                        .route("/rate-limit/unblock", web::post().to(admin::unblock))
                        .route("/cost/prediction", web::get().to(admin::cost_prediction))
                        .route("/cost/daily", web::get().to(admin::daily_stats)),
                ),
        )
        .default_service(web::route().to(not_found));
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found | 요청한 리소스를 찾을 수 없습니다",
    ))
}
