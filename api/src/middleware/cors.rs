//! CORS configuration for the chat widget
//!
//! Development allows any origin. Otherwise only the origins listed in
//! `CORS_ALLOWED_ORIGINS` may call the API from a browser.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use lc_shared::{Environment, ServerConfig};

const MAX_AGE_SECONDS: usize = 3600;

pub fn create_cors(environment: Environment, server: &ServerConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-admin-token"),
        ])
        .expose_headers(vec![header::RETRY_AFTER])
        .max_age(MAX_AGE_SECONDS);

    if environment.is_development() && server.allowed_origins.is_empty() {
        tracing::info!("Configuring permissive CORS for development");
        return cors.allow_any_origin();
    }

    tracing::info!(origins = ?server.allowed_origins, "Configuring CORS");
    server
        .allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
