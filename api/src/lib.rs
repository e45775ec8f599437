//! HTTP surface of the LeadCall verification backend
//!
//! - `POST /api/v1/verification/request` and `/submit` for the chat widget
//! - `/api/v1/admin/*` operator endpoints behind `X-Admin-Token`
//! - `GET /health`

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{configure, AppState};
