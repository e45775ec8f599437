//! Admin token guard
//!
//! Admin handlers take [`AdminAuth`] as an argument; extraction fails unless
//! the `X-Admin-Token` header matches the configured token. With no token
//! configured every admin endpoint answers 404.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use constant_time_eq::constant_time_eq;
use std::future::{ready, Ready};

use crate::app::AppState;
use crate::handlers::ApiError;

pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Proof that the request carried a valid admin token
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

impl FromRequest for AdminAuth {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authorize(req))
    }
}

fn authorize(req: &HttpRequest) -> Result<AdminAuth, ApiError> {
    let expected = req
        .app_data::<web::Data<AppState>>()
        .and_then(|state| state.admin_token.clone())
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::AdminDisabled)?;

    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
        Ok(AdminAuth)
    } else {
        tracing::warn!(
            path = %req.path(),
            event = "admin_auth_rejected",
            "Rejected admin request"
        );
        Err(ApiError::Unauthorized)
    }
}
