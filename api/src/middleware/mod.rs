//! Request middleware and guards

pub mod admin_auth;
pub mod cors;

pub use admin_auth::{AdminAuth, ADMIN_TOKEN_HEADER};
pub use cors::create_cors;
