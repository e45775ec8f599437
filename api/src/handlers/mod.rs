//! Error to HTTP response mapping

pub mod error;

pub use error::{ApiError, Language};
