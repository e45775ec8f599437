//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management and schema migrations
//! - Lead lookup by hashed phone number
//! - Daily SMS send statistics

pub mod connection;
pub mod lead_repository;
pub mod stats_repository;

pub use connection::DatabasePool;
pub use lead_repository::MySqlLeadStore;
pub use stats_repository::MySqlStatsSink;
