//! Redis-backed storage
//!
//! Verification codes live in Redis under `{prefix}:verification:code:{phone}`
//! as JSON, expiring on their own shortly after the code itself expires.

pub mod code_store;
pub mod redis_client;

pub use code_store::RedisCodeStore;
pub use redis_client::RedisClient;
