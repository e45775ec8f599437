//! In-process stores
//!
//! Used by the `memory` storage backend and by tests. Everything here is
//! lost when the process exits.

mod code_store;
mod lead_store;
mod stats_sink;

pub use code_store::InMemoryCodeStore;
pub use lead_store::InMemoryLeadStore;
pub use stats_sink::InMemoryStatsSink;
