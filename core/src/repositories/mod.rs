pub mod code_store;
pub mod lead_store;
pub mod stats_sink;

pub use code_store::CodeStore;
pub use lead_store::LeadStore;
pub use stats_sink::StatsSink;
