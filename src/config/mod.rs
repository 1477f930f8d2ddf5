//! Configuration loading and the protocol's wire names.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, HistoryConfig, ProtocolConfig, TransportConfig};
