//! Operator alert emission for the Aegis pipeline: level mapping, per-identity
//! cooldown, and an optional JSON-lines file sink.

pub mod config;
pub mod error;
pub mod manager;
pub mod sink;

pub use config::AlertManagerConfig;
pub use error::{AlertError, AlertResult};
pub use manager::AlertManager;
pub use sink::FileSink;
