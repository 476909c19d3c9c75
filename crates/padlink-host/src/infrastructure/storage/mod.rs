//! Persistence: the TOML app configuration and the JSON command map.

pub mod commands;
pub mod config;

pub use commands::CommandStore;
pub use config::{load_config, AppConfig};
