//! DiagramKit Settings Crate
//!
//! Handles editor configuration: typed sections with defaults, validation
//! and JSON/TOML persistence.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, Config, ConnectorSettings, EventSettings, HistorySettings,
    InteractionSettings, ThemeSettings,
};
pub use error::{SettingsError, SettingsResult};
