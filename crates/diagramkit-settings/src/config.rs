//! Configuration for the diagram editor core
//!
//! Provides configuration file handling, defaults, and validation.
//! Supports JSON and TOML file formats stored in the platform config directory.
//!
//! Configuration is organized into logical sections:
//! - History settings (undo depth)
//! - Interaction settings (hit tolerance, connector click padding)
//! - Connector defaults (routing, curvature, anchoring, cascade policy)
//! - Theme fallback colors handed to renderers
//! - Event bus settings

use diagramkit_core::{CascadePolicy, ConnectorType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Undo/redo history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of commands kept on the undo stack
    pub max_depth: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

/// Pointer interaction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Distance in diagram units within which a connector counts as hit
    pub hit_tolerance: f64,
    /// Padding added around connector bounds so flat connectors stay clickable
    pub connector_padding: f64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            hit_tolerance: 5.0,
            connector_padding: 10.0,
        }
    }
}

/// Connector creation and routing defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorSettings {
    /// Routing style for new connectors
    pub default_type: ConnectorType,
    /// Bow of new curved connectors (1.0 = normal)
    pub default_curvature: f64,
    /// Route orthogonal connectors out of their anchor's side
    pub anchor_aware_routing: bool,
    /// Length of the straight stub leaving an anchor when routing
    pub stub_length: f64,
    /// Re-pick nearest anchors for attached connectors when shapes move
    pub auto_recalculate_anchors: bool,
    /// Fate of attached connectors when a shape is deleted
    pub cascade_policy: CascadePolicy,
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            default_type: ConnectorType::Straight,
            default_curvature: 1.0,
            anchor_aware_routing: false,
            stub_length: 20.0,
            auto_recalculate_anchors: false,
            cascade_policy: CascadePolicy::Delete,
        }
    }
}

/// Fallback colors used when an entity has no explicit style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    pub fill_color: String,
    pub stroke_color: String,
    pub text_color: String,
    pub connector_color: String,
    pub stroke_width: f64,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            fill_color: "#ffffff".to_string(),
            stroke_color: "#333333".to_string(),
            text_color: "#000000".to_string(),
            connector_color: "#333333".to_string(),
            stroke_width: 2.0,
        }
    }
}

/// Change-notification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Keep a bounded log of published events
    pub enable_history: bool,
    /// Maximum number of events kept in the log
    pub max_history_size: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            enable_history: false,
            max_history_size: 1000,
        }
    }
}

/// Complete editor configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub history: HistorySettings,
    pub interaction: InteractionSettings,
    pub connectors: ConnectorSettings,
    pub theme: ThemeSettings,
    pub events: EventSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML, chosen by extension)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match extension(path).as_deref() {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(SettingsError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        config.validate()?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path).as_deref() {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(SettingsError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        tracing::debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.history.max_depth == 0 {
            return Err(SettingsError::invalid(
                "history.max_depth",
                "must be greater than 0",
            ));
        }

        non_negative("interaction.hit_tolerance", self.interaction.hit_tolerance)?;
        non_negative(
            "interaction.connector_padding",
            self.interaction.connector_padding,
        )?;
        non_negative(
            "connectors.default_curvature",
            self.connectors.default_curvature,
        )?;
        non_negative("connectors.stub_length", self.connectors.stub_length)?;

        if !(0.0..=100.0).contains(&self.theme.stroke_width) {
            return Err(SettingsError::invalid(
                "theme.stroke_width",
                "must be between 0 and 100",
            ));
        }

        for (key, value) in [
            ("theme.fill_color", &self.theme.fill_color),
            ("theme.stroke_color", &self.theme.stroke_color),
            ("theme.text_color", &self.theme.text_color),
            ("theme.connector_color", &self.theme.connector_color),
        ] {
            if value.trim().is_empty() {
                return Err(SettingsError::invalid(key, "must not be empty"));
            }
        }

        if self.events.max_history_size == 0 {
            return Err(SettingsError::invalid(
                "events.max_history_size",
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Default location of the editor configuration file
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("diagramkit").join("config.toml"))
        .ok_or_else(|| {
            SettingsError::ConfigDirectory("platform config directory unavailable".to_string())
        })
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn non_negative(key: &str, value: f64) -> SettingsResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SettingsError::invalid(
            key,
            format!("must be a finite non-negative number, got {}", value),
        ));
    }
    Ok(())
}
