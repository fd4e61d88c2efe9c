//! Configuration file support for KineLytix.
//!
//! Serializes the interaction settings (hit radius, time window, arc layout)
//! and user preferences so they can be exported, imported and auto-loaded.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ARC_RADIUS, DEFAULT_HIT_RADIUS, DEFAULT_LABEL_OFFSET, DEFAULT_TIME_WINDOW_SECS,
    DEFAULT_UNDO_HISTORY,
};
use crate::geometry::AngleKind;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration that can be exported and imported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Pointer and rendering tolerances for angle editing
    #[serde(default)]
    pub interaction: InteractionSettings,
}

fn default_app_name() -> String {
    "KineLytix".to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Which measurement new angles display
    #[serde(default)]
    pub default_angle_kind: AngleKind,

    /// Maximum number of undoable edits kept per session
    #[serde(default = "default_undo_history")]
    pub undo_history: usize,
}

fn default_undo_history() -> usize {
    DEFAULT_UNDO_HISTORY
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            default_angle_kind: AngleKind::default(),
            undo_history: default_undo_history(),
        }
    }
}

/// Interaction tolerances. Defaults match the tool's fixed behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionSettings {
    /// Pointer distance (px) for grabbing or hovering a point
    #[serde(default = "default_hit_radius")]
    pub hit_radius: f64,

    /// Seconds around the current time in which saved angles are shown
    #[serde(default = "default_time_window_secs")]
    pub time_window_secs: f64,

    /// Radius (px) of the arc drawn at a vertex
    #[serde(default = "default_arc_radius")]
    pub arc_radius: f64,

    /// Distance (px) beyond the arc at which the label sits
    #[serde(default = "default_label_offset")]
    pub label_offset: f64,
}

fn default_hit_radius() -> f64 {
    DEFAULT_HIT_RADIUS
}

fn default_time_window_secs() -> f64 {
    DEFAULT_TIME_WINDOW_SECS
}

fn default_arc_radius() -> f64 {
    DEFAULT_ARC_RADIUS
}

fn default_label_offset() -> f64 {
    DEFAULT_LABEL_OFFSET
}

impl InteractionSettings {
    /// Distance from the vertex to the arc label.
    pub fn label_distance(&self) -> f64 {
        self.arc_radius + self.label_offset
    }
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            hit_radius: default_hit_radius(),
            time_window_secs: default_time_window_secs(),
            arc_radius: default_arc_radius(),
            label_offset: default_label_offset(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            interaction: InteractionSettings::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        let interaction = &config.interaction;
        if !(interaction.hit_radius > 0.0 && interaction.time_window_secs > 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "hit_radius and time_window_secs must be positive, got {} and {}",
                interaction.hit_radius, interaction.time_window_secs
            )));
        }

        Ok(config)
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "kinelytix-config.json"
    }

    /// Get the default config file path for auto-load/save.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("kinelytix").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("kinelytix")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(&path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A setting is outside its valid range
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
