//! Configuration and color scheme management for folio.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.folio/config.toml`
//! - Built-in color schemes (dark, light)
//! - Runtime theme switching
//!
//! # Configuration File
//!
//! The configuration file is located at `~/.folio/config.toml`:
//!
//! ```toml
//! # Color scheme: dark, light
//! theme = "dark"
//!
//! # Name shown in the prompt and the welcome banner
//! owner = "apoorv"
//!
//! [assistant]
//! endpoint = "http://localhost:8000/query"
//! timeout_secs = 30
//!
//! [location]
//! enabled = true
//! locator_url = "http://ip-api.com/json/"
//! geocoder_url = "https://nominatim.openstreetmap.org/reverse"
//! timeout_secs = 5
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Color scheme name
    pub theme: String,
    /// Name shown in the prompt and banner
    pub owner: String,
    /// Remote assistant settings
    pub assistant: AssistantConfig,
    /// `whereami` settings
    pub location: LocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            owner: "apoorv".to_string(),
            assistant: AssistantConfig::default(),
            location: LocationConfig::default(),
        }
    }
}

/// Remote assistant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/query".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AssistantConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Location lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// When false, `whereami` reports location as unsupported
    pub enabled: bool,
    pub locator_url: String,
    pub geocoder_url: String,
    /// Bounded wait for the coordinates
    pub timeout_secs: u64,
    /// Nominatim rejects requests without one
    pub user_agent: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            locator_url: "http://ip-api.com/json/".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org/reverse".to_string(),
            timeout_secs: 5,
            user_agent: concat!("folioterm/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl LocationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    pub fn load() -> Self {
        match Self::get_config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        folio_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get the color scheme
    pub fn get_color_scheme(&self) -> ColorScheme {
        ColorScheme::by_name(&self.theme)
    }
}

/// Color definition (RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// Color scheme definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorScheme {
    pub name: String,

    // Terminal body
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub accent: Color,
    pub error: Color,

    // Header
    pub banner_fg: Color,
    pub card_active_fg: Color,
    pub card_dim_fg: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl ColorScheme {
    /// Dark scheme
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),

            background: Color::new(26, 26, 26),
            foreground: Color::new(245, 245, 245),
            muted: Color::new(156, 163, 175),
            accent: Color::new(34, 139, 34),
            error: Color::new(239, 83, 80),

            banner_fg: Color::new(245, 245, 245),
            card_active_fg: Color::new(245, 245, 245),
            card_dim_fg: Color::new(110, 110, 110),

            status_bar_bg: Color::new(40, 40, 40),
            status_bar_fg: Color::new(180, 180, 180),
        }
    }

    /// Light scheme
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),

            background: Color::new(245, 245, 245),
            foreground: Color::new(26, 26, 26),
            muted: Color::new(107, 114, 128),
            accent: Color::new(0, 100, 0),
            error: Color::new(198, 40, 40),

            banner_fg: Color::new(26, 26, 26),
            card_active_fg: Color::new(26, 26, 26),
            card_dim_fg: Color::new(160, 160, 160),

            status_bar_bg: Color::new(225, 225, 225),
            status_bar_fg: Color::new(60, 60, 60),
        }
    }

    /// Get scheme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    /// The other scheme
    pub fn toggled(&self) -> Self {
        if self.name == "light" {
            Self::dark()
        } else {
            Self::light()
        }
    }
}

/// `~/.folio`, created on first use
pub fn folio_dir() -> Option<PathBuf> {
    let dir = home_dir()?.join(".folio");
    if !dir.exists() {
        let _ = fs::create_dir_all(&dir);
    }
    Some(dir)
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            theme = "light"

            [assistant]
            endpoint = "http://example.test/ask"
            "#,
        )
        .unwrap();

        assert_eq!(config.theme, "light");
        assert_eq!(config.owner, "apoorv");
        assert_eq!(config.assistant.endpoint, "http://example.test/ask");
        assert_eq!(config.assistant.timeout_secs, 30);
        assert!(config.location.enabled);
        assert_eq!(config.location.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.assistant.endpoint, "http://localhost:8000/query");
        assert_eq!(config.get_color_scheme().name, "dark");
    }

    #[test]
    fn test_invalid_config() {
        let err = Config::from_toml_str("theme = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_scheme_lookup_and_toggle() {
        assert_eq!(ColorScheme::by_name("LIGHT").name, "light");
        assert_eq!(ColorScheme::by_name("solarized").name, "dark");
        assert_eq!(ColorScheme::dark().toggled().name, "light");
        assert_eq!(ColorScheme::light().toggled().name, "dark");
    }
}
