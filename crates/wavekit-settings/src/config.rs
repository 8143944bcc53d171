//! Settings files
//!
//! A settings file holds one table per pass. Missing keys take their
//! defaults, so a file only needs the values it changes:
//!
//! ```toml
//! [modulation]
//! include_infill = true
//! infill_amplitude = 0.6
//! infill_direction = "xy"
//! ```

use crate::error::{ConfigError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wavekit_gcode::ModulationConfig;

/// On-disk format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Format for `path`
    ///
    /// # Errors
    /// Returns [`ConfigError::UnsupportedFormat`] for anything but `.json`
    /// and `.toml`.
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ConfigFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(ConfigFormat::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )
            .into()),
        }
    }
}

/// Complete settings for every pass
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub modulation: ModulationConfig,
}

impl Settings {
    /// Load settings from a JSON or TOML file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let settings = Self::parse(&content, format)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a JSON or TOML file
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        let format = ConfigFormat::from_path(path)?;
        let content = self.render(format)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Parse and validate settings text
    pub fn parse(content: &str, format: ConfigFormat) -> SettingsResult<Self> {
        let settings: Self = match format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate and serialize
    pub fn render(&self, format: ConfigFormat) -> SettingsResult<String> {
        self.validate()?;
        Ok(match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        })
    }

    /// Validate every pass configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.modulation.validate()?;
        Ok(())
    }
}
