//! WaveKit Settings Crate
//!
//! Loads, validates and saves the modulation settings as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{ConfigFormat, Settings};
pub use error::{ConfigError, SettingsError, SettingsResult};
