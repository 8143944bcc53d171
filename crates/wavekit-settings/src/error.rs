//! Error types for the settings crate.
//!
//! Loading and saving can fail on I/O, on (de)serialization, or because the
//! values themselves are out of range.

use std::io;
use thiserror::Error;
use wavekit_core::ParameterError;

/// Errors that can occur while loading or saving settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// A configuration file problem unrelated to its values.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A setting value was rejected by validation.
    #[error("Invalid setting: {0}")]
    Invalid(#[from] ParameterError),
}

/// Errors related to the configuration file itself.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;
