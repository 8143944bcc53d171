//! Error handling for WaveKit
//!
//! Provides error types for every layer of the post-processor:
//! - Parameter errors (configuration values rejected before a pass starts)
//! - G-Code errors (pass failures)
//! - I/O errors (reading and writing G-code or settings files)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Parameter error type
///
/// Raised while validating configuration. A pass never starts with an
/// invalid parameter, so none of these can surface mid-stream.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        /// The parameter name.
        name: String,
        /// The rejected value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// A parameter must be strictly positive.
    #[error("Parameter '{name}' must be > 0, got {value}")]
    NotPositive {
        /// The parameter name.
        name: String,
        /// The rejected value.
        value: f64,
    },

    /// A parameter value is not a finite number.
    #[error("Parameter '{name}' must be finite, got {value}")]
    NotFinite {
        /// The parameter name.
        name: String,
        /// The rejected value.
        value: f64,
    },

    /// A named choice (waveform, direction) is not recognised.
    #[error("Unknown {kind} '{value}' (expected one of: {expected})")]
    UnknownChoice {
        /// What was being chosen, e.g. "waveform".
        kind: String,
        /// The rejected name.
        value: String,
        /// Comma separated list of accepted names.
        expected: String,
    },
}

/// G-Code error type
///
/// The transformation itself degrades gracefully on malformed input, so these
/// are reserved for failures a pass cannot recover from.
#[derive(Error, Debug, Clone)]
pub enum GcodeError {
    /// A pass in the pipeline failed
    #[error("Pass '{pass}' failed: {reason}")]
    PassFailed {
        /// The name of the failing pass.
        pass: String,
        /// The reason reported by the pass.
        reason: String,
    },

    /// The input contained no lines
    #[error("Empty G-code input: {source_name}")]
    EmptyInput {
        /// File name or other label of the input.
        source_name: String,
    },
}

/// Main error type for WaveKit
///
/// A unified error type that can represent any error from all layers.
/// I/O failures are kept apart from transformation failures so callers can
/// report them distinctly.
#[derive(Error, Debug)]
pub enum Error {
    /// Parameter error
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Check if this is a parameter error
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, Error::Parameter(_))
    }

    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
