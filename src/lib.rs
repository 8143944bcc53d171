//! # WaveKit
//!
//! A G-code post-processor for FDM printers: infill and wall moves are
//! subdivided and their Z follows a periodic wave, damped near solid layers,
//! so the layers of a print interlock instead of stacking flat.
//!
//! ## Architecture
//!
//! WaveKit is organized as a workspace with multiple crates:
//!
//! 1. **wavekit-core** - Error taxonomy and planar geometry
//! 2. **wavekit-gcode** - Line parser, slicer dialects, region tracking and the modulation pass
//! 3. **wavekit-settings** - JSON/TOML settings files
//! 4. **wavekit** - Logging setup and the command-line binary

use std::path::Path;

pub use wavekit_core::{Error, GcodeError, ParameterError, Point2D, Result};

pub use wavekit_gcode::{
    rewrite, write_lines, CollectingSink, DiagnosticSink, Direction, GcodeFile, LinePass,
    ModulationConfig, ModulationPass, PassHandle, PassPipeline, StreamRewriter, TracingSink,
    Waveform,
};

pub use wavekit_settings::{ConfigFormat, Settings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Console output on stdout
/// - RUST_LOG environment variable support (default: info)
/// - An optional plain-text copy in `log_file`, appended to
pub fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    use std::fs::OpenOptions;
    use std::sync::Mutex;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_level(true);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true)
                    .with_line_number(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Read `input`, run `pipeline` over it and write the result to `output`
///
/// `output` may be the same path as `input`. Returns the number of lines
/// written.
pub fn process_file(
    input: &Path,
    output: &Path,
    pipeline: &PassPipeline,
    sink: &dyn DiagnosticSink,
) -> Result<usize> {
    let lines = GcodeFile::open(input)?.read_lines()?;
    sink.info(&format!("Read {} lines from {}", lines.len(), input.display()));

    let processed = pipeline.run(lines, sink)?;
    write_lines(output, &processed)?;
    sink.info(&format!(
        "Wrote {} lines to {}",
        processed.len(),
        output.display()
    ));

    Ok(processed.len())
}
