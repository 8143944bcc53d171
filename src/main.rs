//! wavekit CLI - non-planar G-code post-processor

use anyhow::{Context, Result};
use clap::{Args, Parser};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use wavekit::{
    init_logging, process_file, Direction, ModulationConfig, ModulationPass, PassHandle,
    PassPipeline, Settings, TracingSink, Waveform, BUILD_DATE, VERSION,
};

#[derive(Parser)]
#[command(name = "wavekit", version)]
#[command(about = "Non-planar G-code post-processor", long_about = None)]
struct Cli {
    /// Input G-code file
    input: PathBuf,

    /// Output file (default: overwrite the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Settings file (.json or .toml); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also append logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    modulation: ModulationArgs,
}

#[derive(Args)]
struct ModulationArgs {
    /// Wall wave amplitude in mm
    #[arg(long)]
    wall_amplitude: Option<f64>,
    /// Wall wave frequency in radians per mm
    #[arg(long)]
    wall_frequency: Option<f64>,
    /// Wall wave direction: x, y, xy, negx, negy, negxy
    #[arg(long)]
    wall_direction: Option<Direction>,
    /// Wall waveform: sine, triangle, trapezoidal, sawtooth
    #[arg(long)]
    perimeter_function: Option<Waveform>,
    /// Infill wave amplitude in mm
    #[arg(long)]
    infill_amplitude: Option<f64>,
    /// Infill wave frequency in radians per mm
    #[arg(long)]
    infill_frequency: Option<f64>,
    /// Infill wave direction
    #[arg(long)]
    infill_direction: Option<Direction>,
    /// Infill waveform
    #[arg(long)]
    infill_function: Option<Waveform>,
    /// Modulate sparse infill
    #[arg(long)]
    include_infill: bool,
    /// Modulate internal perimeters
    #[arg(long)]
    include_perimeters: bool,
    /// Modulate external perimeters
    #[arg(long)]
    include_external_perimeters: bool,
    /// Largest fraction of the amplitude gained per layer (0.0-1.0)
    #[arg(long)]
    max_step_size: Option<f64>,
    /// Sub-segment length in mm
    #[arg(long)]
    resolution: Option<f64>,
    /// Shift the wave phase by π/2 on every other wall loop
    #[arg(long)]
    alternate_loops: bool,
    /// Do not append comments to rewritten moves
    #[arg(long)]
    no_annotate: bool,
}

impl ModulationArgs {
    fn apply(&self, config: &mut ModulationConfig) {
        if let Some(v) = self.wall_amplitude {
            config.wall_amplitude = v;
        }
        if let Some(v) = self.wall_frequency {
            config.wall_frequency = v;
        }
        if let Some(v) = self.wall_direction {
            config.wall_direction = v;
        }
        if let Some(v) = self.perimeter_function {
            config.perimeter_function = v;
        }
        if let Some(v) = self.infill_amplitude {
            config.infill_amplitude = v;
        }
        if let Some(v) = self.infill_frequency {
            config.infill_frequency = v;
        }
        if let Some(v) = self.infill_direction {
            config.infill_direction = v;
        }
        if let Some(v) = self.infill_function {
            config.infill_function = v;
        }
        config.include_infill |= self.include_infill;
        config.include_perimeters |= self.include_perimeters;
        config.include_external_perimeters |= self.include_external_perimeters;
        if let Some(v) = self.max_step_size {
            config.max_step_size = v;
        }
        if let Some(v) = self.resolution {
            config.resolution = v;
        }
        config.alternate_loops |= self.alternate_loops;
        if self.no_annotate {
            config.annotate = false;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;
    tracing::debug!("wavekit {} (built {})", VERSION, BUILD_DATE);

    let mut settings = load_settings(cli.config.as_deref())?;
    cli.modulation.apply(&mut settings.modulation);
    settings.validate().context("Invalid settings")?;

    let passes: Vec<PassHandle> = vec![Arc::new(ModulationPass::new(settings.modulation))];
    let mut pipeline = PassPipeline::new();
    pipeline.register_all(passes);
    for (name, _, enabled) in pipeline.list_passes() {
        if !enabled {
            tracing::warn!(
                "Pass '{}' has no region selected, the file is copied unchanged \
                 (see --include-infill, --include-perimeters, --include-external-perimeters)",
                name
            );
        }
    }

    let output = cli.output.as_deref().unwrap_or(&cli.input);
    let lines = process_file(&cli.input, output, &pipeline, &TracingSink)
        .with_context(|| format!("Failed to process {}", cli.input.display()))?;

    tracing::info!("Done: {} lines written to {}", lines, output.display());
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}
