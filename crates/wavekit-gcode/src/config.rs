//! Pass configuration
//!
//! Values are validated once, before a pass starts; the passes themselves
//! assume a valid configuration.

use crate::tracker::{RegionFilter, RegionKind, DEFAULT_LAYER_HEIGHT};
use crate::waveform::Waveform;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use wavekit_core::{ParameterError, Point2D};

pub const DEFAULT_AMPLITUDE: f64 = 0.3;
pub const DEFAULT_FREQUENCY: f64 = 1.1;
/// Largest fraction of the amplitude gained per layer away from a solid layer
pub const DEFAULT_MAX_STEP: f64 = 0.1;
/// Sub-segment length in millimeters
pub const DEFAULT_RESOLUTION: f64 = 0.2;

/// Planar axis the wave travels along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    X,
    Y,
    Xy,
    NegX,
    NegY,
    NegXy,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::X,
        Direction::Y,
        Direction::Xy,
        Direction::NegX,
        Direction::NegY,
        Direction::NegXy,
    ];

    /// Position of `p` along this direction
    pub fn project(self, p: Point2D) -> f64 {
        match self {
            Direction::X => p.x,
            Direction::Y => p.y,
            Direction::Xy => p.x + p.y,
            Direction::NegX => -p.x,
            Direction::NegY => -p.y,
            Direction::NegXy => -(p.x + p.y),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::X => "x",
            Direction::Y => "y",
            Direction::Xy => "xy",
            Direction::NegX => "negx",
            Direction::NegY => "negy",
            Direction::NegXy => "negxy",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParameterError::UnknownChoice {
                kind: "direction".to_string(),
                value: s.to_string(),
                expected: "x, y, xy, negx, negy, negxy".to_string(),
            })
    }
}

/// Wave parameters for one region kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationParams {
    pub amplitude: f64,
    pub frequency: f64,
    pub direction: Direction,
    pub waveform: Waveform,
}

impl ModulationParams {
    /// Wave phase at `p`, shifted by `phase_offset`
    pub fn angle(&self, p: Point2D, phase_offset: f64) -> f64 {
        self.frequency * self.direction.project(p) + phase_offset
    }

    /// Z displacement at `p` for the given scaling factor
    pub fn z_offset(&self, p: Point2D, scaling_factor: f64, phase_offset: f64) -> f64 {
        self.amplitude * scaling_factor * self.waveform.evaluate(self.angle(p, phase_offset))
    }
}

/// Options of the non-planar modulation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulationConfig {
    pub wall_amplitude: f64,
    pub wall_frequency: f64,
    pub wall_direction: Direction,
    pub perimeter_function: Waveform,
    pub infill_amplitude: f64,
    pub infill_frequency: f64,
    pub infill_direction: Direction,
    pub infill_function: Waveform,
    pub include_infill: bool,
    pub include_perimeters: bool,
    pub include_external_perimeters: bool,
    /// Cap on the scaling factor gained per layer height (0.0-1.0)
    pub max_step_size: f64,
    /// Sub-segment planar length in millimeters
    pub resolution: f64,
    /// Shift the wave phase by π/2 on every other wall loop
    pub alternate_loops: bool,
    /// Used when the layer height cannot be inferred from the file
    pub default_layer_height: f64,
    /// Append a trailing comment describing each emitted move
    pub annotate: bool,
}

impl Default for ModulationConfig {
    fn default() -> Self {
        Self {
            wall_amplitude: DEFAULT_AMPLITUDE,
            wall_frequency: DEFAULT_FREQUENCY,
            wall_direction: Direction::X,
            perimeter_function: Waveform::Sine,
            infill_amplitude: DEFAULT_AMPLITUDE,
            infill_frequency: DEFAULT_FREQUENCY,
            infill_direction: Direction::X,
            infill_function: Waveform::Sine,
            include_infill: false,
            include_perimeters: false,
            include_external_perimeters: false,
            max_step_size: DEFAULT_MAX_STEP,
            resolution: DEFAULT_RESOLUTION,
            alternate_loops: false,
            default_layer_height: DEFAULT_LAYER_HEIGHT,
            annotate: true,
        }
    }
}

impl ModulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wall_params(&self) -> ModulationParams {
        ModulationParams {
            amplitude: self.wall_amplitude,
            frequency: self.wall_frequency,
            direction: self.wall_direction,
            waveform: self.perimeter_function,
        }
    }

    pub fn infill_params(&self) -> ModulationParams {
        ModulationParams {
            amplitude: self.infill_amplitude,
            frequency: self.infill_frequency,
            direction: self.infill_direction,
            waveform: self.infill_function,
        }
    }

    /// Parameters for `region`; `None` outside modulated regions
    pub fn params_for(&self, region: RegionKind) -> Option<ModulationParams> {
        match region {
            RegionKind::Infill => Some(self.infill_params()),
            RegionKind::InternalWall | RegionKind::ExternalWall => Some(self.wall_params()),
            RegionKind::None => None,
        }
    }

    pub fn region_filter(&self) -> RegionFilter {
        RegionFilter {
            infill: self.include_infill,
            internal_walls: self.include_perimeters,
            external_walls: self.include_external_perimeters,
        }
    }

    /// Whether any region is selected for modulation
    pub fn is_enabled(&self) -> bool {
        self.include_infill || self.include_perimeters || self.include_external_perimeters
    }

    /// Check every value before a pass runs
    pub fn validate(&self) -> Result<(), ParameterError> {
        for (name, value) in [
            ("wall_amplitude", self.wall_amplitude),
            ("infill_amplitude", self.infill_amplitude),
        ] {
            require_finite(name, value)?;
            if value < 0.0 {
                return Err(ParameterError::OutOfRange {
                    name: name.to_string(),
                    value,
                    min: 0.0,
                    max: f64::INFINITY,
                });
            }
        }
        require_finite("wall_frequency", self.wall_frequency)?;
        require_finite("infill_frequency", self.infill_frequency)?;

        require_finite("max_step_size", self.max_step_size)?;
        if !(0.0..=1.0).contains(&self.max_step_size) {
            return Err(ParameterError::OutOfRange {
                name: "max_step_size".to_string(),
                value: self.max_step_size,
                min: 0.0,
                max: 1.0,
            });
        }

        require_positive("resolution", self.resolution)?;
        require_positive("default_layer_height", self.default_layer_height)?;
        Ok(())
    }
}

fn require_finite(name: &str, value: f64) -> Result<(), ParameterError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParameterError::NotFinite {
            name: name.to_string(),
            value,
        })
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), ParameterError> {
    require_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::NotPositive {
            name: name.to_string(),
            value,
        })
    }
}
