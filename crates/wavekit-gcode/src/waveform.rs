//! Periodic waveforms used to displace Z
//!
//! Every waveform maps an angle (radians) to a value in `[-1, 1]` with a
//! period of `2π`.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::str::FromStr;
use wavekit_core::ParameterError;

/// Supported periodic shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    /// `sin(angle)`
    #[default]
    Sine,
    /// Linear ramp -1 → +1 over the first half period, back down over the second
    Triangle,
    /// Ramp up, hold high, ramp down, hold low; one quarter period each
    Trapezoidal,
    /// Descending ramp from +1 to -1 with a hard reset every period
    Sawtooth,
}

impl Waveform {
    /// All waveforms, in declaration order
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Trapezoidal,
        Waveform::Sawtooth,
    ];

    /// Evaluate the waveform at `angle`
    pub fn evaluate(self, angle: f64) -> f64 {
        match self {
            Waveform::Sine => angle.sin(),
            Waveform::Triangle => {
                let t = phase(angle);
                if t < 0.5 {
                    -1.0 + 4.0 * t
                } else {
                    3.0 - 4.0 * t
                }
            }
            Waveform::Trapezoidal => {
                let t = phase(angle);
                if t < 0.25 {
                    -1.0 + (t / 0.25) * 2.0
                } else if t < 0.5 {
                    1.0
                } else if t < 0.75 {
                    1.0 - ((t - 0.5) / 0.25) * 2.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 1.0 - angle.rem_euclid(TAU) / PI,
        }
    }

    /// Lowercase name as used in configuration files and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Trapezoidal => "trapezoidal",
            Waveform::Sawtooth => "sawtooth",
        }
    }
}

/// Fractional position within the current `2π` period, in `[0, 1]`
fn phase(angle: f64) -> f64 {
    (angle / TAU).rem_euclid(1.0)
}

/// Evaluate `kind` at `angle`
pub fn evaluate(kind: Waveform, angle: f64) -> f64 {
    kind.evaluate(angle)
}

impl std::fmt::Display for Waveform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Waveform::ALL
            .into_iter()
            .find(|w| w.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParameterError::UnknownChoice {
                kind: "waveform".to_string(),
                value: s.to_string(),
                expected: "sine, triangle, trapezoidal, sawtooth".to_string(),
            })
    }
}
