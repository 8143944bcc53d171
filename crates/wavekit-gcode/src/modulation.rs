//! Non-planar modulation engine
//!
//! Turns one straight extrusion move into a polyline whose Z follows a
//! periodic wave of the planar position. The wave is damped near solid
//! infill layers so tops and floors stay flat, and every sub-move's
//! extrusion is stretched by its 3D length over its planar length.

use crate::config::{ModulationConfig, ModulationParams};
use crate::line::GcodeLine;
use crate::segment::segment;
use crate::tracker::{LayerBounds, RegionKind, RegionTracker};
use std::f64::consts::FRAC_PI_2;
use std::fmt::Write as _;
use wavekit_core::Point2D;

/// Fraction of the configured amplitude allowed at `current_z`
///
/// The raw factor is the distance to the nearest bounding solid layer over
/// the gap between both bounds, further capped so it grows by at most
/// `max_step` per `layer_height` away from a solid layer. With no solid
/// layer on either side the wave is applied at full strength. A solid layer
/// on one side only leaves an infinite gap, so the wave vanishes. Always in
/// `[0, 1]`.
pub fn scaling_factor(
    current_z: f64,
    bounds: LayerBounds,
    layer_height: f64,
    max_step: f64,
) -> f64 {
    if bounds.is_unbounded() {
        return 1.0;
    }

    let below = bounds.last_solid_z_below();
    let above = bounds.next_solid_z_above();
    let nearest = (above - current_z).min(current_z - below);
    let total = above - below;

    let raw = if total > 0.0 {
        nearest / total
    } else {
        1.0
    };
    let cap = if layer_height > 0.0 {
        max_step * nearest / layer_height
    } else {
        1.0
    };

    let factor = raw.min(cap).min(1.0);
    if factor.is_nan() {
        return 0.0;
    }
    factor.clamp(0.0, 1.0)
}

/// Per-loop phase toggling for walls
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoopPhase {
    pub loop_count: u32,
    pub phase_offset: f64,
}

impl LoopPhase {
    /// A new loop began: toggle between 0 and π/2
    pub fn advance(&mut self) {
        self.loop_count = self.loop_count.wrapping_add(1);
        self.phase_offset = if self.loop_count % 2 == 1 { FRAC_PI_2 } else { 0.0 };
    }

    /// A new perimeter region began
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Mutable state of one modulation pass
#[derive(Debug, Clone, Default)]
pub struct PassState {
    /// Last known planar nozzle position
    pub nozzle: Option<Point2D>,
    /// A travel or wall marker announced a new wall loop
    pub new_wall_loop: bool,
    pub loop_phase: LoopPhase,
    /// The last emitted move left the nozzle off the layer Z
    pub z_displaced: bool,
}

/// A qualifying extrusion move, resolved against the pass state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrusionMove {
    pub start: Point2D,
    pub target: Point2D,
    pub extrusion: f64,
    pub feed_rate: Option<f64>,
}

impl ExtrusionMove {
    /// Resolve `line` as an extrusion move starting at `start`
    ///
    /// `None` unless the line is a `G1` with extrusion and a planar target.
    pub fn from_line(line: &GcodeLine<'_>, start: Point2D) -> Option<Self> {
        if !line.is_linear() {
            return None;
        }
        let extrusion = line.e()?;
        let target = line.target(Some(start))?;
        Some(Self {
            start,
            target,
            extrusion,
            feed_rate: line.f(),
        })
    }
}

/// Emits modulated sub-moves for one pass
#[derive(Debug, Clone)]
pub struct ModulationEngine<'c> {
    config: &'c ModulationConfig,
    layer_height: f64,
}

impl<'c> ModulationEngine<'c> {
    pub fn new(config: &'c ModulationConfig, layer_height: f64) -> Self {
        Self {
            config,
            layer_height,
        }
    }

    pub fn layer_height(&self) -> f64 {
        self.layer_height
    }

    /// Scaling factor at the tracker's current Z
    pub fn scaling(&self, tracker: &RegionTracker<'_>) -> f64 {
        scaling_factor(
            tracker.current_z(),
            tracker.bounds(),
            self.layer_height,
            self.config.max_step_size,
        )
    }

    fn phase_for(&self, region: RegionKind, state: &PassState) -> f64 {
        if self.config.alternate_loops && region.is_wall() {
            state.loop_phase.phase_offset
        } else {
            0.0
        }
    }

    /// Extrusion for a sub-move of planar length `resolution` climbing `dz`
    fn corrected_extrusion(&self, share: f64, dz: f64) -> f64 {
        let res = self.config.resolution;
        share * res.hypot(dz) / res
    }

    /// Replace `mv` by modulated sub-moves
    ///
    /// The start point is never re-emitted; the sub-move count is the
    /// segment count, so extrusion is split without dividing by zero even
    /// for a degenerate move.
    pub fn modulate(
        &self,
        mv: &ExtrusionMove,
        params: &ModulationParams,
        tracker: &RegionTracker<'_>,
        state: &PassState,
        out: &mut Vec<String>,
    ) {
        let points = segment(mv.start, mv.target, self.config.resolution);
        let count = points.len() - 1;
        let share = mv.extrusion / count as f64;
        let scaling = self.scaling(tracker);
        let phase = self.phase_for(tracker.region(), state);
        let current_z = tracker.current_z();

        let mut prev_z = current_z;
        for (i, point) in points.iter().enumerate().skip(1) {
            let z = current_z + params.z_offset(*point, scaling, phase);
            let e = self.corrected_extrusion(share, z - prev_z);
            let feed = if i == 1 { mv.feed_rate } else { None };

            let mut line = format_move(*point, z, e, feed);
            if self.config.annotate {
                let _ = write!(line, " ;seg {}/{} from {}->{}", i, count, mv.start, mv.target);
            }
            out.push(line);
            prev_z = z;
        }
    }

    /// Connect the previous nozzle position to a new wall loop
    ///
    /// Every point from the old position to the move's target is emitted,
    /// the start included, and the move's extrusion is spread evenly over
    /// them. This consumes the move.
    pub fn bridge(
        &self,
        mv: &ExtrusionMove,
        tracker: &RegionTracker<'_>,
        state: &PassState,
        out: &mut Vec<String>,
    ) {
        let params = self.config.wall_params();
        let points = segment(mv.start, mv.target, self.config.resolution);
        let share = mv.extrusion / points.len() as f64;
        let scaling = self.scaling(tracker);
        let phase = self.phase_for(tracker.region(), state);
        let current_z = tracker.current_z();

        let mut prev_z: Option<f64> = None;
        for (i, point) in points.iter().enumerate() {
            let z = current_z + params.z_offset(*point, scaling, phase);
            let e = match prev_z {
                Some(pz) => self.corrected_extrusion(share, z - pz),
                None => share,
            };
            let feed = if i == 0 { mv.feed_rate } else { None };

            let mut line = format_move(*point, z, e, feed);
            if self.config.annotate {
                line.push_str(if prev_z.is_some() {
                    " ;Bridge"
                } else {
                    " ;Bridge no previous point"
                });
            }
            out.push(line);
            prev_z = Some(z);
        }
    }
}

fn format_move(point: Point2D, z: f64, e: f64, feed_rate: Option<f64>) -> String {
    let mut line = format!("G1 X{:.3} Y{:.3} Z{:.3}", point.x, point.y, z);
    if let Some(f) = feed_rate {
        let _ = write!(line, " F{}", f);
    }
    let _ = write!(line, " E{:.5}", e);
    line
}
