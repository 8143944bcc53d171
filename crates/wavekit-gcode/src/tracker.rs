//! Layer and print-region tracking
//!
//! A pre-pass over the whole file collects the heights of solid infill
//! layers and estimates the layer height. During the streaming pass the
//! tracker follows the current Z, the solid layers bounding it, and the
//! active print region.

use crate::diagnostics::DiagnosticSink;
use crate::dialect::{Marker, SlicerDialect};
use crate::line::GcodeLine;
use regex::Regex;
use std::sync::OnceLock;

/// Layer height assumed when nothing better can be inferred
pub const DEFAULT_LAYER_HEIGHT: f64 = 0.2;

/// Z deltas at or below this are hops or noise, not layer changes
const MIN_LAYER_DELTA: f64 = 0.01;

/// Print region the nozzle is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionKind {
    #[default]
    None,
    Infill,
    InternalWall,
    ExternalWall,
}

impl RegionKind {
    /// Internal or external perimeter
    pub fn is_wall(self) -> bool {
        matches!(self, RegionKind::InternalWall | RegionKind::ExternalWall)
    }

    /// Any region that receives modulation
    pub fn is_modulated(self) -> bool {
        self != RegionKind::None
    }
}

/// Which region kinds are modulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegionFilter {
    pub infill: bool,
    pub internal_walls: bool,
    pub external_walls: bool,
}

impl RegionFilter {
    /// Region a marker switches to, if that category is enabled
    fn region_for(&self, marker: Marker) -> Option<RegionKind> {
        match marker {
            Marker::Infill if self.infill => Some(RegionKind::Infill),
            Marker::InternalWall if self.internal_walls => Some(RegionKind::InternalWall),
            Marker::ExternalWall if self.external_walls => Some(RegionKind::ExternalWall),
            _ => None,
        }
    }
}

/// Solid infill layers nearest to the current Z
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerBounds {
    /// Highest solid layer strictly below
    pub below: Option<f64>,
    /// Lowest solid layer strictly above
    pub above: Option<f64>,
}

impl LayerBounds {
    /// Highest solid layer below, or the bed (0) if there is none
    pub fn last_solid_z_below(&self) -> f64 {
        self.below.unwrap_or(0.0)
    }

    /// Lowest solid layer above, or infinity if there is none
    pub fn next_solid_z_above(&self) -> f64 {
        self.above.unwrap_or(f64::INFINITY)
    }

    /// No solid layer on either side
    pub fn is_unbounded(&self) -> bool {
        self.below.is_none() && self.above.is_none()
    }
}

/// Sorted, de-duplicated Z heights where solid infill was found
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolidInfillHeights {
    heights: Vec<f64>,
}

impl SolidInfillHeights {
    /// Scan all lines, recording the current Z each time a solid infill marker appears
    pub fn collect<S: AsRef<str>>(lines: &[S], dialect: &SlicerDialect) -> Self {
        let mut current_z = 0.0;
        let mut heights = Vec::new();

        for raw in lines {
            let raw = raw.as_ref();
            let line = GcodeLine::parse(raw);
            if line.is_motion() {
                if let Some(z) = line.z() {
                    current_z = z;
                }
            }
            if dialect.is_solid_infill(raw) {
                heights.push(current_z);
            }
        }

        Self::from_heights(heights)
    }

    /// Build from arbitrary heights
    pub fn from_heights(mut heights: Vec<f64>) -> Self {
        heights.retain(|z| z.is_finite());
        heights.sort_by(f64::total_cmp);
        heights.dedup();
        Self { heights }
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.heights
    }

    /// Nearest solid layers strictly below and strictly above `z`
    pub fn bounds(&self, z: f64) -> LayerBounds {
        let below_end = self.heights.partition_point(|&h| h < z);
        let above_start = self.heights.partition_point(|&h| h <= z);

        LayerBounds {
            below: below_end.checked_sub(1).map(|i| self.heights[i]),
            above: self.heights.get(above_start).copied(),
        }
    }
}

/// Most frequent positive Z step between consecutive Z moves, rounded to microns
///
/// Ties go to the step seen first. `None` when the file never steps up.
pub fn estimate_layer_height<S: AsRef<str>>(lines: &[S]) -> Option<f64> {
    let mut counts: Vec<(i64, usize)> = Vec::new();
    let mut last_z: Option<f64> = None;

    for raw in lines {
        let line = GcodeLine::parse(raw.as_ref());
        if !line.is_motion() {
            continue;
        }
        let Some(z) = line.z() else { continue };

        if let Some(prev) = last_z {
            let delta = z - prev;
            if delta > MIN_LAYER_DELTA {
                let key = (delta * 1000.0).round() as i64;
                match counts.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((key, 1)),
                }
            }
        }
        last_z = Some(z);
    }

    // max_by_key keeps the last maximum; iterate reversed so the first seen wins
    counts
        .iter()
        .rev()
        .max_by_key(|(_, n)| *n)
        .map(|(key, _)| *key as f64 / 1000.0)
}

/// Layer height declared by a `; layer_height = <v>` header comment
pub fn header_layer_height<S: AsRef<str>>(lines: &[S]) -> Option<f64> {
    static LAYER_HEIGHT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = LAYER_HEIGHT_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^;\s*layer_height\s*=\s*(\d*\.?\d+)").expect("invalid regex pattern")
    });

    lines.iter().find_map(|line| {
        regex
            .captures(line.as_ref().trim())
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|h| *h > 0.0)
    })
}

/// Layer height for the pass
///
/// Prefers the height measured from Z moves, then the header declaration,
/// then `fallback`.
pub fn resolve_layer_height<S: AsRef<str>>(
    lines: &[S],
    fallback: f64,
    sink: &dyn DiagnosticSink,
) -> f64 {
    if let Some(h) = estimate_layer_height(lines) {
        sink.info(&format!("Estimated layer height from Z moves: {:.3}mm", h));
        return h;
    }
    if let Some(h) = header_layer_height(lines) {
        sink.info(&format!("Detected layer height from G-code header: {:.3}mm", h));
        return h;
    }
    sink.warn(&format!(
        "Could not detect layer height, using default value: {:.3}mm",
        fallback
    ));
    fallback
}

/// Streaming state: current Z, bounding solid layers and active region
#[derive(Debug, Clone)]
pub struct RegionTracker<'d> {
    dialect: &'d SlicerDialect,
    filter: RegionFilter,
    solid: SolidInfillHeights,
    current_z: f64,
    bounds: LayerBounds,
    region: RegionKind,
}

impl<'d> RegionTracker<'d> {
    pub fn new(
        dialect: &'d SlicerDialect,
        filter: RegionFilter,
        solid: SolidInfillHeights,
    ) -> Self {
        let bounds = solid.bounds(0.0);
        Self {
            dialect,
            filter,
            solid,
            current_z: 0.0,
            bounds,
            region: RegionKind::None,
        }
    }

    pub fn current_z(&self) -> f64 {
        self.current_z
    }

    pub fn bounds(&self) -> LayerBounds {
        self.bounds
    }

    pub fn region(&self) -> RegionKind {
        self.region
    }

    /// Move to a new Z and recompute the bounding solid layers
    pub fn set_z(&mut self, z: f64) {
        self.current_z = z;
        self.bounds = self.solid.bounds(z);
    }

    /// Apply a line's region marker, if it has one
    ///
    /// Returns the region the line switched to. Lines without a marker leave
    /// the region untouched. A type line for a disabled or unmodulated
    /// category resets the region to [`RegionKind::None`].
    pub fn observe_marker(&mut self, raw: &str) -> Option<RegionKind> {
        let marker = self.dialect.marker(raw)?;
        self.region = self.filter.region_for(marker).unwrap_or(RegionKind::None);
        Some(self.region)
    }
}
