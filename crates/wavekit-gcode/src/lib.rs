//! # WaveKit G-Code
//!
//! Non-planar modulation of FDM G-code: infill and wall moves are cut into
//! short sub-moves whose Z follows a periodic wave ([`waveform`],
//! [`modulation`]), while everything else streams through unchanged
//! ([`rewriter`]).
//!
//! Print regions are read from the slicer's comments through a per-slicer
//! [`dialect`] table. The whole file is buffered: a pre-pass ([`tracker`])
//! needs every solid infill height before the rewrite starts.

pub mod config;
pub mod diagnostics;
pub mod dialect;
pub mod io;
pub mod line;
pub mod modulation;
pub mod pipeline;
pub mod rewriter;
pub mod segment;
pub mod tracker;
pub mod waveform;

pub use config::{Direction, ModulationConfig, ModulationParams};
pub use diagnostics::{CollectingSink, DiagnosticLevel, DiagnosticSink, TracingSink};
pub use dialect::{DialectSelection, Marker, Slicer, SlicerDialect};
pub use io::{write_lines, GcodeFile};
pub use line::GcodeLine;
pub use modulation::{scaling_factor, ExtrusionMove, LoopPhase, ModulationEngine, PassState};
pub use pipeline::{LinePass, ModulationPass, PassHandle, PassPipeline};
pub use rewriter::{rewrite, RewriteStats, StreamRewriter};
pub use segment::{segment, segment_count};
pub use tracker::{
    estimate_layer_height, header_layer_height, resolve_layer_height, LayerBounds, RegionFilter,
    RegionKind, RegionTracker, SolidInfillHeights, DEFAULT_LAYER_HEIGHT,
};
pub use waveform::Waveform;
