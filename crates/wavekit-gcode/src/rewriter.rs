//! Stream rewriter
//!
//! One forward pass over a buffered file: select the dialect, run the
//! pre-pass (solid infill heights, layer height), then classify and rewrite
//! every line in order. Lines outside modulated regions are copied through.

use crate::config::ModulationConfig;
use crate::diagnostics::DiagnosticSink;
use crate::dialect;
use crate::line::GcodeLine;
use crate::modulation::{ExtrusionMove, ModulationEngine, PassState};
use crate::tracker::{resolve_layer_height, RegionTracker, SolidInfillHeights};

/// Counters reported after a rewrite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub lines_in: usize,
    pub lines_out: usize,
    /// Moves replaced by modulated sub-moves
    pub modulated_moves: usize,
    /// Wall loops entered through a bridge
    pub bridges: usize,
    /// Moves passed through because no start position was known
    pub raw_moves: usize,
    /// Z restore moves inserted after leaving a modulated move
    pub z_restores: usize,
}

/// Rewrites a whole file with the modulation engine
#[derive(Debug, Clone)]
pub struct StreamRewriter<'c> {
    config: &'c ModulationConfig,
}

impl<'c> StreamRewriter<'c> {
    pub fn new(config: &'c ModulationConfig) -> Self {
        Self { config }
    }

    /// Rewrite `lines`, returning the output lines and pass counters
    pub fn rewrite<S: AsRef<str>>(
        &self,
        lines: &[S],
        sink: &dyn DiagnosticSink,
    ) -> (Vec<String>, RewriteStats) {
        let selection = dialect::select(lines, sink);
        let solid = SolidInfillHeights::collect(lines, selection.dialect);
        sink.debug(&format!("Found {} solid infill heights", solid.len()));
        let layer_height = resolve_layer_height(lines, self.config.default_layer_height, sink);

        let mut pass = RewritePass {
            config: self.config,
            sink,
            tracker: RegionTracker::new(selection.dialect, self.config.region_filter(), solid),
            engine: ModulationEngine::new(self.config, layer_height),
            state: PassState::default(),
            stats: RewriteStats {
                lines_in: lines.len(),
                ..Default::default()
            },
            out: Vec::with_capacity(lines.len()),
            absolute_extrusion_warned: false,
        };

        for raw in lines {
            pass.process(raw.as_ref());
        }

        pass.stats.lines_out = pass.out.len();
        sink.info(&format!(
            "Modulation pass: {} lines in, {} lines out, {} moves modulated, {} bridges",
            pass.stats.lines_in,
            pass.stats.lines_out,
            pass.stats.modulated_moves,
            pass.stats.bridges
        ));
        (pass.out, pass.stats)
    }
}

/// Convenience wrapper around [`StreamRewriter::rewrite`]
pub fn rewrite<S: AsRef<str>>(
    lines: &[S],
    config: &ModulationConfig,
    sink: &dyn DiagnosticSink,
) -> Vec<String> {
    StreamRewriter::new(config).rewrite(lines, sink).0
}

struct RewritePass<'a> {
    config: &'a ModulationConfig,
    sink: &'a dyn DiagnosticSink,
    tracker: RegionTracker<'static>,
    engine: ModulationEngine<'a>,
    state: PassState,
    stats: RewriteStats,
    out: Vec<String>,
    absolute_extrusion_warned: bool,
}

impl RewritePass<'_> {
    fn process(&mut self, raw: &str) {
        let line = GcodeLine::parse(raw);

        if line.command() == Some(('M', 82.0)) && !self.absolute_extrusion_warned {
            self.sink.warn(
                "Absolute extrusion (M82) found; modulated E values assume relative extrusion",
            );
            self.absolute_extrusion_warned = true;
        }

        if line.is_motion() {
            if let Some(z) = line.z() {
                self.tracker.set_z(z);
                self.state.z_displaced = false;
            }
        }

        if let Some(region) = self.tracker.observe_marker(raw) {
            if region.is_wall() {
                self.state.new_wall_loop = true;
                self.state.loop_phase.reset();
            }
        }

        if !line.is_motion() {
            self.out.push(raw.to_string());
            return;
        }

        if line.e().is_none() {
            self.travel(&line);
            return;
        }

        if !self.try_modulate(&line) {
            self.pass_through(&line);
        }
    }

    /// Motion without extrusion: track the nozzle and wall loop boundaries
    fn travel(&mut self, line: &GcodeLine<'_>) {
        if line.has_xy() && self.tracker.region().is_wall() {
            self.state.new_wall_loop = true;
            if self.config.alternate_loops {
                self.state.loop_phase.advance();
            }
        }
        self.pass_through(line);
    }

    /// Copy the line, keeping the nozzle position and layer Z in step
    fn pass_through(&mut self, line: &GcodeLine<'_>) {
        if line.has_xy() {
            self.restore_z(line);
            if let Some(target) = line.target(self.state.nozzle) {
                self.state.nozzle = Some(target);
            }
        }
        self.out.push(line.raw().to_string());
    }

    /// Put the nozzle back on the layer before an unmodulated planar move
    fn restore_z(&mut self, line: &GcodeLine<'_>) {
        if self.state.z_displaced && line.z().is_none() {
            let mut restore = format!("G1 Z{:.3}", self.tracker.current_z());
            if self.config.annotate {
                restore.push_str(" ;restore layer Z");
            }
            self.out.push(restore);
            self.stats.z_restores += 1;
        }
        self.state.z_displaced = false;
    }

    /// Rewrite an extrusion move in a modulated region
    ///
    /// Returns `false` when the line does not qualify and must be passed
    /// through instead.
    fn try_modulate(&mut self, line: &GcodeLine<'_>) -> bool {
        let region = self.tracker.region();
        let Some(params) = self.config.params_for(region) else {
            return false;
        };
        if !line.is_linear() {
            return false;
        }

        let Some(start) = self.state.nozzle else {
            let Some(target) = line.target(None) else {
                return false;
            };
            let raw = line.raw();
            self.out.push(if self.config.annotate {
                format!("{} ;no prior point, raw emit", raw.trim_end())
            } else {
                raw.to_string()
            });
            self.state.nozzle = Some(target);
            if region.is_wall() {
                self.state.new_wall_loop = false;
            }
            self.stats.raw_moves += 1;
            return true;
        };

        let Some(mv) = ExtrusionMove::from_line(line, start) else {
            return false;
        };

        if region.is_wall() && self.state.new_wall_loop {
            self.state.new_wall_loop = false;
            if mv.start != mv.target {
                self.engine.bridge(&mv, &self.tracker, &self.state, &mut self.out);
                self.finish_move(&mv);
                self.stats.bridges += 1;
                return true;
            }
        }

        self.engine
            .modulate(&mv, &params, &self.tracker, &self.state, &mut self.out);
        self.finish_move(&mv);
        self.stats.modulated_moves += 1;
        true
    }

    fn finish_move(&mut self, mv: &ExtrusionMove) {
        self.state.nozzle = Some(mv.target);
        self.state.z_displaced = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;

    fn infill_config() -> ModulationConfig {
        ModulationConfig {
            include_infill: true,
            resolution: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_non_motion_lines_pass_through() {
        let lines = ["M104 S215", "; comment", "", "G28 W"];
        let sink = CollectingSink::new();
        let out = rewrite(&lines, &infill_config(), &sink);
        assert_eq!(out, lines);
    }

    #[test]
    fn test_first_move_without_prior_point_is_raw() {
        let lines = [";TYPE:Internal infill", "G1 X5 Y5 E0.2"];
        let sink = CollectingSink::new();
        let (out, stats) = StreamRewriter::new(&infill_config()).rewrite(&lines, &sink);
        assert_eq!(out[1], "G1 X5 Y5 E0.2 ;no prior point, raw emit");
        assert_eq!(stats.raw_moves, 1);
    }

    #[test]
    fn test_raw_wall_move_starts_the_loop() {
        let lines = [
            "G1 Z0.2",
            ";TYPE:Perimeter",
            "G1 X0 Y0 E0.1",
            "G1 X3 Y0 E0.3",
        ];
        let config = ModulationConfig {
            include_perimeters: true,
            resolution: 1.0,
            ..Default::default()
        };
        let sink = CollectingSink::new();
        let (out, stats) = StreamRewriter::new(&config).rewrite(&lines, &sink);
        assert_eq!(stats.raw_moves, 1);
        assert_eq!(stats.bridges, 0);
        assert_eq!(stats.modulated_moves, 1);
        assert!(!out.iter().any(|l| l.contains(";Bridge")));
        assert_eq!(out.iter().filter(|l| l.contains(";seg ")).count(), 3);
    }

    #[test]
    fn test_disabled_region_is_untouched() {
        let lines = [
            "G1 Z0.2",
            "G1 X0 Y0",
            ";TYPE:Perimeter",
            "G1 X10 Y0 E0.5",
        ];
        let sink = CollectingSink::new();
        let out = rewrite(&lines, &infill_config(), &sink);
        assert_eq!(out, lines);
    }

    #[test]
    fn test_z_restored_before_next_unmodulated_move() {
        let lines = [
            "G1 Z0.2",
            "G1 X0 Y0",
            ";TYPE:Internal infill",
            "G1 X3 Y0 E0.3",
            ";TYPE:Skirt/Brim",
            "G1 X20 Y20",
        ];
        let sink = CollectingSink::new();
        let (out, stats) = StreamRewriter::new(&infill_config()).rewrite(&lines, &sink);
        assert_eq!(stats.modulated_moves, 1);
        assert_eq!(stats.z_restores, 1);
        let restore = out.iter().position(|l| l.starts_with("G1 Z0.200 ")).unwrap();
        assert_eq!(out[restore + 1], "G1 X20 Y20");
    }

    #[test]
    fn test_retraction_in_region_passes_through() {
        let lines = [
            "G1 X0 Y0",
            ";TYPE:Internal infill",
            "G1 E-0.8 F2100",
        ];
        let sink = CollectingSink::new();
        let out = rewrite(&lines, &infill_config(), &sink);
        assert_eq!(out, lines);
    }

    #[test]
    fn test_absolute_extrusion_warns_once() {
        let lines = ["M82", "M82"];
        let sink = CollectingSink::new();
        rewrite(&lines, &infill_config(), &sink);
        let warnings = sink.warnings();
        assert_eq!(warnings.iter().filter(|w| w.contains("M82")).count(), 1);
    }
}
