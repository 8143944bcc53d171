use std::f64::consts::FRAC_PI_2;

use wavekit_gcode::{
    CollectingSink, Direction, GcodeLine, ModulationConfig, StreamRewriter, Waveform,
};

fn z_of(line: &str) -> f64 {
    GcodeLine::parse(line).z().unwrap()
}

fn e_of(line: &str) -> f64 {
    GcodeLine::parse(line).e().unwrap()
}

fn segment_lines(out: &[String]) -> Vec<&String> {
    out.iter().filter(|l| l.contains(";seg ")).collect()
}

fn infill_config(amplitude: f64) -> ModulationConfig {
    ModulationConfig {
        include_infill: true,
        infill_amplitude: amplitude,
        infill_frequency: 1.1,
        infill_direction: Direction::X,
        infill_function: Waveform::Sine,
        resolution: 1.0,
        ..Default::default()
    }
}

#[test]
fn test_infill_follows_full_wave_without_solid_layers() {
    let lines = [
        "; layer_height = 0.2",
        "G1 Z0.2",
        ";TYPE:Internal infill",
        "G1 X0 Y0",
        "G1 X10 Y0 E1.0",
    ];
    let sink = CollectingSink::new();
    let (out, stats) = StreamRewriter::new(&infill_config(0.6)).rewrite(&lines, &sink);

    assert_eq!(&out[..4], &lines[..4]);
    assert_eq!(stats.modulated_moves, 1);

    let segs = segment_lines(&out);
    assert_eq!(segs.len(), 10);
    assert_eq!(out.len(), 14);
    for (i, line) in segs.iter().enumerate() {
        let x = (i + 1) as f64;
        let expected = 0.2 + 0.6 * (1.1 * x).sin();
        assert!((z_of(line) - expected).abs() < 6e-4, "{}", line);
        assert!(line.contains(&format!(";seg {}/10", i + 1)));
    }

    // stretching over the climb only ever adds material
    let total: f64 = segs.iter().map(|l| e_of(l)).sum();
    assert!(total >= 1.0 - 1e-4);
}

#[test]
fn test_wave_is_damped_between_solid_layers() {
    let lines = [
        "G1 Z0.2",
        ";TYPE:Solid infill",
        "G1 X5 Y5 E0.5",
        "G1 Z1.0",
        ";TYPE:Internal infill",
        "G1 X0 Y0",
        "G1 X4 Y0 E0.4",
        "G1 Z1.8",
        ";TYPE:Solid infill",
        "G1 X5 Y5 E0.5",
    ];
    let sink = CollectingSink::new();
    let (out, _) = StreamRewriter::new(&infill_config(0.6)).rewrite(&lines, &sink);

    // one layer-height step (0.8) from either solid layer: max_step caps the scale at 0.1
    let segs = segment_lines(&out);
    assert_eq!(segs.len(), 4);
    for (i, line) in segs.iter().enumerate() {
        let x = (i + 1) as f64;
        let expected = 1.0 + 0.06 * (1.1 * x).sin();
        assert!((z_of(line) - expected).abs() < 6e-4, "{}", line);
    }
}

#[test]
fn test_layer_above_the_last_solid_layer_stays_flat() {
    let lines = [
        "G1 Z0.2",
        ";TYPE:Solid infill",
        "G1 X5 Y5 E0.5",
        "G1 Z1.0",
        ";TYPE:Internal infill",
        "G1 X0 Y0",
        "G1 X4 Y0 E0.4",
    ];
    let sink = CollectingSink::new();
    let (out, _) = StreamRewriter::new(&infill_config(0.6)).rewrite(&lines, &sink);

    let segs = segment_lines(&out);
    assert_eq!(segs.len(), 4);
    assert!(segs.iter().all(|l| (z_of(l) - 1.0).abs() < 1e-9));
}

#[test]
fn test_default_dialect_ignores_bambu_markers() {
    let lines = [
        "G1 Z0.2",
        "; FEATURE: Sparse infill",
        "G1 X0 Y0",
        "G1 X10 Y0 E1.0",
    ];
    let sink = CollectingSink::new();
    let (out, stats) = StreamRewriter::new(&infill_config(0.3)).rewrite(&lines, &sink);
    assert_eq!(out, lines);
    assert_eq!(stats.modulated_moves, 0);
    assert!(sink.contains("default prusaslicer"));
}

#[test]
fn test_bambu_signature_selects_feature_markers() {
    let lines = [
        "; generated by BambuStudio 01.09.00.70",
        "G1 Z0.2",
        "; FEATURE: Sparse infill",
        "G1 X0 Y0",
        "G1 X10 Y0 E1.0",
    ];
    let sink = CollectingSink::new();
    let (out, stats) = StreamRewriter::new(&infill_config(0.3)).rewrite(&lines, &sink);
    assert_eq!(stats.modulated_moves, 1);
    assert_eq!(segment_lines(&out).len(), 10);
    assert!(sink.contains("bambustudio"));
}

#[test]
fn test_alternate_loops_shift_phase_by_quarter_period() {
    let lines = [
        "G1 Z0.2",
        ";TYPE:Perimeter",
        "G1 X0 Y0",
        "G1 X1 Y0 E0.1",
        "G1 X5 Y0 E0.4",
        "G1 X0 Y1",
        "G1 X1 Y1 E0.1",
        "G1 X5 Y1 E0.4",
    ];
    let config = ModulationConfig {
        include_perimeters: true,
        wall_amplitude: 0.5,
        wall_frequency: 1.1,
        resolution: 1.0,
        alternate_loops: true,
        ..Default::default()
    };
    let sink = CollectingSink::new();
    let (out, stats) = StreamRewriter::new(&config).rewrite(&lines, &sink);
    assert_eq!(stats.bridges, 2);
    assert_eq!(stats.modulated_moves, 2);

    // first loop after the travel: phase π/2
    assert_eq!(
        out[3],
        "G1 X0.000 Y0.000 Z0.700 E0.05000 ;Bridge no previous point"
    );
    assert!(out[4].starts_with("G1 X1.000 Y0.000 ") && out[4].ends_with(" ;Bridge"));

    let first = out.iter().find(|l| l.starts_with("G1 X2.000 Y0.000 ")).unwrap();
    let second = out.iter().find(|l| l.starts_with("G1 X2.000 Y1.000 ")).unwrap();
    assert!((z_of(first) - (0.2 + 0.5 * (2.2 + FRAC_PI_2).sin())).abs() < 6e-4);
    assert!((z_of(second) - (0.2 + 0.5 * (2.2f64).sin())).abs() < 6e-4);
}

#[test]
fn test_degenerate_move_keeps_its_extrusion() {
    let lines = [
        "G1 Z0.2",
        ";TYPE:Internal infill",
        "G1 X0 Y0",
        "G1 X0 Y0 E0.05",
    ];
    let sink = CollectingSink::new();
    let (out, _) = StreamRewriter::new(&infill_config(0.6)).rewrite(&lines, &sink);
    assert_eq!(out.len(), 4);
    assert!(out[3].starts_with("G1 X0.000 Y0.000 Z0.200 E0.05000 ;seg 1/1"));
}

#[test]
fn test_partial_axis_move_uses_last_position() {
    let lines = [
        "G1 Z0.2",
        ";TYPE:Internal infill",
        "G1 X0 Y3",
        "G1 X2 E0.2 F1200",
    ];
    let config = ModulationConfig {
        annotate: false,
        ..infill_config(0.3)
    };
    let sink = CollectingSink::new();
    let (out, _) = StreamRewriter::new(&config).rewrite(&lines, &sink);
    assert_eq!(out.len(), 5);
    assert!(out[3].starts_with("G1 X1.000 Y3.000 ") && out[3].contains(" F1200 "));
    assert!(out[4].starts_with("G1 X2.000 Y3.000 ") && !out[4].contains(" F"));
    assert!(!out[4].contains(';'));
}

#[test]
fn test_every_untouched_line_survives_in_order() {
    let lines = [
        "; generated by PrusaSlicer 2.7.1",
        "M83",
        "G1 Z0.2 F720",
        ";TYPE:Skirt/Brim",
        "G1 X0 Y0 F9000",
        "G1 X30 Y0 E2.0",
        ";TYPE:Internal infill",
        "G1 X10 Y10",
        "G1 X12 Y10 E0.2",
        ";TYPE:Support material",
        "G1 X20 Y20 E0.5",
        "M107",
    ];
    let sink = CollectingSink::new();
    let (out, stats) = StreamRewriter::new(&infill_config(0.3)).rewrite(&lines, &sink);

    let kept: Vec<&str> = out
        .iter()
        .map(String::as_str)
        .filter(|l| !l.contains(";seg ") && !l.contains(";restore layer Z"))
        .collect();
    let expected: Vec<&str> = lines.iter().copied().filter(|l| *l != "G1 X12 Y10 E0.2").collect();
    assert_eq!(kept, expected);
    assert_eq!(stats.z_restores, 1);
}
