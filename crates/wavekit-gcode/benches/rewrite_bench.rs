//! Rewrite benchmarks
//!
//! Run with: cargo bench -p wavekit-gcode

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wavekit_gcode::dialect::PRUSA_SLICER;
use wavekit_gcode::{rewrite, CollectingSink, Direction, ModulationConfig, SolidInfillHeights};

/// A PrusaSlicer-style print: 50 layers of square perimeters and zig-zag infill,
/// with solid layers at the bottom and top
fn synthetic_print() -> Vec<String> {
    let mut lines = vec![
        "; generated by PrusaSlicer 2.7.1".to_string(),
        "; layer_height = 0.2".to_string(),
        "M83".to_string(),
    ];

    for layer in 1..=50 {
        let z = layer as f64 * 0.2;
        lines.push(";AFTER_LAYER_CHANGE".to_string());
        lines.push(format!("G1 Z{:.3} F720", z));

        for (i, inset) in [2.0, 1.5, 1.0].iter().enumerate() {
            lines.push(if i == 2 {
                ";TYPE:External perimeter".to_string()
            } else {
                ";TYPE:Perimeter".to_string()
            });
            lines.push(format!("G1 X{:.3} Y{:.3} F9000", inset, inset));
            let far = 40.0 - inset;
            for (x, y) in [(far, *inset), (far, far), (*inset, far), (*inset, *inset)] {
                lines.push(format!("G1 X{:.3} Y{:.3} E1.2", x, y));
            }
        }

        let solid = layer <= 3 || layer >= 48;
        lines.push(if solid {
            ";TYPE:Solid infill".to_string()
        } else {
            ";TYPE:Internal infill".to_string()
        });
        lines.push("G1 X3 Y3 F9000".to_string());
        for row in 0..17 {
            let y = 3.0 + row as f64 * 2.0;
            let (from, to) = if row % 2 == 0 { (3.0, 37.0) } else { (37.0, 3.0) };
            lines.push(format!("G1 X{:.3} Y{:.3} E0.1", from, y));
            lines.push(format!("G1 X{:.3} Y{:.3} E1.4", to, y));
        }
    }

    lines
}

fn modulation_benchmark(c: &mut Criterion) {
    let lines = synthetic_print();
    let config = ModulationConfig {
        include_infill: true,
        include_perimeters: true,
        alternate_loops: true,
        ..Default::default()
    };

    c.bench_function("modulate_50_layers", |b| {
        b.iter(|| {
            let sink = CollectingSink::new();
            black_box(rewrite(black_box(&lines), &config, &sink))
        })
    });
}

fn diagonal_benchmark(c: &mut Criterion) {
    let lines = synthetic_print();
    let config = ModulationConfig {
        include_infill: true,
        include_external_perimeters: true,
        infill_direction: Direction::NegXy,
        resolution: 0.05,
        ..Default::default()
    };

    c.bench_function("modulate_50_layers_fine", |b| {
        b.iter(|| {
            let sink = CollectingSink::new();
            black_box(rewrite(black_box(&lines), &config, &sink))
        })
    });
}

fn pre_pass_benchmark(c: &mut Criterion) {
    let lines = synthetic_print();

    c.bench_function("collect_solid_heights", |b| {
        b.iter(|| black_box(SolidInfillHeights::collect(black_box(&lines), &PRUSA_SLICER)))
    });
}

criterion_group!(benches, modulation_benchmark, diagonal_benchmark, pre_pass_benchmark);
criterion_main!(benches);
