//! Hotpath-Benchmarks der Mesh-Erzeugung.
//!
//! - Einzelnes Straßen-Mesh (gerade vs. enge Kurve)
//! - Kompletter Neuaufbau einer Strecke in die In-Memory-Szene
//! - Verschieben eines Ankers (zwei Meshes + Phasen-Propagation)

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use race_track_editor::app::build_road_mesh;
use race_track_editor::{BezierCurve, CurveEditor, EditorOptions, MemoryScene};
use std::hint::black_box;

fn build_synthetic_points(anchor_count: usize) -> Vec<Vec2> {
    let mut points = Vec::with_capacity(anchor_count * 3);
    for i in 0..anchor_count {
        let y = i as f32 * 500.0;
        let x = if i % 2 == 0 { 0.0 } else { 300.0 };
        if i > 0 {
            points.push(Vec2::new(x, y - 150.0));
        }
        points.push(Vec2::new(x, y));
        if i + 1 < anchor_count {
            points.push(Vec2::new(x, y + 150.0));
        }
    }
    points
}

fn bench_road_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("road_mesh");
    let options = EditorOptions::default();

    let straight = BezierCurve::new(
        Vec2::ZERO,
        Vec2::new(0.0, 300.0),
        Vec2::new(0.0, 600.0),
        Vec2::new(0.0, 900.0),
    );
    let hairpin = BezierCurve::new(
        Vec2::ZERO,
        Vec2::new(0.0, 600.0),
        Vec2::new(300.0, 600.0),
        Vec2::new(300.0, 0.0),
    );

    for (name, curve) in [("straight", straight), ("hairpin", hairpin)] {
        group.bench_with_input(BenchmarkId::new("build", name), &curve, |b, curve| {
            b.iter(|| {
                let mut curve = curve.clone();
                let mesh = build_road_mesh(&mut curve, 0.0, black_box(1.0), &options)
                    .expect("Mesh build failed");
                black_box(mesh.steps)
            })
        });
    }

    group.finish();
}

fn bench_full_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_render");

    for &anchor_count in &[10usize, 100] {
        let points = build_synthetic_points(anchor_count);
        group.bench_with_input(
            BenchmarkId::new("load_from_points", anchor_count),
            &points,
            |b, points| {
                b.iter(|| {
                    let mut editor =
                        CurveEditor::new(MemoryScene::new(), EditorOptions::default());
                    editor
                        .load_from_points(black_box(points))
                        .expect("Render failed");
                    black_box(editor.host().len())
                })
            },
        );
    }

    let points = build_synthetic_points(100);
    let mut editor = CurveEditor::new(MemoryScene::new(), EditorOptions::default());
    editor.load_from_points(&points).expect("Render failed");
    let mut toggle = false;
    group.bench_function("move_anchor_100", |b| {
        b.iter(|| {
            toggle = !toggle;
            let x = if toggle { 50.0 } else { 0.0 };
            editor
                .move_anchor(50, black_box(Vec2::new(x, 25_000.0)))
                .expect("Move failed");
        })
    });

    group.finish();
}

criterion_group!(mesh_benches, bench_road_mesh, bench_full_render);
criterion_main!(mesh_benches);
