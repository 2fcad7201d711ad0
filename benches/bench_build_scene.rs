// benches/bench_build_scene.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use smart_traffic_monitor::models::LANE_CONFIGS;
use smart_traffic_monitor::render::render_svg_string;
use smart_traffic_monitor::scene::{build_scene, CanvasSize};
use smart_traffic_monitor::shared_data::TrafficSnapshot;
use std::time::Duration;

fn snapshot_with(per_lane: i64) -> TrafficSnapshot {
    let mut snapshot = TrafficSnapshot::default();
    for lane in LANE_CONFIGS.iter() {
        snapshot.lane_vehicle_counts.insert(lane.id.key(), per_lane);
    }
    snapshot.vehicle_count = per_lane * 4;
    snapshot.emergency_lane = vec![1, 3];
    snapshot
}

fn bench_build_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_scene");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));

    let canvas = CanvasSize::new(380.0, 380.0);
    // Vehicles per lane: an empty road, a normal queue, a long jam.
    for &per_lane in [0i64, 10, 200].iter() {
        let snapshot = snapshot_with(per_lane);
        group.bench_function(format!("per_lane_{}", per_lane), |b| {
            b.iter(|| build_scene(black_box(&snapshot), &LANE_CONFIGS, canvas));
        });
    }
    group.finish();
}

fn bench_render_svg(c: &mut Criterion) {
    let scene = build_scene(
        &snapshot_with(10),
        &LANE_CONFIGS,
        CanvasSize::new(380.0, 380.0),
    );
    c.bench_function("render_svg_string", |b| {
        b.iter(|| render_svg_string(black_box(&scene)))
    });
}

criterion_group!(benches, bench_build_scene, bench_render_svg);
criterion_main!(benches);
