// benches/bench_reconciler.rs

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use smart_traffic_monitor::communication::{decode_payload, MemoryFeed};
use smart_traffic_monitor::monitoring::Reconciler;

const CHANNEL: &str = "traffic";
const PAYLOAD: &[u8] = br#"{"vehicle_count": 9, "emergency_lane": [2],
    "lane_vehicle_counts": {"1": 2, "2": 3, "3": 4, "4": 0}}"#;

fn bench_decode(c: &mut Criterion) {
    c.bench_function("decode_payload", |b| {
        b.iter(|| decode_payload(black_box(PAYLOAD)))
    });
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconciler_drain");
    for &burst in [1usize, 100, 1000].iter() {
        group.bench_function(format!("burst_{}", burst), |b| {
            b.iter_batched(
                || {
                    let feed = MemoryFeed::new();
                    let mut reconciler = Reconciler::new(feed.clone(), CHANNEL);
                    reconciler.start().unwrap();
                    for i in 0..burst {
                        // Alternate data and "no data" so every event changes the view.
                        if i % 2 == 0 {
                            feed.publish_raw(CHANNEL, PAYLOAD);
                        } else {
                            feed.publish_empty(CHANNEL);
                        }
                    }
                    reconciler
                },
                |mut reconciler| black_box(reconciler.drain()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decode, bench_drain);
criterion_main!(benches);
