//! Benchmarks for event bus delivery.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use orgflow::bus::{EventBus, Notification, NotificationKind};

fn bus_benchmark(c: &mut Criterion) {
    c.bench_function("direct_send", |b| {
        let bus = EventBus::new();
        let mut mailbox = bus.subscribe("sink");

        b.iter(|| {
            let n = Notification::new(
                "bench",
                "sink",
                NotificationKind::Start,
                serde_json::Value::Null,
            );
            let _ = black_box(bus.send(&n));
            let _ = mailbox.try_recv();
        });
    });

    c.bench_function("broadcast_with_globals", |b| {
        let bus = EventBus::new();
        let mut globals: Vec<_> = (0..4).map(|_| bus.subscribe_global()).collect();
        let mut mailbox = bus.subscribe("sink");

        b.iter(|| {
            let n = Notification::new(
                "bench",
                "sink",
                NotificationKind::Complete,
                serde_json::Value::Null,
            );
            bus.broadcast(black_box(&n));
            let _ = mailbox.try_recv();
            for g in &mut globals {
                let _ = g.try_recv();
            }
        });
    });
}

criterion_group!(benches, bus_benchmark);
criterion_main!(benches);
