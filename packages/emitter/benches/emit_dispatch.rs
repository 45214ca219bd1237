//! Benchmarks for emit dispatch over stable and churning listener sets.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint;

use criterion::{Criterion, criterion_group, criterion_main};
use emitter::{Emitter, EventOptions, Verdict};

criterion_group!(benches, emit_dispatch, emit_churn);
criterion_main!(benches);

fn register_noop_listeners(emitter: &Emitter<u64>, name: &str, count: usize) {
    for _ in 0..count {
        _ = emitter.on(name, |args| {
            hint::black_box(args.len());
            Verdict::Continue(())
        });
    }
}

fn emit_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit_dispatch");

    group.bench_function("planned_10_listeners", |b| {
        let emitter = Emitter::<u64>::new();
        register_noop_listeners(&emitter, "tick", 10);

        // Warm the plan so the measurement sees only plan walks.
        emitter.emit("tick", (1,)).unwrap();

        b.iter(|| {
            emitter.emit("tick", (hint::black_box(1_u64),)).unwrap();
        });
    });

    group.bench_function("interpreted_10_listeners", |b| {
        let emitter = Emitter::<u64>::builder()
            .specialization_enabled(false)
            .build();
        register_noop_listeners(&emitter, "tick", 10);

        b.iter(|| {
            emitter.emit("tick", (hint::black_box(1_u64),)).unwrap();
        });
    });

    group.bench_function("quick_10_listeners", |b| {
        let emitter = Emitter::<u64>::new();
        register_noop_listeners(&emitter, "tick", 10);

        b.iter(|| {
            emitter.emit_quick("tick", (hint::black_box(1_u64),)).unwrap();
        });
    });

    group.bench_function("single_listener", |b| {
        let emitter = Emitter::<u64>::new();
        register_noop_listeners(&emitter, "tick", 1);

        b.iter(|| {
            emitter.emit("tick", (hint::black_box(1_u64),)).unwrap();
        });
    });

    group.bench_function("collect_10_listeners", |b| {
        let emitter = Emitter::<u64, u64>::new();
        _ = emitter
            .prepare("gather", EventOptions::new().collect(true))
            .unwrap();

        for _ in 0..10 {
            _ = emitter.on("gather", |args| Verdict::Continue(args[0]));
        }

        b.iter(|| {
            let results = emitter.emit("gather", (hint::black_box(1_u64),)).unwrap();
            hint::black_box(results);
        });
    });

    group.finish();
}

fn emit_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit_churn");

    group.bench_function("once_register_and_emit", |b| {
        let emitter = Emitter::<u64>::new();

        b.iter(|| {
            _ = emitter.once("burst", |_args| Verdict::Continue(()));
            emitter.emit("burst", ()).unwrap();
        });
    });

    group.bench_function("register_emit_unregister", |b| {
        let emitter = Emitter::<u64>::new();
        register_noop_listeners(&emitter, "churn", 1);

        b.iter(|| {
            let key = emitter.on("churn", |_args| Verdict::Continue(())).unwrap();
            emitter.emit("churn", ()).unwrap();
            assert!(emitter.off("churn", key));
        });
    });

    group.finish();
}
