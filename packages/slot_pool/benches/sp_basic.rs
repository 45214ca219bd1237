//! Basic benchmarks for the `slot_pool` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use criterion::{Criterion, criterion_group, criterion_main};
use slot_pool::SlotPool;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

type TestItem = usize;
const TEST_VALUE: TestItem = 1024;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_basic");

    group.bench_function("build_empty", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(SlotPool::<TestItem>::new()));
            }

            start.elapsed()
        });
    });

    group.bench_function("insert_first", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(SlotPool::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let start = Instant::now();

            for pool in &mut pools {
                _ = black_box(pool.insert(black_box(TEST_VALUE)));
            }

            start.elapsed()
        });
    });

    group.bench_function("insert_into_freed_slot", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(|| {
                let mut pool = SlotPool::new();

                // Leave a hole between two survivors so the freelist is in play.
                let first = pool.insert(TEST_VALUE);
                _ = pool.insert(TEST_VALUE);
                let victim = pool.insert(TEST_VALUE);
                _ = pool.remove(victim);
                _ = pool.remove(first);

                pool
            })
            .take(usize::try_from(iters).unwrap())
            .collect::<Vec<_>>();

            let start = Instant::now();

            for pool in &mut pools {
                _ = black_box(pool.insert(black_box(TEST_VALUE)));
            }

            start.elapsed()
        });
    });

    group.bench_function("read_one", |b| {
        b.iter_custom(|iters| {
            let mut pool = SlotPool::new();
            let key = pool.insert(TEST_VALUE);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(pool.get(key));
            }

            start.elapsed()
        });
    });

    group.bench_function("remove_one", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(SlotPool::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let keys = pools
                .iter_mut()
                .map(|pool| pool.insert(TEST_VALUE))
                .collect::<Vec<_>>();

            let start = Instant::now();

            for (pool, key) in pools.iter_mut().zip(keys) {
                _ = pool.remove(key);
            }

            start.elapsed()
        });
    });

    group.bench_function("iter_100_with_holes", |b| {
        b.iter_custom(|iters| {
            let mut pool = SlotPool::new();

            let keys = iter::repeat_with(|| pool.insert(TEST_VALUE))
                .take(100)
                .collect::<Vec<_>>();

            // Punch out every other slot.
            for key in keys.iter().step_by(2) {
                _ = pool.remove(*key);
            }

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(pool.iter().count());
            }

            start.elapsed()
        });
    });

    group.finish();

    let mut group = c.benchmark_group("slot_slow");

    group.bench_function("forward_10_back_5_times_1000", |b| {
        // We add 10 items, remove the first 5 and repeat this 1000 times.
        // This stresses the freelist bookkeeping of the pool.
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(SlotPool::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let mut to_remove = Vec::with_capacity(5);

            let start = Instant::now();

            for pool in &mut pools {
                for _ in 0..1000 {
                    to_remove.clear();

                    // Add the 5 that we will later remove.
                    for _ in 0..5 {
                        let key = pool.insert(black_box(TEST_VALUE));
                        to_remove.push(key);
                    }

                    // Add the 5 that we will keep.
                    for _ in 0..5 {
                        _ = black_box(pool.insert(black_box(TEST_VALUE)));
                    }

                    // Remove the first 5.
                    #[expect(clippy::iter_with_drain, reason = "to avoid moving the value")]
                    for key in to_remove.drain(..) {
                        _ = pool.remove(key);
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}
