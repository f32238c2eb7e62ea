use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use futures::executor::block_on;
use std::hint::black_box;

use grocer::{asyncable, derived, get, setter, AsyncValue, Asyncable, Readable, Writable};

fn writable_read_benchmark(c: &mut Criterion) {
    let store = Writable::new(42);

    c.bench_function("writable_read", |b| {
        b.iter(|| {
            black_box(get(&store));
        });
    });
}

fn writable_subscribe_benchmark(c: &mut Criterion) {
    #[derive(Clone)]
    struct State {
        value: usize,
    }

    let mut group = c.benchmark_group("writable_subscribe");

    for subscriber_count in [1, 10, 100].iter() {
        let store = Writable::new(State { value: 0 });

        let _subscriptions: Vec<_> = (0..*subscriber_count)
            .map(|_| {
                store.subscribe(|_| {
                    // Empty subscriber
                })
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(subscriber_count),
            subscriber_count,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    store.update(|state| state.value = black_box(i));
                    i += 1;
                });
            },
        );
    }
    group.finish();
}

fn derived_recompute_benchmark(c: &mut Criterion) {
    let a = Writable::new(5);
    let b = Writable::new(10);
    let sum = derived(
        vec![a.clone().into_readable(), b.into_readable()],
        0,
        |values: &[i32]| values.iter().sum::<i32>(),
    );
    let _subscription = sum.subscribe(|_| {});

    c.bench_function("derived_recompute", |bench| {
        let mut i = 0;
        bench.iter(|| {
            a.set(black_box(i));
            i += 1;
        });
    });
}

fn asyncable_getter_benchmark(c: &mut Criterion) {
    let input = Writable::new(1);
    let doubled = asyncable(
        |values: &[i32]| Ok(Some(AsyncValue::ready(values[0] * 2))),
        None,
        vec![input.clone().into_readable()],
    );
    let _subscription = doubled.subscribe(|_: &AsyncValue<i32>| {});

    c.bench_function("asyncable_getter", |b| {
        let mut i = 0;
        b.iter(|| {
            input.set(black_box(i));
            black_box(block_on(doubled.get()).ok());
            i += 1;
        });
    });
}

fn asyncable_set_benchmark(c: &mut Criterion) {
    let store = Asyncable::new(
        || Ok(Some(AsyncValue::ready(0usize))),
        Some(setter(|_new: usize, _old| async { Ok(()) })),
    );
    let _subscription = store.subscribe(|_: &AsyncValue<usize>| {});

    c.bench_function("asyncable_set", |b| {
        let mut i = 1;
        b.iter(|| {
            block_on(store.set(black_box(i))).ok();
            i += 1;
        });
    });
}

criterion_group!(
    benches,
    writable_read_benchmark,
    writable_subscribe_benchmark,
    derived_recompute_benchmark,
    asyncable_getter_benchmark,
    asyncable_set_benchmark,
);
criterion_main!(benches);
