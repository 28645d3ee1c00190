mod bounded_queue;
mod sync_channel;

use std::hint::black_box;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};

const CAPACITIES: &[usize] = &[1, 8, 64, 1024];

type BenchFn = fn(usize, usize, usize) -> Duration;

/// Splits `iters` items as evenly as possible among `consumers`.
fn share(iters: usize, consumers: usize, i: usize) -> usize {
    iters / consumers + usize::from(i < iters % consumers)
}

fn make_item(i: usize) -> Box<usize> {
    black_box(Box::new(i))
}

fn groups(c: &mut Criterion) {
    macro_rules! benches {
        ($($name:ident),* $(,)?) => ([$((stringify!($name), self::$name::bench as BenchFn),)*]);
    }

    let mut g = c.benchmark_group("spsc");
    for (i, capacity) in CAPACITIES.iter().copied().enumerate() {
        for (name, f) in benches![bounded_queue, sync_channel] {
            let id = format!("spsc_{i:02}_cap{capacity}_{name}");
            g.bench_function(&id, |b| b.iter_custom(|iters| f(iters as usize, capacity, 1)));
        }
    }
    g.finish();

    let mut g = c.benchmark_group("one_producer_four_consumers");
    for (i, capacity) in CAPACITIES.iter().copied().enumerate() {
        for (name, f) in benches![bounded_queue, sync_channel] {
            let id = format!("1p4c_{i:02}_cap{capacity}_{name}");
            g.bench_function(&id, |b| b.iter_custom(|iters| f(iters as usize, capacity, 4)));
        }
    }
    g.finish();
}

criterion_group!(
    name = warehouse_benchmark;
    config = Criterion::default().sample_size(50).measurement_time(Duration::from_secs(10));
    targets = groups
);
criterion_main!(warehouse_benchmark);
