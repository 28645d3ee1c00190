use std::time::{Duration, Instant};

use warehouse::BoundedQueue;

pub fn bench(iters: usize, capacity: usize, consumers: usize) -> Duration {
    let queue = BoundedQueue::new(capacity).unwrap();
    let now = Instant::now();
    std::thread::scope(|cx| {
        let queue = &queue;
        for i in 0..consumers {
            cx.spawn(move || {
                for _ in 0..super::share(iters, consumers, i) {
                    std::hint::black_box(queue.remove());
                }
            });
        }
        for i in 0..iters {
            queue.insert(super::make_item(i));
        }
    });
    let elapsed = now.elapsed();
    assert!(queue.is_empty());
    elapsed
}
