use std::sync::Mutex;
use std::sync::mpsc;
use std::time::{Duration, Instant};

// Receivers cannot be shared, so consumers take turns behind a mutex.
pub fn bench(iters: usize, capacity: usize, consumers: usize) -> Duration {
    let (tx, rx) = mpsc::sync_channel(capacity);
    let rx = Mutex::new(rx);
    let now = Instant::now();
    std::thread::scope(|cx| {
        let rx = &rx;
        for i in 0..consumers {
            cx.spawn(move || {
                for _ in 0..super::share(iters, consumers, i) {
                    let item = rx.lock().unwrap().recv().unwrap();
                    std::hint::black_box(item);
                }
            });
        }
        for i in 0..iters {
            tx.send(super::make_item(i)).unwrap();
        }
    });
    now.elapsed()
}
