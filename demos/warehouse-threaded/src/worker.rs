use std::io;
use std::time::{Duration, Instant};

use warehouse::{BoundedQueue, Cancelled, STOP_POLL_INTERVAL, StopToken};

use crate::vehicle::Vehicle;

pub type Warehouse = BoundedQueue<Vehicle>;

/// Vehicle ids handed out by one of `producers` producers.
///
/// Producer `k` issues `start_id + k`, `start_id + k + producers`, and so on,
/// so ids from different producers never collide. The sequence ends instead
/// of wrapping around at `u64::MAX`.
#[derive(Clone, Debug)]
pub struct Ids {
    next: Option<u64>,
    step: u64,
}

impl Ids {
    /// Returns `None` if the first id of producer `k` does not fit in a `u64`.
    pub fn new(start_id: u64, k: usize, producers: usize) -> Option<Self> {
        debug_assert!(k < producers);
        Some(Self {
            next: Some(start_id.checked_add(k as u64)?),
            step: producers as u64,
        })
    }
}

impl Iterator for Ids {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let id = self.next?;
        self.next = id.checked_add(self.step);
        Some(id)
    }
}

/// Builds vehicles and stores them until `stop` is stopped or `ids` runs out.
///
/// Returns the number of vehicles stored.
pub fn produce(warehouse: &Warehouse, stop: &StopToken, mut ids: Ids, delay: Duration) -> u64 {
    let mut produced = 0;
    while !stop.is_stopped() {
        let Some(id) = ids.next() else {
            tracing::warn!("ran out of vehicle ids");
            break;
        };
        let vehicle = Vehicle::random(id);
        tracing::debug!("produced vehicle, id={id}, type={}", vehicle.kind());
        if let Err(Cancelled(vehicle)) = warehouse.insert_until(vehicle, stop) {
            tracing::debug!("discarded vehicle, id={}", vehicle.id());
            break;
        }
        produced += 1;
        pause(delay, stop);
    }
    produced
}

/// Takes vehicles out of the warehouse and hands them to `report` until
/// `stop` is stopped.
///
/// Returns the number of vehicles taken.
pub fn consume<R>(
    warehouse: &Warehouse,
    stop: &StopToken,
    dealer: usize,
    delay: Duration,
    mut report: R,
) -> u64
where
    R: FnMut(usize, &Vehicle) -> io::Result<()>,
{
    let mut consumed = 0;
    while !stop.is_stopped() {
        let Ok(vehicle) = warehouse.remove_until(stop) else {
            break;
        };
        consumed += 1;
        if let Err(e) = report(dealer, &vehicle) {
            tracing::warn!("failed to report vehicle, id={}: {e}", vehicle.id());
        }
        drop(vehicle);
        pause(delay, stop);
    }
    consumed
}

/// Sleeps for `delay`, waking early if `stop` is stopped.
fn pause(delay: Duration, stop: &StopToken) {
    let deadline = Instant::now() + delay;
    loop {
        let now = Instant::now();
        if now >= deadline || stop.is_stopped() {
            return;
        }
        std::thread::sleep((deadline - now).min(STOP_POLL_INTERVAL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn producer_ids_interleave() {
        let mut all = (0..3)
            .flat_map(|k| Ids::new(1001, k, 3).unwrap().take(1000))
            .collect::<Vec<_>>();
        assert_eq!(
            Ids::new(1001, 1, 3).unwrap().take(3).collect::<Vec<_>>(),
            [1002, 1005, 1008]
        );
        all.sort_unstable();
        assert_eq!(all, (1001..1001 + 3000).collect::<Vec<_>>());
    }

    #[test]
    fn producer_ids_end_at_max() {
        assert!(Ids::new(u64::MAX - 1, 2, 3).is_none());
        assert_eq!(
            Ids::new(u64::MAX - 4, 1, 2).unwrap().collect::<Vec<_>>(),
            [u64::MAX - 3, u64::MAX - 1]
        );
        assert_eq!(Ids::new(u64::MAX, 0, 1).unwrap().collect::<Vec<_>>(), [u64::MAX]);
    }

    #[test]
    fn producer_exits_when_ids_run_out() {
        let warehouse = Warehouse::new(4).unwrap();
        let stop = StopToken::new();
        let ids = Ids::new(u64::MAX - 1, 0, 1).unwrap();
        assert_eq!(produce(&warehouse, &stop, ids, Duration::ZERO), 2);
        assert_eq!(warehouse.remove().id(), u64::MAX - 1);
        assert_eq!(warehouse.remove().id(), u64::MAX);
        assert!(warehouse.is_empty());
    }

    #[test]
    fn pause_wakes_on_stop() {
        let stop = StopToken::new();
        stop.stop();
        let now = Instant::now();
        pause(Duration::from_secs(60), &stop);
        assert!(now.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn workers_stop_without_losing_vehicles() {
        let warehouse = Warehouse::new(4).unwrap();
        let stop = StopToken::new();
        let seen = Mutex::new(Vec::new());

        let (produced, consumed) = std::thread::scope(|cx| {
            let ids = Ids::new(1001, 0, 1).unwrap();
            let producer = cx.spawn(|| produce(&warehouse, &stop, ids, Duration::ZERO));
            let dealers = (1..=2)
                .map(|dealer| {
                    let (warehouse, stop, seen) = (&warehouse, &stop, &seen);
                    cx.spawn(move || {
                        consume(warehouse, stop, dealer, Duration::ZERO, |_, v| {
                            seen.lock().unwrap().push(v.id());
                            Ok(())
                        })
                    })
                })
                .collect::<Vec<_>>();

            std::thread::sleep(Duration::from_millis(100));
            stop.stop();

            let consumed = dealers.into_iter().map(|d| d.join().unwrap()).sum::<u64>();
            (producer.join().unwrap(), consumed)
        });

        assert!(produced > 0);
        assert_eq!(produced, consumed + warehouse.len() as u64);

        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        let expected = (1001..1001 + consumed).collect::<Vec<_>>();
        // Leftovers are the newest vehicles, so the consumed ids are a prefix.
        assert_eq!(seen, expected);
    }

    #[test]
    fn report_failure_keeps_dealer_running() {
        let warehouse = Warehouse::new(2).unwrap();
        let stop = StopToken::new();
        warehouse.insert(Vehicle::random(1));
        warehouse.insert(Vehicle::random(2));

        let mut calls = 0;
        let consumed = std::thread::scope(|cx| {
            let dealer = cx.spawn(|| {
                consume(&warehouse, &stop, 1, Duration::ZERO, |_, _| {
                    calls += 1;
                    Err(io::Error::other("closed"))
                })
            });
            while !warehouse.is_empty() {
                std::thread::yield_now();
            }
            stop.stop();
            dealer.join().unwrap()
        });
        assert_eq!(consumed, 2);
        assert_eq!(calls, 2);
    }
}
