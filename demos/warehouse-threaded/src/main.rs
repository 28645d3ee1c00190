mod console;
mod vehicle;
mod worker;

use std::thread::ScopedJoinHandle;
use std::time::Duration;

use anyhow::{Result, anyhow};
use argh::FromArgs;
use warehouse::StopToken;

use self::worker::Warehouse;

#[derive(Debug, FromArgs)]
/// Vehicle warehouse shared by producer and dealer threads
#[argh(help_triggers("--help"))]
struct Args {
    /// maximum number of vehicles stored at once
    #[argh(option, default = "10", arg_name = "int")]
    capacity: usize,
    /// number of producer threads
    #[argh(option, default = "1", arg_name = "int")]
    producers: usize,
    /// number of dealer threads
    #[argh(option, default = "4", arg_name = "int")]
    consumers: usize,
    /// id of the first produced vehicle
    #[argh(option, default = "1001", arg_name = "int")]
    start_id: u64,
    /// pause after each produced or consumed vehicle, in milliseconds
    #[argh(option, default = "700", arg_name = "int")]
    delay_ms: u64,
    /// stop all workers after this many seconds, runs forever if omitted
    #[argh(option, arg_name = "int")]
    run_secs: Option<u64>,
}

#[derive(Debug)]
struct Totals {
    produced: u64,
    consumed: u64,
    remaining: usize,
}

fn main() -> Result<()> {
    let args = argh::from_env::<Args>();
    tracing_subscriber::fmt()
        .with_thread_names(true)
        .without_time()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let stop = StopToken::new();
    if let Some(secs) = args.run_secs {
        let stop = stop.clone();
        std::thread::Builder::new()
            .name("timer".to_owned())
            .spawn(move || {
                std::thread::sleep(Duration::from_secs(secs));
                tracing::info!("run time elapsed, stopping workers");
                stop.stop();
            })?;
    }

    let totals = run(&args, &stop)?;
    tracing::info!(
        "exited warehouse, produced={}, consumed={}, remaining={}",
        totals.produced,
        totals.consumed,
        totals.remaining,
    );
    Ok(())
}

/// Runs producers and dealers on a fresh warehouse until `stop` is stopped.
fn run(args: &Args, stop: &StopToken) -> Result<Totals> {
    let warehouse = Warehouse::new(args.capacity).map_err(|e| anyhow!("invalid capacity: {e}"))?;
    if args.producers == 0 {
        return Err(anyhow!("at least one producer is required"));
    }
    if args.consumers == 0 {
        return Err(anyhow!("at least one consumer is required"));
    }
    let ids = (0..args.producers)
        .map(|k| worker::Ids::new(args.start_id, k, args.producers))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            anyhow!(
                "start id {} leaves no ids for {} producers",
                args.start_id,
                args.producers
            )
        })?;
    let delay = Duration::from_millis(args.delay_ms);
    tracing::info!(
        "started warehouse, capacity={}, producers={}, consumers={}",
        args.capacity,
        args.producers,
        args.consumers,
    );

    let (produced, consumed) = std::thread::scope(|cx| -> Result<_> {
        let warehouse = &warehouse;
        // Already running workers must observe the stop before the scope can
        // join them, so a failed spawn stops everything.
        let producers = ids
            .into_iter()
            .enumerate()
            .map(|(k, ids)| {
                std::thread::Builder::new()
                    .name(format!("producer-{k}"))
                    .spawn_scoped(cx, move || {
                        tracing::info!("started producer, ids={ids:?}");
                        let n = worker::produce(warehouse, stop, ids, delay);
                        tracing::info!("exited producer, produced={n}");
                        n
                    })
            })
            .collect::<std::io::Result<Vec<_>>>()
            .inspect_err(|_| stop.stop())?;
        let dealers = (1..=args.consumers)
            .map(|dealer| {
                std::thread::Builder::new()
                    .name(format!("dealer-{dealer}"))
                    .spawn_scoped(cx, move || {
                        tracing::info!("started dealer");
                        let n = worker::consume(warehouse, stop, dealer, delay, console::report);
                        tracing::info!("exited dealer, consumed={n}");
                        n
                    })
            })
            .collect::<std::io::Result<Vec<_>>>()
            .inspect_err(|_| stop.stop())?;
        let produced = join_all(producers).inspect_err(|_| stop.stop())?;
        let consumed = join_all(dealers)?;
        Ok((produced, consumed))
    })?;

    Ok(Totals {
        produced,
        consumed,
        remaining: warehouse.len(),
    })
}

fn join_all(handles: Vec<ScopedJoinHandle<'_, u64>>) -> Result<u64> {
    let mut total = 0;
    let mut panicked = false;
    for h in handles {
        match h.join() {
            Ok(n) => total += n,
            Err(_) => panicked = true,
        }
    }
    if panicked {
        Err(anyhow!("worker thread panicked"))
    } else {
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            capacity: 3,
            producers: 2,
            consumers: 3,
            start_id: 1001,
            delay_ms: 0,
            run_secs: None,
        }
    }

    #[test]
    fn reject_invalid_args() {
        let stop = StopToken::new();
        for args in [
            Args { capacity: 0, ..args() },
            Args { producers: 0, ..args() },
            Args { consumers: 0, ..args() },
            Args { start_id: u64::MAX, ..args() },
        ] {
            assert!(run(&args, &stop).is_err());
        }
    }

    #[test]
    fn run_until_stopped() {
        let stop = StopToken::new();
        let args = args();
        let totals = std::thread::scope(|cx| {
            let handle = cx.spawn(|| run(&args, &stop));
            std::thread::sleep(Duration::from_millis(100));
            stop.stop();
            handle.join().unwrap().unwrap()
        });
        assert!(totals.produced > 0);
        assert!(totals.remaining <= args.capacity);
        assert_eq!(totals.produced, totals.consumed + totals.remaining as u64);
    }

    #[test]
    fn run_with_last_ids() {
        // Each of the two producers gets two ids before running out.
        let args = Args {
            start_id: u64::MAX - 3,
            capacity: 4,
            ..args()
        };
        let stop = StopToken::new();
        let totals = std::thread::scope(|cx| {
            let handle = cx.spawn(|| run(&args, &stop));
            std::thread::sleep(Duration::from_millis(100));
            stop.stop();
            handle.join().unwrap().unwrap()
        });
        assert_eq!(totals.produced, 4);
        assert_eq!(totals.produced, totals.consumed + totals.remaining as u64);
    }
}
