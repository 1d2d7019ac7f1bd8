//! Stress tests for the task queue

use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use taskq::prelude::*;

#[derive(Default)]
struct Ledger {
    executed: HashMap<u64, usize>,
    disposed: HashMap<u64, usize>,
}

struct Counted {
    id: u64,
    ledger: Arc<Mutex<Ledger>>,
}

impl Task for Counted {
    fn execute(&mut self) {
        *self.ledger.lock().executed.entry(self.id).or_default() += 1;
    }

    fn dispose(self: Box<Self>) {
        *self.ledger.lock().disposed.entry(self.id).or_default() += 1;
    }
}

fn check_exactly_once(ledger: &Ledger, ids: impl Iterator<Item = u64>) {
    for id in ids {
        assert_eq!(ledger.disposed.get(&id), Some(&1), "task {} disposals", id);
        assert!(ledger.executed.get(&id).copied().unwrap_or(0) <= 1);
    }
}

#[test]
fn stress_test_producers_racing_purge() {
    let ledger = Arc::new(Mutex::new(Ledger::default()));
    let queue = Arc::new(TaskQueue::with_poll_interval(Duration::from_millis(5)).unwrap());

    let producers: Vec<_> = (0..4u64)
        .map(|p| {
            let queue = queue.clone();
            let ledger = ledger.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    let task = Counted {
                        id: p * 1_000 + i,
                        ledger: ledger.clone(),
                    };
                    assert!(queue.enqueue(task).unwrap().is_accepted());
                }
            })
        })
        .collect();

    let purger = {
        let queue = queue.clone();
        thread::spawn(move || {
            for _ in 0..50 {
                queue.purge();
                thread::yield_now();
            }
        })
    };

    for handle in producers {
        handle.join().unwrap();
    }
    purger.join().unwrap();
    queue.shutdown().unwrap();

    let ledger = ledger.lock();
    check_exactly_once(&ledger, (0..4u64).flat_map(|p| (0..200).map(move |i| p * 1_000 + i)));
}

#[test]
fn stress_test_enqueue_racing_terminate() {
    let ledger = Arc::new(Mutex::new(Ledger::default()));
    let queue = Arc::new(TaskQueue::with_poll_interval(Duration::from_millis(5)).unwrap());
    let rejected = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..4u64)
        .map(|p| {
            let queue = queue.clone();
            let ledger = ledger.clone();
            let rejected = rejected.clone();
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for i in 0..100 {
                    let task = Counted {
                        id: p * 1_000 + i,
                        ledger: ledger.clone(),
                    };
                    if queue.enqueue(task).unwrap() == Status::Rejected {
                        rejected.fetch_add(1, Ordering::Relaxed);
                    }
                    if rng.gen_bool(0.1) {
                        thread::sleep(Duration::from_micros(rng.gen_range(10..200)));
                    }
                }
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(5));
    queue.shutdown().unwrap();

    for handle in producers {
        handle.join().unwrap();
    }

    // rejected tasks were disposed too, so every id is accounted for
    let ledger = ledger.lock();
    check_exactly_once(&ledger, (0..4u64).flat_map(|p| (0..100).map(move |i| p * 1_000 + i)));
    assert_eq!(queue.metrics().tasks_rejected as usize, rejected.load(Ordering::Relaxed));
}

#[test]
#[ignore] // Run with --ignored flag
fn stress_test_many_queues() {
    for round in 0..200u64 {
        let ledger = Arc::new(Mutex::new(Ledger::default()));
        {
            let queue = TaskQueue::with_poll_interval(Duration::from_millis(1)).unwrap();
            for i in 0..50 {
                let _ = queue
                    .enqueue(Counted {
                        id: i,
                        ledger: ledger.clone(),
                    })
                    .unwrap();
                if i % 7 == 0 {
                    let _ = queue.enqueue(Entry::Empty).unwrap();
                }
            }
        }

        let ledger = ledger.lock();
        assert_eq!(ledger.disposed.len(), 50, "round {}", round);
        check_exactly_once(&ledger, 0..50);
    }
}

#[test]
#[ignore]
fn stress_test_high_volume() {
    let ledger = Arc::new(Mutex::new(Ledger::default()));
    let queue = Arc::new(TaskQueue::new().unwrap());

    let producers: Vec<_> = (0..8u64)
        .map(|p| {
            let queue = queue.clone();
            let ledger = ledger.clone();
            thread::spawn(move || {
                for i in 0..10_000 {
                    let _ = queue
                        .enqueue(Counted {
                            id: p * 100_000 + i,
                            ledger: ledger.clone(),
                        })
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in producers {
        handle.join().unwrap();
    }
    queue.shutdown().unwrap();

    let ledger = ledger.lock();
    assert_eq!(ledger.disposed.len(), 80_000);
    check_exactly_once(&ledger, (0..8u64).flat_map(|p| (0..10_000).map(move |i| p * 100_000 + i)));
}
