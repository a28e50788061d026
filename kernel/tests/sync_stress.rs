//! Concurrency stress tests for the synchronization primitives, run as
//! real OS threads against the scheduler's host-test blocking path.
//!
//! Grounded on the classic `catlock`/`catsem`/`stoplight` exercises: each
//! test assigns every spawned thread a distinct scheduler identity, drives
//! them through a contended resource, and asserts the invariant the
//! original exercise checks for rather than reproducing its console
//! narration.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use kernel::sched::scheduler;
use kernel::sync::{CondVar, Lock, Semaphore};

/// `catsem`: a counting semaphore must never let more than its capacity
/// of callers past `wait()` at once, no matter how many threads contend.
#[test]
fn semaphore_bounds_concurrent_occupancy_under_contention() {
    const CAPACITY: u32 = 2;
    const WORKERS: u32 = 8;

    let bowls = Arc::new(Semaphore::new("food bowls", CAPACITY));
    let occupancy = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(WORKERS as usize));

    let handles: Vec<_> = (0..WORKERS)
        .map(|id| {
            let bowls = bowls.clone();
            let occupancy = occupancy.clone();
            let peak = peak.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                scheduler::set_current(id + 1);
                barrier.wait();
                for _ in 0..20 {
                    bowls.wait();
                    let now = occupancy.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::yield_now();
                    occupancy.fetch_sub(1, Ordering::SeqCst);
                    bowls.signal();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) <= CAPACITY as usize);
    assert_eq!(bowls.count(), CAPACITY);
}

/// `catlock`: cats and mice share one dish but must never eat from it at
/// the same time. Mutual exclusion comes from a lock plus a condvar that
/// lets a waiting species block until the dish is free rather than
/// spin-polling it.
#[test]
fn lock_and_condvar_keep_cats_and_mice_off_the_dish_together() {
    #[derive(PartialEq, Eq, Clone, Copy)]
    enum Occupant {
        Empty,
        Cat,
        Mouse,
    }

    struct Dish {
        lock: Lock,
        free: CondVar,
        occupant: std::sync::Mutex<Occupant>,
    }

    const NCATS: u32 = 3;
    const NMICE: u32 = 3;
    const N_ITERATIONS: u32 = 5;

    let dish = Arc::new(Dish {
        lock: Lock::new("dish"),
        free: CondVar::new("dish free"),
        occupant: std::sync::Mutex::new(Occupant::Empty),
    });
    let violations = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new((NCATS + NMICE) as usize));

    let mut handles = Vec::new();
    for id in 0..NCATS {
        let dish = dish.clone();
        let violations = violations.clone();
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || {
            scheduler::set_current(id + 1);
            barrier.wait();
            for _ in 0..N_ITERATIONS {
                dish.lock.acquire();
                while *dish.occupant.lock().unwrap() == Occupant::Mouse {
                    dish.free.wait(&dish.lock);
                }
                *dish.occupant.lock().unwrap() = Occupant::Cat;
                if *dish.occupant.lock().unwrap() != Occupant::Cat {
                    violations.fetch_add(1, Ordering::SeqCst);
                }
                thread::yield_now();
                *dish.occupant.lock().unwrap() = Occupant::Empty;
                dish.free.broadcast();
                dish.lock.release();
            }
        }));
    }
    for id in 0..NMICE {
        let dish = dish.clone();
        let violations = violations.clone();
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || {
            scheduler::set_current(NCATS + id + 1);
            barrier.wait();
            for _ in 0..N_ITERATIONS {
                dish.lock.acquire();
                while *dish.occupant.lock().unwrap() == Occupant::Cat {
                    dish.free.wait(&dish.lock);
                }
                *dish.occupant.lock().unwrap() = Occupant::Mouse;
                if *dish.occupant.lock().unwrap() != Occupant::Mouse {
                    violations.fetch_add(1, Ordering::SeqCst);
                }
                thread::yield_now();
                *dish.occupant.lock().unwrap() = Occupant::Empty;
                dish.free.broadcast();
                dish.lock.release();
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(violations.load(Ordering::SeqCst), 0);
    assert_eq!(*dish.occupant.lock().unwrap(), Occupant::Empty);
}

/// `stoplight`: four quadrant locks, acquired in the order each car's
/// route needs them, must never deadlock even when every direction is
/// driving simultaneously and routes cross through the same quadrants in
/// different orders.
#[test]
fn intersection_quadrant_locks_never_deadlock_under_crossing_traffic() {
    const NCARS: u32 = 20;

    let nw = Arc::new(Lock::new("NW"));
    let ne = Arc::new(Lock::new("NE"));
    let sw = Arc::new(Lock::new("SW"));
    let se = Arc::new(Lock::new("SE"));
    let crossings = Arc::new(AtomicU32::new(0));

    let handles: Vec<_> = (0..NCARS)
        .map(|id| {
            let (first, second) = match id % 4 {
                0 => (nw.clone(), ne.clone()),
                1 => (ne.clone(), se.clone()),
                2 => (se.clone(), sw.clone()),
                _ => (sw.clone(), nw.clone()),
            };
            let crossings = crossings.clone();
            thread::spawn(move || {
                scheduler::set_current(id + 1);
                Lock::acquire_two(&first, &second);
                crossings.fetch_add(1, Ordering::SeqCst);
                thread::yield_now();
                Lock::release_two(&first, &second);
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(crossings.load(Ordering::SeqCst), NCARS);
}
