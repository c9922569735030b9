/*!
 * Crossing Monitor Tests
 * Mutual exclusion, batching, turn rotation and starvation behavior
 */

use one_lane_tunnel::{CrossingMonitor, CrossingSnapshot, TrafficClass};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use TrafficClass::*;

/// Poll until `check` holds, or fail after two seconds
fn wait_until(monitor: &CrossingMonitor, what: &str, check: impl Fn(&CrossingSnapshot) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !check(&monitor.snapshot()) {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_same_class_batch_crosses_together() {
    let monitor = Arc::new(CrossingMonitor::new());
    let barrier = Arc::new(Barrier::new(3));

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let monitor = monitor.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                monitor.request_entry(CarNorth);
                // Everyone is on the crossing before anyone leaves
                barrier.wait();
                let seen = monitor.snapshot().active(CarNorth);
                barrier.wait();
                monitor.release_exit(CarNorth);
                seen
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 3);
    }

    let snapshot = monitor.snapshot();
    assert!(snapshot.is_idle());
    assert_eq!(monitor.stats().blocked(CarNorth), 0);
    assert_eq!(monitor.stats().peak_active(CarNorth), 3);
}

/// `root` is on the crossing; the other two classes queue up behind it.
/// Returns the order in which they got in and what each saw on entry.
fn run_two_waiters(root: TrafficClass) -> Vec<(TrafficClass, CrossingSnapshot)> {
    let monitor = Arc::new(CrossingMonitor::new());
    let order = Arc::new(Mutex::new(Vec::new()));
    monitor.request_entry(root);

    let handles: Vec<_> = root
        .conflicting()
        .into_iter()
        .map(|class| {
            let monitor = monitor.clone();
            let order = order.clone();
            thread::spawn(move || {
                monitor.request_entry(class);
                order.lock().push((class, monitor.snapshot()));
                thread::sleep(Duration::from_millis(30));
                monitor.release_exit(class);
            })
        })
        .collect();

    wait_until(&monitor, "both conflicting classes to queue", |s| {
        root.conflicting().iter().all(|c| s.waiting(*c) == 1)
    });
    monitor.release_exit(root);

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(monitor.snapshot().is_idle());

    let order = order.lock().clone();
    order
}

#[test]
fn test_exit_hands_crossing_to_next_in_chain() {
    for root in TrafficClass::ALL {
        let order = run_two_waiters(root);
        assert_eq!(order.len(), 2);

        let (first, first_seen) = order[0];
        let (second, second_seen) = order[1];
        assert_eq!(first, root.next(), "wrong successor after {root}");
        assert_eq!(second, root.next().next());

        // The loser was still queued while the winner crossed
        assert_eq!(first_seen.waiting(second), 1);
        assert_eq!(first_seen.occupant(), Some(first));
        // and only got in once the winner had fully cleared
        assert_eq!(second_seen.active(first), 0);
        assert_eq!(second_seen.occupant(), Some(second));
    }
}

#[test]
fn test_mutual_exclusion_all_pairs_under_load() {
    const PER_CLASS: usize = 40;
    let monitor = Arc::new(CrossingMonitor::new());
    let done = Arc::new(AtomicBool::new(false));
    let violations = Arc::new(AtomicUsize::new(0));

    // Independent observer sampling the counters while traffic flows
    let watcher = {
        let monitor = monitor.clone();
        let done = done.clone();
        let violations = violations.clone();
        thread::spawn(move || {
            let mut samples = 0usize;
            while !done.load(Ordering::Acquire) {
                if !monitor.snapshot().is_exclusive() {
                    violations.fetch_add(1, Ordering::Relaxed);
                }
                samples += 1;
                thread::yield_now();
            }
            samples
        })
    };

    let handles: Vec<_> = (0..PER_CLASS * 3)
        .map(|i| {
            let class = TrafficClass::from_index(i);
            let monitor = monitor.clone();
            let violations = violations.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_micros((i as u64 * 379) % 3_000));
                let permit = monitor.enter(class);
                for other in class.conflicting() {
                    if monitor.snapshot().active(other) != 0 {
                        violations.fetch_add(1, Ordering::Relaxed);
                    }
                }
                thread::sleep(Duration::from_micros(200 + (i as u64 * 131) % 800));
                drop(permit);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    done.store(true, Ordering::Release);
    assert!(watcher.join().unwrap() > 0);

    assert_eq!(violations.load(Ordering::Relaxed), 0);
    let snapshot = monitor.snapshot();
    assert!(snapshot.is_idle());
    assert_eq!(snapshot.operations, (PER_CLASS * 3 * 2) as u64);

    let stats = monitor.stats();
    assert!(stats.is_balanced());
    for class in TrafficClass::ALL {
        assert_eq!(stats.admitted(class), PER_CLASS as u64);
    }
}

#[test]
fn test_same_class_arrivals_overlap() {
    let monitor = Arc::new(CrossingMonitor::new());
    let start = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let monitor = monitor.clone();
            let start = start.clone();
            thread::spawn(move || {
                start.wait();
                let permit = monitor.enter(Pedestrian);
                thread::sleep(Duration::from_millis(20));
                drop(permit);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(monitor.stats().peak_active(Pedestrian) >= 2);
}

#[test]
fn test_continuous_stream_does_not_starve_pedestrian() {
    let monitor = Arc::new(CrossingMonitor::new());
    let stop = Arc::new(AtomicBool::new(false));

    // Overlapping northbound cars: without the turn the crossing never empties
    let cars: Vec<_> = (0..4)
        .map(|i| {
            let monitor = monitor.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(i * 2));
                let mut trips = 0u32;
                while !stop.load(Ordering::Acquire) {
                    let permit = monitor.enter(CarNorth);
                    thread::sleep(Duration::from_millis(5));
                    drop(permit);
                    trips += 1;
                }
                trips
            })
        })
        .collect();

    wait_until(&monitor, "northbound traffic", |s| s.active(CarNorth) > 0);
    let arrived = Instant::now();
    monitor.request_entry(Pedestrian);
    let waited = arrived.elapsed();
    let seen = monitor.snapshot();
    monitor.release_exit(Pedestrian);

    stop.store(true, Ordering::Release);
    let trips: u32 = cars.into_iter().map(|h| h.join().unwrap()).sum();

    assert!(waited < Duration::from_secs(1), "pedestrian waited {waited:?}");
    assert_eq!(seen.active(CarNorth), 0);
    assert!(trips > 0);
    assert!(monitor.snapshot().is_idle());
}

#[test]
fn test_newcomers_hold_back_while_turn_class_waits() {
    let monitor = Arc::new(CrossingMonitor::new());
    monitor.request_entry(CarSouth);
    monitor.request_entry(CarSouth);

    let pedestrian = {
        let monitor = monitor.clone();
        thread::spawn(move || {
            monitor.request_entry(Pedestrian);
            monitor.release_exit(Pedestrian);
        })
    };
    wait_until(&monitor, "pedestrian to queue", |s| s.waiting(Pedestrian) == 1);

    // One car leaves; the turn passes to the waiting pedestrian
    monitor.release_exit(CarSouth);
    assert_eq!(monitor.snapshot().turn, Pedestrian);

    let late_car = {
        let monitor = monitor.clone();
        thread::spawn(move || {
            monitor.request_entry(CarSouth);
            let seen = monitor.stats().released(Pedestrian);
            monitor.release_exit(CarSouth);
            seen
        })
    };
    wait_until(&monitor, "late car to queue", |s| s.waiting(CarSouth) == 1);
    assert_eq!(monitor.snapshot().active(CarSouth), 1);

    monitor.release_exit(CarSouth);
    pedestrian.join().unwrap();
    // The late car only got in after the pedestrian had crossed
    assert_eq!(late_car.join().unwrap(), 1);
    assert!(monitor.snapshot().is_idle());
}

#[test]
#[should_panic(expected = "crossing contract violated")]
fn test_exit_without_entry_is_fatal() {
    let monitor = CrossingMonitor::new();
    monitor.request_entry(CarNorth);
    monitor.release_exit(Pedestrian);
}

#[test]
fn test_operations_counter_feeds_display() {
    let monitor = CrossingMonitor::new();
    assert_eq!(monitor.to_string(), "Monitor: 0");
    let permit = monitor.enter(CarSouth);
    assert_eq!(monitor.operations(), 1);
    permit.leave();
    assert_eq!(monitor.to_string(), "Monitor: 2");
}
