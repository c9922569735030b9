/*!
 * Crossing Monitor
 *
 * Arbitrates entry to the one-lane crossing. One parking_lot mutex guards the
 * shared counters; each traffic class sleeps on its own condvar tied to that
 * mutex.
 */

use super::permit::CrossingPermit;
use super::state::{CrossingSnapshot, CrossingState};
use super::stats::{CrossingStats, CrossingStatsSnapshot};
use crate::core::types::{PerClass, TrafficClass};
use parking_lot::{Condvar, Mutex};
use std::fmt;

/// Monitor for the shared one-lane crossing
///
/// Share it by `Arc` between every entity and generator. Any number of
/// entities of one class may be on the crossing together; a different class
/// waits until the crossing is empty.
///
/// # Examples
///
/// ```
/// use one_lane_tunnel::{CrossingMonitor, TrafficClass};
///
/// let monitor = CrossingMonitor::new();
/// monitor.request_entry(TrafficClass::Pedestrian);
/// assert_eq!(monitor.snapshot().active(TrafficClass::Pedestrian), 1);
/// monitor.release_exit(TrafficClass::Pedestrian);
/// assert!(monitor.snapshot().is_idle());
/// ```
pub struct CrossingMonitor {
    state: Mutex<CrossingState>,
    queues: PerClass<Condvar>,
    stats: CrossingStats,
}

impl Default for CrossingMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossingMonitor {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CrossingState::new()),
            queues: [Condvar::new(), Condvar::new(), Condvar::new()],
            stats: CrossingStats::new(),
        }
    }

    /// Block until `class` may cross, then mark the caller active
    ///
    /// Never returns early and cannot be cancelled. Every successful call
    /// must be paired with exactly one [`release_exit`](Self::release_exit)
    /// for the same class.
    pub fn request_entry(&self, class: TrafficClass) {
        let mut state = self.state.lock();
        state.count_operation();
        state.begin_wait(class);

        let queue = &self.queues[class.index()];
        let mut blocked = false;
        while !state.can_enter(class) {
            if !blocked {
                self.stats.record_blocked(class);
                blocked = true;
            }
            queue.wait(&mut state);
            self.stats.record_recheck();
        }

        let active_now = state.admit(class);
        debug_assert!(state.is_exclusive());
        self.stats.record_admitted(class, active_now);
    }

    /// Leave the crossing and wake whichever classes may now proceed
    ///
    /// # Panics
    ///
    /// Panics if no entity of `class` is on the crossing (exit without entry,
    /// or a double exit).
    pub fn release_exit(&self, class: TrafficClass) {
        let mut state = self.state.lock();
        state.count_operation();
        let remaining = state.release(class);
        self.stats.record_released(class);

        if remaining == 0 {
            for other in state.waiting_conflicts(class) {
                self.queues[other.index()].notify_all();
                self.stats.record_broadcast();
            }
        }
    }

    /// Enter the crossing and release it when the permit drops
    pub fn enter(&self, class: TrafficClass) -> CrossingPermit<'_> {
        self.request_entry(class);
        CrossingPermit::new(self, class)
    }

    /// Blocking entry run on the tokio blocking pool
    ///
    /// Fails only if the runtime shut down before the entry task started, or
    /// the entry task panicked. On failure the caller is not on the crossing.
    #[cfg(feature = "tokio")]
    pub async fn request_entry_async(
        self: &std::sync::Arc<Self>,
        class: TrafficClass,
    ) -> Result<(), tokio::task::JoinError> {
        let monitor = std::sync::Arc::clone(self);
        tokio::task::spawn_blocking(move || monitor.request_entry(class)).await
    }

    /// Total entry and exit calls so far (diagnostics only)
    pub fn operations(&self) -> u64 {
        self.state.lock().operations()
    }

    /// Consistent copy of the counters
    pub fn snapshot(&self) -> CrossingSnapshot {
        self.state.lock().snapshot()
    }

    /// Cumulative admission statistics
    pub fn stats(&self) -> CrossingStatsSnapshot {
        self.stats.snapshot()
    }
}

impl fmt::Display for CrossingMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Monitor: {}", self.operations())
    }
}

impl fmt::Debug for CrossingMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossingMonitor")
            .field("state", &self.snapshot())
            .finish()
    }
}
