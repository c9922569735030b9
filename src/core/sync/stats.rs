/*!
 * Lock-Free Crossing Statistics
 * Atomic counters updated beside the monitor lock, readable without taking it
 */

use crate::core::types::{PerClass, TrafficClass, CLASS_COUNT};
use serde::Serialize;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Per-class counters
#[derive(Default)]
struct ClassCounters {
    admitted: AtomicU64,
    released: AtomicU64,
    blocked: AtomicU64,
    peak_active: AtomicU32,
}

/// Atomic crossing statistics
///
/// # Performance
/// - Cache-line aligned to prevent false sharing with the monitor lock
/// - All operations use relaxed ordering; values are diagnostic only
#[repr(C, align(64))]
#[derive(Default)]
pub struct CrossingStats {
    classes: [ClassCounters; CLASS_COUNT],
    broadcasts: AtomicU64,
    rechecks: AtomicU64,
}

impl CrossingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an admission and the resulting active count
    #[inline]
    pub fn record_admitted(&self, class: TrafficClass, active_now: u32) {
        let counters = &self.classes[class.index()];
        counters.admitted.fetch_add(1, Ordering::Relaxed);
        counters.peak_active.fetch_max(active_now, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_released(&self, class: TrafficClass) {
        self.classes[class.index()]
            .released
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Entry that had to suspend at least once
    #[inline]
    pub fn record_blocked(&self, class: TrafficClass) {
        self.classes[class.index()]
            .blocked
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Wake-up that re-tested the admission predicate
    #[inline]
    pub fn record_recheck(&self) {
        self.rechecks.fetch_add(1, Ordering::Relaxed);
    }

    /// Broadcast on one class's wait queue
    #[inline]
    pub fn record_broadcast(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// Read-only copy of every counter
    pub fn snapshot(&self) -> CrossingStatsSnapshot {
        CrossingStatsSnapshot {
            admitted: self.per_class(|c| c.admitted.load(Ordering::Relaxed)),
            released: self.per_class(|c| c.released.load(Ordering::Relaxed)),
            blocked: self.per_class(|c| c.blocked.load(Ordering::Relaxed)),
            peak_active: self.per_class(|c| u64::from(c.peak_active.load(Ordering::Relaxed))),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            rechecks: self.rechecks.load(Ordering::Relaxed),
        }
    }

    fn per_class(&self, read: impl Fn(&ClassCounters) -> u64) -> PerClass<u64> {
        [
            read(&self.classes[0]),
            read(&self.classes[1]),
            read(&self.classes[2]),
        ]
    }
}

/// Snapshot of [`CrossingStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrossingStatsSnapshot {
    pub admitted: PerClass<u64>,
    pub released: PerClass<u64>,
    pub blocked: PerClass<u64>,
    pub peak_active: PerClass<u64>,
    pub broadcasts: u64,
    pub rechecks: u64,
}

impl CrossingStatsSnapshot {
    #[inline]
    pub fn admitted(&self, class: TrafficClass) -> u64 {
        self.admitted[class.index()]
    }

    #[inline]
    pub fn released(&self, class: TrafficClass) -> u64 {
        self.released[class.index()]
    }

    #[inline]
    pub fn blocked(&self, class: TrafficClass) -> u64 {
        self.blocked[class.index()]
    }

    #[inline]
    pub fn peak_active(&self, class: TrafficClass) -> u64 {
        self.peak_active[class.index()]
    }

    /// Every admission has been matched by a release
    pub fn is_balanced(&self) -> bool {
        self.admitted == self.released
    }
}
