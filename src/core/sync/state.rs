/*!
 * Crossing State
 *
 * The counters and fairness hint shared by every entity, plus the admission
 * predicate and turn rotation. Pure bookkeeping: callers hold the monitor lock.
 */

use crate::core::types::{PerClass, TrafficClass, CLASS_COUNT};
use serde::Serialize;

/// Shared crossing counters guarded by the monitor lock
///
/// Admission needs more than an empty set of conflicting classes: while the
/// class holding the turn has waiters, nobody else gets in. Every exit, not
/// only the last one, passes the turn to the first waiting conflict along the
/// chain, so once another class queues up, newcomers of the class on the
/// crossing hold back and the crossing drains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossingState {
    active: PerClass<u32>,
    waiting: PerClass<u32>,
    turn: TrafficClass,
    operations: u64,
}

impl Default for CrossingState {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossingState {
    /// Empty crossing, turn on CarNorth
    pub const fn new() -> Self {
        Self {
            active: [0; CLASS_COUNT],
            waiting: [0; CLASS_COUNT],
            turn: TrafficClass::CarNorth,
            operations: 0,
        }
    }

    #[inline]
    pub fn active(&self, class: TrafficClass) -> u32 {
        self.active[class.index()]
    }

    #[inline]
    pub fn waiting(&self, class: TrafficClass) -> u32 {
        self.waiting[class.index()]
    }

    #[inline]
    pub fn turn(&self) -> TrafficClass {
        self.turn
    }

    #[inline]
    pub fn operations(&self) -> u64 {
        self.operations
    }

    /// No conflicting class is on the crossing
    #[inline]
    pub fn conflicts_idle(&self, class: TrafficClass) -> bool {
        class
            .conflicting()
            .iter()
            .all(|other| self.active(*other) == 0)
    }

    /// Admission predicate for `class`
    ///
    /// The crossing must be free of every conflicting class. On top of that the
    /// favored class wins ties, but only while it actually has waiters.
    #[inline]
    pub fn can_enter(&self, class: TrafficClass) -> bool {
        self.conflicts_idle(class) && (self.turn == class || self.waiting(self.turn) == 0)
    }

    /// Record an entry or exit call
    #[inline]
    pub(crate) fn count_operation(&mut self) {
        self.operations += 1;
    }

    /// Step 1 of entry: register as a waiter
    #[inline]
    pub(crate) fn begin_wait(&mut self, class: TrafficClass) {
        self.waiting[class.index()] += 1;
    }

    /// Steps 3-5 of entry: leave the waiting set, stamp the turn, go active
    ///
    /// Returns the new active count for `class`.
    pub(crate) fn admit(&mut self, class: TrafficClass) -> u32 {
        debug_assert!(self.can_enter(class));
        let idx = class.index();
        self.waiting[idx] -= 1;
        self.turn = class;
        self.active[idx] += 1;
        self.active[idx]
    }

    /// Steps 1-2 of exit: leave the crossing and rotate the turn
    ///
    /// Returns the remaining active count for `class`.
    ///
    /// # Panics
    ///
    /// Panics if no entity of `class` is on the crossing. That is an exit
    /// without a matching entry (or a double exit) and the counters can no
    /// longer be trusted.
    pub(crate) fn release(&mut self, class: TrafficClass) -> u32 {
        let idx = class.index();
        assert!(
            self.active[idx] > 0,
            "crossing contract violated: {} released the crossing without holding it",
            class
        );
        self.active[idx] -= 1;
        self.rotate_turn(class);
        self.active[idx]
    }

    /// Move the turn along the priority chain rooted at `from`
    ///
    /// First conflicting class with waiters wins; the turn stays put when
    /// neither has any.
    pub(crate) fn rotate_turn(&mut self, from: TrafficClass) {
        if let Some(next) = from
            .conflicting()
            .into_iter()
            .find(|candidate| self.waiting(*candidate) > 0)
        {
            self.turn = next;
        }
    }

    /// Conflicting classes of `class` that have at least one waiter
    pub(crate) fn waiting_conflicts(
        &self,
        class: TrafficClass,
    ) -> impl Iterator<Item = TrafficClass> + '_ {
        class
            .conflicting()
            .into_iter()
            .filter(move |other| self.waiting(*other) > 0)
    }

    /// Class currently on the crossing, if any
    pub fn occupant(&self) -> Option<TrafficClass> {
        TrafficClass::ALL
            .into_iter()
            .find(|class| self.active(*class) > 0)
    }

    /// At most one class is active
    pub fn is_exclusive(&self) -> bool {
        self.active.iter().filter(|count| **count > 0).count() <= 1
    }

    /// Point-in-time copy for diagnostics
    pub fn snapshot(&self) -> CrossingSnapshot {
        CrossingSnapshot {
            active: self.active,
            waiting: self.waiting,
            turn: self.turn,
            operations: self.operations,
        }
    }
}

/// Consistent copy of the crossing counters, taken under the monitor lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrossingSnapshot {
    pub active: PerClass<u32>,
    pub waiting: PerClass<u32>,
    pub turn: TrafficClass,
    pub operations: u64,
}

impl CrossingSnapshot {
    #[inline]
    pub fn active(&self, class: TrafficClass) -> u32 {
        self.active[class.index()]
    }

    #[inline]
    pub fn waiting(&self, class: TrafficClass) -> u32 {
        self.waiting[class.index()]
    }

    /// Class currently on the crossing, if any
    pub fn occupant(&self) -> Option<TrafficClass> {
        TrafficClass::ALL
            .into_iter()
            .find(|class| self.active(*class) > 0)
    }

    /// Nobody on the crossing
    pub fn is_empty(&self) -> bool {
        self.active.iter().all(|count| *count == 0)
    }

    /// Nobody on the crossing and nobody waiting
    pub fn is_idle(&self) -> bool {
        self.is_empty() && self.waiting.iter().all(|count| *count == 0)
    }

    /// At most one class is active
    pub fn is_exclusive(&self) -> bool {
        self.active.iter().filter(|count| **count > 0).count() <= 1
    }
}
