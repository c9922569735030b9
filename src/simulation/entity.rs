/*!
 * Crossing Entity
 * Lifecycle of a single car or pedestrian: request, cross, leave
 */

use super::delay::DelayRng;
use crate::core::sync::CrossingMonitor;
use crate::core::types::TrafficClass;
use crate::monitoring::span_entity;
use serde::Serialize;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// What happened to one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityOutcome {
    pub class: TrafficClass,
    pub id: usize,
    /// Time from requesting entry to being admitted
    pub wait: Duration,
    /// Time spent on the crossing
    pub crossing: Duration,
    /// Another class was seen on the crossing during this entity's stay
    pub exclusion_violated: bool,
}

/// One car or pedestrian
#[derive(Debug, Clone, Copy)]
pub struct Entity {
    pub class: TrafficClass,
    pub id: usize,
    pub crossing_time: Duration,
}

impl Entity {
    pub fn new(class: TrafficClass, id: usize, crossing_time: Duration) -> Self {
        Self {
            class,
            id,
            crossing_time,
        }
    }

    /// Entity with a crossing time drawn from its own seeded stream
    pub fn sampled(class: TrafficClass, id: usize, seed: u64, max_crossing: Duration) -> Self {
        let crossing_time = DelayRng::for_entity(seed, class, id).crossing(max_crossing);
        Self::new(class, id, crossing_time)
    }

    /// Cross once: one entry, one crossing delay, one exit
    pub fn run(self, monitor: &CrossingMonitor) -> EntityOutcome {
        let span = span_entity(self.class, self.id);
        let _entered = span.enter();
        let class = self.class.as_str();

        info!(class, id = self.id, ops = monitor.operations(), "wants to enter");
        let requested = Instant::now();
        let permit = monitor.enter(self.class);
        let wait = requested.elapsed();
        span.record_wait(wait);
        info!(class, id = self.id, ops = monitor.operations(), "enters the crossing");

        let mut violated = !self.holds_crossing(monitor);
        thread::sleep(self.crossing_time);
        violated |= !self.holds_crossing(monitor);
        span.record_crossing(self.crossing_time);

        if violated {
            error!(
                class,
                id = self.id,
                snapshot = ?monitor.snapshot(),
                "another class shared the crossing"
            );
        }

        info!(class, id = self.id, ops = monitor.operations(), "leaving the crossing");
        permit.leave();
        info!(class, id = self.id, ops = monitor.operations(), "out of the crossing");

        EntityOutcome {
            class: self.class,
            id: self.id,
            wait,
            crossing: self.crossing_time,
            exclusion_violated: violated,
        }
    }

    /// Only this entity's class is on the crossing
    fn holds_crossing(&self, monitor: &CrossingMonitor) -> bool {
        let snapshot = monitor.snapshot();
        snapshot.is_exclusive() && snapshot.occupant() == Some(self.class)
    }
}
