/*!
 * Traffic Generator
 * Spawns the entities of one class at random intervals and waits for all of them
 */

use super::config::{SimulationConfig, TrafficProfile};
use super::delay::DelayRng;
use super::entity::{Entity, EntityOutcome};
use crate::core::sync::CrossingMonitor;
use crate::core::types::TrafficClass;
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Summary of one generator's traffic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassReport {
    /// Entities spawned
    pub requested: usize,
    /// Entities that made it across and left
    pub completed: usize,
    /// Entity threads that panicked
    pub panicked: usize,
    /// Entities that saw another class on the crossing
    pub exclusion_violations: usize,
    pub max_wait: Duration,
    pub total_wait: Duration,
}

impl ClassReport {
    fn record(&mut self, outcome: &EntityOutcome) {
        self.completed += 1;
        self.total_wait += outcome.wait;
        self.max_wait = self.max_wait.max(outcome.wait);
        if outcome.exclusion_violated {
            self.exclusion_violations += 1;
        }
    }

    /// Average admission wait of completed entities
    pub fn mean_wait(&self) -> Duration {
        match u32::try_from(self.completed) {
            Ok(n) if n > 0 => self.total_wait / n,
            _ => Duration::ZERO,
        }
    }
}

/// Arrival stream for one traffic class
pub struct TrafficGenerator {
    class: TrafficClass,
    profile: TrafficProfile,
    config: SimulationConfig,
    monitor: Arc<CrossingMonitor>,
}

impl TrafficGenerator {
    pub fn new(class: TrafficClass, config: &SimulationConfig, monitor: Arc<CrossingMonitor>) -> Self {
        Self {
            class,
            profile: *config.profile(class),
            config: config.clone(),
            monitor,
        }
    }

    pub fn class(&self) -> TrafficClass {
        self.class
    }

    /// Spawn every entity, then join them all
    pub fn run(self) -> ClassReport {
        let mut arrivals = DelayRng::for_generator(self.config.seed, self.class);
        let max_crossing = self.config.scaled(self.profile.max_crossing);
        let mut handles = Vec::with_capacity(self.profile.count);
        let mut inline = Vec::new();
        let parent = tracing::Span::current();

        info!(
            class = self.class.as_str(),
            count = self.profile.count,
            "generator started"
        );

        for id in 1..=self.profile.count {
            let entity = Entity::sampled(self.class, id, self.config.seed, max_crossing);
            let monitor = Arc::clone(&self.monitor);
            let parent = parent.clone();
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", self.class, id))
                .spawn(move || {
                    let _run = parent.enter();
                    entity.run(&monitor)
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Not entered yet, so nothing to release; cross on this thread
                    warn!(
                        class = self.class.as_str(),
                        id,
                        error = %e,
                        "thread spawn failed, crossing inline"
                    );
                    inline.push(entity.run(&self.monitor));
                }
            }

            let gap = self.config.scaled(arrivals.interarrival(self.profile.mean_interarrival));
            thread::sleep(gap);
        }

        let mut report = ClassReport {
            requested: self.profile.count,
            ..Default::default()
        };
        for outcome in &inline {
            report.record(outcome);
        }
        for handle in handles {
            match handle.join() {
                Ok(outcome) => report.record(&outcome),
                Err(_) => report.panicked += 1,
            }
        }

        debug!(
            class = self.class.as_str(),
            completed = report.completed,
            max_wait_ms = report.max_wait.as_millis() as u64,
            "generator finished"
        );
        report
    }
}
