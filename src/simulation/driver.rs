/*!
 * Simulation Driver
 * Runs one traffic generator per class against a shared crossing monitor
 */

use super::config::SimulationConfig;
use super::generator::{ClassReport, TrafficGenerator};
use crate::core::errors::{SimulationError, SimulationResult};
use crate::core::sync::{CrossingMonitor, CrossingSnapshot, CrossingStatsSnapshot};
use crate::core::types::TrafficClass;
use crate::monitoring::span_run;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info};

/// Outcome of a full simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub run_id: String,
    pub seed: u64,
    pub elapsed: Duration,
    pub classes: BTreeMap<TrafficClass, ClassReport>,
    pub final_state: CrossingSnapshot,
    pub stats: CrossingStatsSnapshot,
}

impl SimulationReport {
    pub fn class(&self, class: TrafficClass) -> Option<&ClassReport> {
        self.classes.get(&class)
    }

    /// Entities that crossed and left, across all classes
    pub fn completed(&self) -> usize {
        self.classes.values().map(|r| r.completed).sum()
    }

    pub fn exclusion_violations(&self) -> usize {
        self.classes.values().map(|r| r.exclusion_violations).sum()
    }

    /// Every entity crossed, entries matched exits, nobody shared the crossing,
    /// and the monitor ended idle
    pub fn is_clean(&self) -> bool {
        let conserved = self.classes.iter().all(|(class, report)| {
            report.requested == report.completed
                && self.stats.admitted(*class) == report.completed as u64
                && self.stats.released(*class) == report.completed as u64
        });
        conserved && self.exclusion_violations() == 0 && self.final_state.is_idle()
    }
}

/// A configured simulation bound to one crossing monitor
pub struct Simulation {
    config: SimulationConfig,
    monitor: Arc<CrossingMonitor>,
}

impl Simulation {
    /// Validate the configuration and create a fresh monitor
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        Self::with_monitor(config, Arc::new(CrossingMonitor::new()))
    }

    /// Run against an existing monitor
    pub fn with_monitor(
        config: SimulationConfig,
        monitor: Arc<CrossingMonitor>,
    ) -> SimulationResult<Self> {
        config.validate()?;
        Ok(Self { config, monitor })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn monitor(&self) -> &Arc<CrossingMonitor> {
        &self.monitor
    }

    /// Start the three generators, wait for every entity, and report
    pub fn run(&self) -> SimulationResult<SimulationReport> {
        let run = span_run(self.config.seed);
        let _entered = run.enter();
        info!(
            run_id = run.run_id(),
            entities = self.config.total_entities(),
            time_scale = self.config.time_scale,
            "simulation starting"
        );

        let generators: Vec<_> = TrafficClass::ALL
            .into_iter()
            .map(|class| {
                let generator =
                    TrafficGenerator::new(class, &self.config, Arc::clone(&self.monitor));
                let parent = run.span().clone();
                let handle = thread::Builder::new()
                    .name(format!("gen-{}", class))
                    .spawn(move || {
                        let _run = parent.enter();
                        generator.run()
                    });
                (class, handle)
            })
            .collect();

        let mut classes = BTreeMap::new();
        let mut failure = None;
        for (class, handle) in generators {
            let handle = match handle {
                Ok(handle) => handle,
                Err(source) => {
                    error!(class = class.as_str(), error = %source, "failed to start generator");
                    failure.get_or_insert(SimulationError::GeneratorSpawn { class, source });
                    continue;
                }
            };
            match handle.join() {
                Ok(report) => {
                    if report.panicked > 0 {
                        failure.get_or_insert(SimulationError::EntityPanicked {
                            class,
                            count: report.panicked,
                        });
                    }
                    classes.insert(class, report);
                }
                Err(_) => {
                    failure.get_or_insert(SimulationError::GeneratorPanicked(class));
                }
            }
        }

        if let Some(err) = failure {
            error!(error = %err, "simulation aborted");
            return Err(err);
        }

        let report = SimulationReport {
            run_id: run.run_id().to_string(),
            seed: self.config.seed,
            elapsed: run.elapsed(),
            classes,
            final_state: self.monitor.snapshot(),
            stats: self.monitor.stats(),
        };
        run.record_completed(report.completed());
        info!(
            completed = report.completed(),
            violations = report.exclusion_violations(),
            operations = report.final_state.operations,
            "simulation complete"
        );
        Ok(report)
    }
}

/// Run a simulation on a fresh monitor
pub fn run_simulation(config: SimulationConfig) -> SimulationResult<SimulationReport> {
    Simulation::new(config)?.run()
}
