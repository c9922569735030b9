/*!
 * One-Lane Tunnel
 * Crossing monitor for three conflicting traffic classes, plus a traffic
 * simulation that exercises it
 */

pub mod core;
pub mod monitoring;
pub mod simulation;

// Re-exports
pub use crate::core::errors::{ClassParseError, ConfigError, SimulationError};
pub use crate::core::sync::{
    CrossingMonitor, CrossingPermit, CrossingSnapshot, CrossingState, CrossingStatsSnapshot,
};
pub use crate::core::types::TrafficClass;
pub use monitoring::{init_test_tracing, init_tracing};
pub use simulation::{run_simulation, Simulation, SimulationConfig, SimulationReport, TrafficProfile};
