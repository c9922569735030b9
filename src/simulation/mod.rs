/*!
 * Traffic Simulation
 *
 * Drives the crossing monitor with three independent arrival streams:
 * northbound cars, southbound cars and pedestrians. Each entity runs on its
 * own thread and makes exactly one entry and one exit.
 */

mod config;
mod delay;
mod driver;
mod entity;
mod generator;

pub use config::{SimulationConfig, TrafficProfile};
pub use delay::DelayRng;
pub use driver::{run_simulation, Simulation, SimulationReport};
pub use entity::{Entity, EntityOutcome};
pub use generator::{ClassReport, TrafficGenerator};
