/*!
 * Crossing Synchronization
 *
 * Monitor that admits one traffic class at a time onto a single-lane crossing.
 *
 * # Architecture
 *
 * - `state`: counters, admission predicate, turn rotation (pure bookkeeping)
 * - `monitor`: mutex + per-class condvars around the state
 * - `permit`: RAII guard pairing entry with exit
 * - `stats`: lock-free cumulative counters for diagnostics
 *
 * # Fairness
 *
 * When a class leaves, the turn moves along the chain
 * CarNorth -> CarSouth -> Pedestrian -> CarNorth to the first conflicting
 * class with waiters. While the favored class has waiters, newcomers of other
 * classes (including the one on the crossing) hold back, so a steady stream of
 * one class cannot lock the others out.
 */

mod monitor;
mod permit;
mod state;
mod stats;

pub use monitor::CrossingMonitor;
pub use permit::CrossingPermit;
pub use state::{CrossingSnapshot, CrossingState};
pub use stats::{CrossingStats, CrossingStatsSnapshot};
