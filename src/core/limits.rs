/*!
 * Simulation Limits and Constants
 *
 * Default traffic profile for the crossing simulation.
 * Organized by traffic class.
 */

use std::time::Duration;

// =============================================================================
// CARS
// =============================================================================

/// Cars generated per direction in a default run
pub const DEFAULT_CARS_PER_DIRECTION: usize = 100;

/// Mean gap between car arrivals in one direction (exponential)
pub const DEFAULT_CAR_INTERARRIVAL: Duration = Duration::from_millis(500);

/// Upper bound of the uniform time a car spends on the crossing
pub const DEFAULT_CAR_CROSSING: Duration = Duration::from_secs(1);

// =============================================================================
// PEDESTRIANS
// =============================================================================

/// Pedestrians generated in a default run
pub const DEFAULT_PEDESTRIANS: usize = 10;

/// Mean gap between pedestrian arrivals (exponential)
pub const DEFAULT_PEDESTRIAN_INTERARRIVAL: Duration = Duration::from_secs(5);

/// Upper bound of the uniform time a pedestrian spends on the crossing
pub const DEFAULT_PEDESTRIAN_CROSSING: Duration = Duration::from_secs(1);

// =============================================================================
// RUN
// =============================================================================

/// Scale applied to every simulated duration (1.0 = real time)
pub const DEFAULT_TIME_SCALE: f64 = 1.0;

/// Global seed for generator and entity RNGs
pub const DEFAULT_SEED: u64 = 0x5EED_7A11;

/// Sampled inter-arrival gaps are clamped to this multiple of the mean
pub const MAX_INTERARRIVAL_FACTOR: f64 = 20.0;

/// Longest crossing time a profile may ask for
pub const MAX_CROSSING: Duration = Duration::from_secs(3600);

/// Longest mean inter-arrival gap a profile may ask for
pub const MAX_MEAN_INTERARRIVAL: Duration = Duration::from_secs(3600);
