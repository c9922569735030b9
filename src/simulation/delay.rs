/*!
 * Random Delays
 *
 * Each generator and each entity owns a `SmallRng` seeded from the run seed
 * mixed with its stream key, so threads never share an RNG and a run replays
 * from its seed up to OS scheduling.
 */

use crate::core::limits::MAX_INTERARRIVAL_FACTOR;
use crate::core::types::TrafficClass;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Fractional golden ratio, for seed mixing
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-stream delay source
pub struct DelayRng(SmallRng);

impl DelayRng {
    /// Arrival stream of one class
    pub fn for_generator(global_seed: u64, class: TrafficClass) -> Self {
        Self::mixed(global_seed, class.index() as u64 + 1)
    }

    /// Crossing time of one entity
    ///
    /// Entity keys sit above the generator keys.
    pub fn for_entity(global_seed: u64, class: TrafficClass, id: usize) -> Self {
        let key = ((id as u64) << 2 | class.index() as u64).wrapping_add(1 << 8);
        Self::mixed(global_seed, key)
    }

    fn mixed(global_seed: u64, key: u64) -> Self {
        let seed = global_seed ^ key.wrapping_mul(MIXING_CONSTANT);
        DelayRng(SmallRng::seed_from_u64(seed))
    }

    /// Exponential gap with the given mean, capped at `MAX_INTERARRIVAL_FACTOR` means
    pub fn interarrival(&mut self, mean: Duration) -> Duration {
        if mean.is_zero() {
            return Duration::ZERO;
        }
        // gen::<f64>() is in [0, 1), so 1 - u is in (0, 1] and ln is finite
        let u: f64 = self.0.gen();
        let factor = (-(1.0 - u).ln()).min(MAX_INTERARRIVAL_FACTOR);
        mean.mul_f64(factor)
    }

    /// Uniform crossing time in `[0, max)`
    pub fn crossing(&mut self, max: Duration) -> Duration {
        if max.is_zero() {
            return Duration::ZERO;
        }
        max.mul_f64(self.0.gen::<f64>())
    }
}
