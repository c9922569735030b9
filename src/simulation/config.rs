/*!
 * Simulation Configuration
 *
 * Traffic profiles per class, loaded from defaults, an optional JSON file and
 * environment overrides.
 */

use crate::core::errors::{ConfigError, ConfigResult};
use crate::core::limits::*;
use crate::core::types::TrafficClass;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;
use std::time::Duration;

/// Arrival and crossing behavior of one traffic class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficProfile {
    /// Entities generated over the run
    pub count: usize,
    /// Mean of the exponential gap between arrivals
    #[serde(with = "millis")]
    pub mean_interarrival: Duration,
    /// Crossing time is uniform in `[0, max_crossing)`
    #[serde(with = "millis")]
    pub max_crossing: Duration,
}

impl TrafficProfile {
    pub const fn new(count: usize, mean_interarrival: Duration, max_crossing: Duration) -> Self {
        Self {
            count,
            mean_interarrival,
            max_crossing,
        }
    }

    /// Default profile for cars in either direction
    pub const fn cars() -> Self {
        Self::new(
            DEFAULT_CARS_PER_DIRECTION,
            DEFAULT_CAR_INTERARRIVAL,
            DEFAULT_CAR_CROSSING,
        )
    }

    /// Default profile for pedestrians
    pub const fn pedestrians() -> Self {
        Self::new(
            DEFAULT_PEDESTRIANS,
            DEFAULT_PEDESTRIAN_INTERARRIVAL,
            DEFAULT_PEDESTRIAN_CROSSING,
        )
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub car_north: TrafficProfile,
    pub car_south: TrafficProfile,
    pub pedestrian: TrafficProfile,
    /// Multiplier applied to every duration (1.0 = real time)
    pub time_scale: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            car_north: TrafficProfile::cars(),
            car_south: TrafficProfile::cars(),
            pedestrian: TrafficProfile::pedestrians(),
            time_scale: DEFAULT_TIME_SCALE,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulationConfig {
    /// Profile for one class
    pub fn profile(&self, class: TrafficClass) -> &TrafficProfile {
        match class {
            TrafficClass::CarNorth => &self.car_north,
            TrafficClass::CarSouth => &self.car_south,
            TrafficClass::Pedestrian => &self.pedestrian,
        }
    }

    pub fn profile_mut(&mut self, class: TrafficClass) -> &mut TrafficProfile {
        match class {
            TrafficClass::CarNorth => &mut self.car_north,
            TrafficClass::CarSouth => &mut self.car_south,
            TrafficClass::Pedestrian => &mut self.pedestrian,
        }
    }

    /// Set the entity count of every class
    pub fn with_counts(mut self, cars: usize, pedestrians: usize) -> Self {
        self.car_north.count = cars;
        self.car_south.count = cars;
        self.pedestrian.count = pedestrians;
        self
    }

    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Total entities across all classes
    pub fn total_entities(&self) -> usize {
        TrafficClass::ALL
            .iter()
            .map(|class| self.profile(*class).count)
            .sum()
    }

    /// Apply the time scale to a simulated duration
    #[inline]
    pub fn scaled(&self, duration: Duration) -> Duration {
        duration.mul_f64(self.time_scale)
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Build from the environment
    ///
    /// Environment variables:
    /// - TUNNEL_CONFIG: JSON file to start from (default: built-in defaults)
    /// - TUNNEL_CARS: cars per direction
    /// - TUNNEL_PEDESTRIANS: pedestrian count
    /// - TUNNEL_TIME_SCALE: duration multiplier
    /// - TUNNEL_SEED: RNG seed
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = match std::env::var("TUNNEL_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Some(cars) = env_parse::<usize>("TUNNEL_CARS")? {
            config.car_north.count = cars;
            config.car_south.count = cars;
        }
        if let Some(pedestrians) = env_parse::<usize>("TUNNEL_PEDESTRIANS")? {
            config.pedestrian.count = pedestrians;
        }
        if let Some(scale) = env_parse::<f64>("TUNNEL_TIME_SCALE")? {
            config.time_scale = scale;
        }
        if let Some(seed) = env_parse::<u64>("TUNNEL_SEED")? {
            config.seed = seed;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot run
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "time_scale must be a finite non-negative number, got {}",
                self.time_scale
            )));
        }
        for class in TrafficClass::ALL {
            let profile = self.profile(class);
            if profile.max_crossing > MAX_CROSSING {
                return Err(ConfigError::Invalid(format!(
                    "{} max_crossing of {:?} exceeds one hour",
                    class, profile.max_crossing
                )));
            }
            if profile.mean_interarrival > MAX_MEAN_INTERARRIVAL {
                return Err(ConfigError::Invalid(format!(
                    "{} mean_interarrival of {:?} exceeds one hour",
                    class, profile.mean_interarrival
                )));
            }
            self.check_scaled(class, "max_crossing", profile.max_crossing, 1.0)?;
            // Longest gap the arrival stream can draw
            self.check_scaled(
                class,
                "mean_interarrival",
                profile.mean_interarrival,
                MAX_INTERARRIVAL_FACTOR,
            )?;
        }
        Ok(())
    }

    /// `duration * factor * time_scale` must still be a `Duration`
    fn check_scaled(
        &self,
        class: TrafficClass,
        field: &str,
        duration: Duration,
        factor: f64,
    ) -> ConfigResult<()> {
        let unscaled = duration.as_secs_f64() * factor;
        Duration::try_from_secs_f64(unscaled)
            .and_then(|_| Duration::try_from_secs_f64(unscaled * self.time_scale))
            .map(|_| ())
            .map_err(|_| {
                ConfigError::Invalid(format!(
                    "{} {} of {:?} overflows at time_scale {}",
                    class, field, duration, self.time_scale
                ))
            })
    }
}

/// Parse an optional environment variable
fn env_parse<T: std::str::FromStr>(key: &'static str) -> ConfigResult<Option<T>> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(None),
    }
}

/// Durations as integer milliseconds
mod millis {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
