/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 *
 * The crossing monitor itself has no recoverable errors: misuse of the exit
 * protocol panics. These types cover the outer layers only.
 */

use crate::core::types::TrafficClass;
use miette::Diagnostic;
use thiserror::Error;

/// Unknown traffic class name
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("Unknown traffic class '{0}'")]
#[diagnostic(
    code(traffic::unknown_class),
    help("Valid classes: car_north, car_south, pedestrian")
)]
pub struct ClassParseError(pub String);

/// Configuration loading and validation errors
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(
        code(config::io),
        help("Check that TUNNEL_CONFIG points to a readable file.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    #[diagnostic(
        code(config::parse),
        help("The config file must be a JSON object matching SimulationConfig.")
    )]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value '{value}' for {key}")]
    #[diagnostic(code(config::invalid_value))]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(config::invalid))]
    Invalid(String),
}

/// Simulation driver errors
#[derive(Error, Debug, Diagnostic)]
pub enum SimulationError {
    #[error("Traffic generator for {0} panicked")]
    #[diagnostic(
        code(simulation::generator_panicked),
        help("A panic inside a generator usually means an entity broke the crossing contract.")
    )]
    GeneratorPanicked(TrafficClass),

    #[error("Failed to start traffic generator for {class}: {source}")]
    #[diagnostic(code(simulation::generator_spawn))]
    GeneratorSpawn {
        class: TrafficClass,
        #[source]
        source: std::io::Error,
    },

    #[error("{count} {class} entities panicked while crossing")]
    #[diagnostic(code(simulation::entity_panicked))]
    EntityPanicked { class: TrafficClass, count: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result alias for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;
