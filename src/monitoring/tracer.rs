/*!
 * Structured Tracing
 * Logging setup and spans for simulation runs and crossing entities
 *
 * Features:
 * - Run ID generation for correlating every line of one simulation
 * - JSON-formatted logs for structured parsing
 * - Per-entity spans recording wait and crossing times
 */

use crate::core::types::TrafficClass;
use std::sync::Once;
use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Wait longer than this is reported as a warning
const SLOW_ADMISSION: Duration = Duration::from_secs(10);

static TEST_TRACING: Once = Once::new();

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - TUNNEL_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("TUNNEL_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        // JSON output for production/parsing
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        // Human-readable output for development
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_names(true)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Initialize tracing for tests, routed through the test writer
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_tracing() {
    TEST_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .with_thread_names(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Generate a unique ID for one simulation run
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering a whole simulation run
pub struct RunSpan {
    span: tracing::Span,
    start: Instant,
    run_id: String,
}

impl RunSpan {
    pub fn new(seed: u64) -> Self {
        let run_id = generate_run_id();
        let span = span!(
            Level::INFO,
            "run",
            run_id = %run_id,
            seed = seed,
            completed = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            run_id,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Handle to attach generator threads to this run
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    pub fn record_completed(&self, count: usize) {
        self.span.record("completed", count);
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for RunSpan {
    fn drop(&mut self) {
        let _entered = self.span.enter();
        info!(
            run_id = %self.run_id,
            duration_ms = self.start.elapsed().as_millis(),
            "simulation run finished"
        );
    }
}

/// Span for one entity's trip across the crossing
pub struct EntitySpan {
    span: tracing::Span,
    class: TrafficClass,
    id: usize,
    start: Instant,
}

impl EntitySpan {
    pub fn new(class: TrafficClass, id: usize) -> Self {
        let span = span!(
            Level::DEBUG,
            "entity",
            class = class.as_str(),
            id = id,
            wait_us = tracing::field::Empty,
            crossing_us = tracing::field::Empty,
        );

        Self {
            span,
            class,
            id,
            start: Instant::now(),
        }
    }

    /// Record how long the entity waited for admission
    pub fn record_wait(&self, wait: Duration) {
        self.span.record("wait_us", wait.as_micros() as u64);
        if wait > SLOW_ADMISSION {
            let _entered = self.span.enter();
            warn!(
                class = self.class.as_str(),
                id = self.id,
                wait_ms = wait.as_millis() as u64,
                slow = true,
                "slow admission"
            );
        }
    }

    pub fn record_crossing(&self, crossing: Duration) {
        self.span.record("crossing_us", crossing.as_micros() as u64);
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for EntitySpan {
    fn drop(&mut self) {
        let _entered = self.span.enter();
        debug!(
            class = self.class.as_str(),
            id = self.id,
            total_us = self.start.elapsed().as_micros() as u64,
            "entity finished"
        );
    }
}

/// Helper to create a run span
#[inline]
pub fn span_run(seed: u64) -> RunSpan {
    RunSpan::new(seed)
}

/// Helper to create an entity span
#[inline]
pub fn span_entity(class: TrafficClass, id: usize) -> EntitySpan {
    EntitySpan::new(class, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(generate_run_id(), generate_run_id());
    }

    #[test]
    fn test_spans_without_subscriber() {
        init_test_tracing();
        let run = span_run(7);
        assert_eq!(run.run_id().len(), 36);
        let _guard = run.enter();
        let entity = span_entity(TrafficClass::Pedestrian, 1);
        entity.record_wait(Duration::from_millis(1));
        entity.record_crossing(Duration::from_millis(2));
    }
}
