/*!
 * Monitoring
 * Structured logging for simulation runs
 */

mod tracer;

pub use tracer::{
    generate_run_id, init_test_tracing, init_tracing, span_entity, span_run, EntitySpan, RunSpan,
};
