/*!
 * One-Lane Tunnel - Main Entry Point
 *
 * Runs the crossing simulation:
 * - Northbound and southbound car generators
 * - Pedestrian generator
 * - Shared crossing monitor
 */

use anyhow::{bail, Context};
use one_lane_tunnel::{init_tracing, Simulation, SimulationConfig, TrafficClass};
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    // Initialize structured tracing
    init_tracing();

    info!("One-lane tunnel simulation starting...");
    info!("================================================");

    let config = SimulationConfig::from_env().context("failed to load simulation config")?;
    for class in TrafficClass::ALL {
        let profile = config.profile(class);
        info!(
            class = class.as_str(),
            count = profile.count,
            mean_interarrival_ms = profile.mean_interarrival.as_millis() as u64,
            max_crossing_ms = profile.max_crossing.as_millis() as u64,
            "traffic profile"
        );
    }
    info!(time_scale = config.time_scale, seed = config.seed, "run settings");

    let simulation = Simulation::new(config).context("invalid simulation config")?;
    let report = simulation.run().context("simulation failed")?;

    for (class, summary) in &report.classes {
        info!(
            class = class.as_str(),
            completed = summary.completed,
            requested = summary.requested,
            mean_wait_ms = summary.mean_wait().as_millis() as u64,
            max_wait_ms = summary.max_wait.as_millis() as u64,
            peak_active = report.stats.peak_active(*class),
            "class summary"
        );
    }
    info!("{}", simulation.monitor());

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialize report")?
    );

    if !report.is_clean() {
        warn!(
            violations = report.exclusion_violations(),
            final_state = ?report.final_state,
            "run finished with inconsistencies"
        );
        bail!("simulation report is not clean");
    }

    info!("Simulation finished cleanly");
    Ok(())
}
