/*!
 * Simulation Tests
 * End-to-end runs of the three traffic generators against one monitor
 */

use one_lane_tunnel::simulation::{Entity, TrafficGenerator};
use one_lane_tunnel::{
    init_test_tracing, run_simulation, CrossingMonitor, Simulation, SimulationConfig,
    SimulationError, TrafficClass, TrafficProfile,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

/// Small, fast traffic mix: every class arrives throughout the run
fn quick_config(seed: u64) -> SimulationConfig {
    SimulationConfig::default()
        .with_counts(25, 8)
        .with_time_scale(0.004)
        .with_seed(seed)
}

#[test]
fn test_every_entity_completes() {
    init_test_tracing();
    let config = quick_config(11);
    let total = config.total_entities();

    let report = run_simulation(config).unwrap();

    assert_eq!(report.completed(), total);
    assert_eq!(report.exclusion_violations(), 0);
    assert!(report.is_clean());
    assert!(report.final_state.is_idle());
    assert_eq!(report.final_state.operations, (total * 2) as u64);
    for class in TrafficClass::ALL {
        let summary = report.class(class).unwrap();
        assert_eq!(summary.requested, summary.completed);
        assert_eq!(report.stats.admitted(class), summary.completed as u64);
        assert_eq!(report.stats.released(class), summary.completed as u64);
    }
}

#[test]
fn test_repeated_seeds_stay_clean() {
    init_test_tracing();
    for seed in [1, 2, 3] {
        let report = run_simulation(quick_config(seed)).unwrap();
        assert!(report.is_clean(), "seed {seed} produced {report:?}");
    }
}

#[test]
fn test_simultaneous_arrivals_batch_up() {
    init_test_tracing();
    // Zero gaps: every car of one direction shows up at once
    let mut config = SimulationConfig::default().with_counts(12, 0).with_seed(5);
    config.car_north = TrafficProfile::new(12, Duration::ZERO, Duration::from_millis(40));
    config.car_south = TrafficProfile::new(0, Duration::ZERO, Duration::ZERO);

    let report = run_simulation(config).unwrap();
    assert!(report.is_clean());
    assert!(report.stats.peak_active(TrafficClass::CarNorth) >= 2);
}

#[test]
fn test_shared_monitor_is_used() {
    init_test_tracing();
    let monitor = Arc::new(CrossingMonitor::new());
    let simulation = Simulation::with_monitor(quick_config(9).with_counts(5, 2), monitor.clone()).unwrap();

    let report = simulation.run().unwrap();
    assert_eq!(monitor.operations(), report.final_state.operations);
    assert_eq!(monitor.stats().admitted(TrafficClass::Pedestrian), 2);
}

#[test]
fn test_invalid_config_rejected() {
    let config = quick_config(1).with_time_scale(f64::NAN);
    assert!(matches!(
        Simulation::new(config),
        Err(SimulationError::Config(_))
    ));
}

#[test]
fn test_unscalable_config_fails_before_running() {
    let config = SimulationConfig::default()
        .with_counts(1, 0)
        .with_time_scale(1e30);
    assert!(matches!(
        run_simulation(config),
        Err(SimulationError::Config(_))
    ));
}

#[test]
fn test_single_generator_report() {
    init_test_tracing();
    let config = quick_config(21).with_counts(6, 0);
    let monitor = Arc::new(CrossingMonitor::new());
    let generator = TrafficGenerator::new(TrafficClass::CarSouth, &config, monitor.clone());
    assert_eq!(generator.class(), TrafficClass::CarSouth);

    let report = generator.run();
    assert_eq!(report.requested, 6);
    assert_eq!(report.completed, 6);
    assert_eq!(report.panicked, 0);
    assert!(report.max_wait >= report.mean_wait());
    assert!(monitor.snapshot().is_idle());
}

#[test]
fn test_entity_waits_for_occupied_crossing() {
    let monitor = Arc::new(CrossingMonitor::new());
    let permit = monitor.enter(TrafficClass::Pedestrian);

    let walker = {
        let monitor = monitor.clone();
        std::thread::spawn(move || {
            Entity::new(TrafficClass::CarNorth, 1, Duration::from_millis(1)).run(&monitor)
        })
    };
    std::thread::sleep(Duration::from_millis(30));
    permit.leave();

    let outcome = walker.join().unwrap();
    assert!(outcome.wait >= Duration::from_millis(20));
    assert!(!outcome.exclusion_violated);
}

#[test]
fn test_report_serializes_to_json() {
    let report = run_simulation(quick_config(4).with_counts(2, 1)).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["seed"], 4);
    assert_eq!(json["classes"]["pedestrian"]["completed"], 1);
    assert_eq!(json["final_state"]["turn"].is_string(), true);
}
