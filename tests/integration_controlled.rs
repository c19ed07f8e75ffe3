//! Integration tests for rooms under PID control.

mod common;

use airseal_sim::sim::controller::{HvacController, LoopSettings, NoControl, Setpoints};
use airseal_sim::sim::engine::Engine;
use airseal_sim::sim::pid::PidGains;
use airseal_sim::sim::summary::TraceSummary;

#[test]
fn control_reduces_temperature_deviation() {
    let free = Engine::new(common::default_config(2, 42), NoControl).run();
    let held = Engine::new(common::default_config(2, 42), common::default_hvac()).run();

    let sp = Setpoints::default();
    let free_summary = TraceSummary::from_trace(&free, &sp);
    let held_summary = TraceSummary::from_trace(&held, &sp);
    assert!(
        held_summary.temperature_mae < free_summary.temperature_mae,
        "controlled MAE {:.3} should beat uncontrolled {:.3}",
        held_summary.temperature_mae,
        free_summary.temperature_mae
    );
    assert!(held_summary.co2_mae < free_summary.co2_mae);
}

#[test]
fn controlled_run_is_deterministic() {
    let a = Engine::new(common::default_config(1, 3), common::default_hvac()).run();
    let b = Engine::new(common::default_config(1, 3), common::default_hvac()).run();
    assert_eq!(a, b);
}

#[test]
fn first_tick_control_comes_from_initial_state() {
    let mut engine = Engine::new(common::default_config(1, 42), common::default_hvac());
    let mut start = common::initial_state();
    start.temperature = 20.0;
    engine.step(&start);
    assert_eq!(engine.controller().temperature().previous_error(), 5.0);
    assert_eq!(engine.controller().temperature().integral(), 5.0);
}

#[test]
fn controlled_gas_is_not_reclamped() {
    // A setpoint far below zero pushes CO2 negative after respiration.
    let hvac = HvacController::new(
        LoopSettings {
            gains: PidGains::new(0.0, 0.0, 0.0),
            setpoint: 25.0,
        },
        LoopSettings {
            gains: PidGains::new(1.0, 0.0, 0.0),
            setpoint: -1_000_000.0,
        },
        LoopSettings {
            gains: PidGains::new(0.0, 0.0, 0.0),
            setpoint: 210_000.0,
        },
    );
    let mut engine = Engine::new(common::default_config(1, 42), hvac);
    let trace = engine.run();
    assert!(trace[0].co2 < 0.0, "co2 was {}", trace[0].co2);
    let summary = TraceSummary::from_trace(&trace, &Setpoints::default());
    assert!(summary.out_of_range_ticks > 0);
}

#[test]
fn zero_gains_match_uncontrolled_run() {
    let zero = LoopSettings {
        gains: PidGains::new(0.0, 0.0, 0.0),
        setpoint: 0.0,
    };
    let hvac = HvacController::new(zero, zero, zero);
    let held = Engine::new(common::default_config(1, 11), hvac).run();
    let free = Engine::new(common::default_config(1, 11), NoControl).run();
    assert_eq!(held, free);
}
