//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use airseal_sim::sim::controller::{HvacController, LoopSettings};
use airseal_sim::sim::pid::PidGains;
use airseal_sim::sim::types::{EnvironmentState, RoomParams, SimConfig};
use chrono::NaiveDateTime;

/// Fixed start time so traces compare equal across runs.
pub fn start_time() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2025-01-01 08:00:00", "%Y-%m-%d %H:%M:%S")
        .expect("fixed start time should parse")
}

/// Reference initial state (25 °C, 400 ppm CO2, 210000 ppm O2, 10 kJ).
pub fn initial_state() -> EnvironmentState {
    EnvironmentState {
        time: start_time(),
        temperature: 25.0,
        co2: 400.0,
        o2: 210_000.0,
        thermal_output: 10_000.0,
    }
}

/// Default run configuration (50 m³, 4 occupants).
pub fn default_config(hours: u32, seed: u64) -> SimConfig {
    SimConfig::new(hours, seed, initial_state(), RoomParams::new(50.0, 4))
}

/// Controller with the default gains and reference setpoints.
pub fn default_hvac() -> HvacController {
    HvacController::new(
        LoopSettings {
            gains: PidGains::new(0.2, 0.01, 0.05),
            setpoint: 25.0,
        },
        LoopSettings {
            gains: PidGains::new(0.5, 0.02, 0.1),
            setpoint: 400.0,
        },
        LoopSettings {
            gains: PidGains::new(0.5, 0.02, 0.1),
            setpoint: 210_000.0,
        },
    )
}

/// Fresh directory path under the system temp dir; not created.
pub fn unique_dir(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("airseal-{tag}-{}-{nanos}", std::process::id()))
}
