//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

use crate::sim::controller::{HvacController, LoopSettings, Setpoints};
use crate::sim::pid::PidGains;
use crate::sim::types::{EnvironmentState, MAX_PPM, RoomParams, SimConfig, TEMPERATURE_FLOOR_C};

/// Longest accepted run: ten years of one-minute ticks.
pub const MAX_HOURS_RUN: u32 = 24 * 365 * 10;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run length, seeding and control mode.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Room geometry, occupancy and initial conditions.
    #[serde(default)]
    pub room: RoomConfig,
    /// HVAC loop gains and setpoints.
    #[serde(default)]
    pub pid: PidConfig,
}

/// Whether the HVAC loops act on the room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Uncontrolled,
    Controlled,
}

impl ControlMode {
    /// Parses a mode name as accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "uncontrolled" => Some(Self::Uncontrolled),
            "controlled" => Some(Self::Controlled),
            _ => None,
        }
    }
}

/// Run length, seeding and control mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Simulated hours; the run has `hours_run * 60` ticks.
    pub hours_run: u32,
    /// Master random seed.
    pub seed: u64,
    /// `"uncontrolled"` or `"controlled"`.
    pub mode: ControlMode,
    /// Equipment heat output before the first tick (J).
    pub initial_thermal_j: f64,
    /// Timestamp of the initial state; the current local time when absent.
    pub start_time: Option<NaiveDateTime>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            hours_run: 1,
            seed: 42,
            mode: ControlMode::Uncontrolled,
            initial_thermal_j: 10_000.0,
            start_time: None,
        }
    }
}

/// Room geometry, occupancy and initial conditions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoomConfig {
    /// Initial air temperature (°C).
    pub init_temp_c: f64,
    /// Initial CO2 (ppm).
    pub init_co2_ppm: f64,
    /// Initial O2 (ppm).
    pub init_o2_ppm: f64,
    /// Room volume (m³, must be > 0).
    pub volume_m3: f64,
    /// Number of occupants.
    pub occupants: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            init_temp_c: 25.0,
            init_co2_ppm: 400.0,
            init_o2_ppm: 210_000.0,
            volume_m3: 50.0,
            occupants: 4,
        }
    }
}

/// Gains and setpoint for one loop.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoopConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub setpoint: f64,
}

impl LoopConfig {
    fn settings(&self) -> LoopSettings {
        LoopSettings {
            gains: PidGains::new(self.kp, self.ki, self.kd),
            setpoint: self.setpoint,
        }
    }
}

/// HVAC loop gains and setpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PidConfig {
    pub temperature: LoopConfig,
    pub co2: LoopConfig,
    pub o2: LoopConfig,
}

impl Default for PidConfig {
    fn default() -> Self {
        let sp = Setpoints::default();
        Self {
            temperature: LoopConfig {
                kp: 0.2,
                ki: 0.01,
                kd: 0.05,
                setpoint: sp.temperature,
            },
            co2: LoopConfig {
                kp: 0.5,
                ki: 0.02,
                kd: 0.1,
                setpoint: sp.co2,
            },
            o2: LoopConfig {
                kp: 0.5,
                ki: 0.02,
                kd: 0.1,
                setpoint: sp.o2,
            },
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"room.volume_m3"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: one hour, four occupants, no HVAC.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the HVAC preset: the baseline room under PID control for two hours.
    pub fn hvac() -> Self {
        Self {
            simulation: SimulationConfig {
                hours_run: 2,
                mode: ControlMode::Controlled,
                ..SimulationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the crowded preset: a small controlled room starting warm and stale.
    pub fn crowded() -> Self {
        Self {
            simulation: SimulationConfig {
                hours_run: 4,
                mode: ControlMode::Controlled,
                ..SimulationConfig::default()
            },
            room: RoomConfig {
                init_temp_c: 28.0,
                init_co2_ppm: 1_200.0,
                init_o2_ppm: 205_000.0,
                volume_m3: 20.0,
                occupants: 12,
            },
            pid: PidConfig::default(),
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "hvac", "crowded"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "hvac" => Ok(Self::hvac()),
            "crowded" => Ok(Self::crowded()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. A zero-hour run
    /// is valid and produces an empty trace.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.simulation.hours_run > MAX_HOURS_RUN {
            errors.push(ConfigError::new(
                "simulation.hours_run",
                format!("must be <= {MAX_HOURS_RUN}"),
            ));
        }

        let r = &self.room;
        if !(r.volume_m3.is_finite() && r.volume_m3 > 0.0) {
            errors.push(ConfigError::new("room.volume_m3", "must be finite and > 0"));
        }
        if !(r.init_temp_c.is_finite() && r.init_temp_c >= TEMPERATURE_FLOOR_C) {
            errors.push(ConfigError::new(
                "room.init_temp_c",
                format!("must be finite and >= {TEMPERATURE_FLOOR_C}"),
            ));
        }
        for (field, value) in [
            ("room.init_co2_ppm", r.init_co2_ppm),
            ("room.init_o2_ppm", r.init_o2_ppm),
        ] {
            if !(0.0..=MAX_PPM).contains(&value) {
                errors.push(ConfigError::new(field, "must be in [0, 1000000]"));
            }
        }

        if !self.simulation.initial_thermal_j.is_finite() {
            errors.push(ConfigError::new(
                "simulation.initial_thermal_j",
                "must be finite",
            ));
        }

        for (name, lc) in [
            ("temperature", &self.pid.temperature),
            ("co2", &self.pid.co2),
            ("o2", &self.pid.o2),
        ] {
            for (key, value) in [
                ("kp", lc.kp),
                ("ki", lc.ki),
                ("kd", lc.kd),
                ("setpoint", lc.setpoint),
            ] {
                if !value.is_finite() {
                    errors.push(ConfigError::new(format!("pid.{name}.{key}"), "must be finite"));
                }
            }
        }

        errors
    }

    /// Resolves the run configuration, stamping the initial state with
    /// `start_time` or the current local time.
    pub fn sim_config(&self) -> SimConfig {
        let s = &self.simulation;
        let r = &self.room;
        let initial = EnvironmentState {
            time: s.start_time.unwrap_or_else(|| Local::now().naive_local()),
            temperature: r.init_temp_c,
            co2: r.init_co2_ppm,
            o2: r.init_o2_ppm,
            thermal_output: s.initial_thermal_j,
        };
        SimConfig::new(
            s.hours_run,
            s.seed,
            initial,
            RoomParams::new(r.volume_m3, r.occupants),
        )
    }

    /// Builds the three HVAC loops from the `[pid]` section.
    pub fn hvac_controller(&self) -> HvacController {
        HvacController::new(
            self.pid.temperature.settings(),
            self.pid.co2.settings(),
            self.pid.o2.settings(),
        )
    }

    /// Setpoints used for reporting, whichever mode the run uses.
    pub fn setpoints(&self) -> Setpoints {
        Setpoints {
            temperature: self.pid.temperature.setpoint,
            co2: self.pid.co2.setpoint,
            o2: self.pid.o2.setpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn default_setpoints_match_reference() {
        let cfg = ScenarioConfig::baseline();
        assert_eq!(cfg.setpoints(), Setpoints::default());
        assert_eq!(cfg.hvac_controller().setpoints(), Setpoints::default());
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
hours_run = 3
seed = 7
mode = "controlled"
initial_thermal_j = 12000.0
start_time = "2025-06-01T08:00:00"

[room]
init_temp_c = 21.0
init_co2_ppm = 450.0
init_o2_ppm = 209000.0
volume_m3 = 80.0
occupants = 6

[pid.temperature]
kp = 1.0
ki = 0.1
kd = 0.0
setpoint = 22.0

[pid.co2]
kp = 0.3
ki = 0.0
kd = 0.0
setpoint = 500.0

[pid.o2]
kp = 0.3
ki = 0.0
kd = 0.0
setpoint = 209500.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.as_ref().err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.hours_run), Some(3));
        assert_eq!(
            cfg.as_ref().map(|c| c.simulation.mode),
            Some(ControlMode::Controlled)
        );
        assert_eq!(cfg.as_ref().map(|c| c.pid.temperature.setpoint), Some(22.0));

        let sim = cfg.as_ref().map(ScenarioConfig::sim_config);
        assert_eq!(sim.as_ref().map(SimConfig::total_ticks), Some(180));
        assert_eq!(
            sim.as_ref().map(|s| s.initial.time.to_string()),
            Some("2025-06-01 08:00:00".to_string())
        );
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[room]
volume_m3 = 10.0
windows = 2
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn invalid_mode_is_rejected_at_parse() {
        let toml = r#"
[simulation]
mode = "manual"
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.seed), Some(99));
        assert_eq!(cfg.as_ref().map(|c| c.simulation.hours_run), Some(1));
        assert_eq!(cfg.as_ref().map(|c| c.room.volume_m3), Some(50.0));
    }

    #[test]
    fn validation_catches_zero_volume() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.room.volume_m3 = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "room.volume_m3"));
    }

    #[test]
    fn validation_catches_out_of_range_gas() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.room.init_co2_ppm = -1.0;
        cfg.room.init_o2_ppm = 2_000_000.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "room.init_co2_ppm"));
        assert!(errors.iter().any(|e| e.field == "room.init_o2_ppm"));
    }

    #[test]
    fn validation_catches_temperature_below_floor() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.room.init_temp_c = -300.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "room.init_temp_c"));
    }

    #[test]
    fn validation_catches_non_finite_gain() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.pid.co2.ki = f64::NAN;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "pid.co2.ki"));
    }

    #[test]
    fn validation_catches_oversized_run() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.hours_run = u32::MAX;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.hours_run"));

        cfg.simulation.hours_run = MAX_HOURS_RUN;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn zero_hours_is_valid() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.hours_run = 0;
        assert!(cfg.validate().is_empty());
        assert_eq!(cfg.sim_config().total_ticks(), 0);
    }
}
