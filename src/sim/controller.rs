//! HVAC controllers closing the loop on temperature, CO2 and O2.

use super::pid::{PidController, PidGains};
use super::types::{ControlOutput, EnvironmentState};

/// Fixed PID timestep: one tick.
pub const CONTROL_DT: f64 = 1.0;

/// Decides the HVAC correction for the next tick from the latest room state.
///
/// Returning `None` means the room runs uncontrolled for that tick.
pub trait Controller {
    fn control(&mut self, state: &EnvironmentState) -> Option<ControlOutput>;

    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;
}

/// Leaves the room to drift.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoControl;

impl Controller for NoControl {
    fn control(&mut self, _state: &EnvironmentState) -> Option<ControlOutput> {
        None
    }

    fn name(&self) -> &'static str {
        "uncontrolled"
    }
}

/// Target values for the three controlled variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setpoints {
    /// Temperature (°C).
    pub temperature: f64,
    /// CO2 (ppm).
    pub co2: f64,
    /// O2 (ppm).
    pub o2: f64,
}

impl Default for Setpoints {
    /// Reference cleanroom targets: 25 °C, 400 ppm CO2, 210000 ppm O2.
    fn default() -> Self {
        Self {
            temperature: 25.0,
            co2: 400.0,
            o2: 210_000.0,
        }
    }
}

/// Gains and setpoint for one HVAC loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    pub gains: PidGains,
    pub setpoint: f64,
}

/// Three independent PID loops, one per controlled variable.
///
/// Each loop sees only its own measurement; there is no coupling between
/// loops.
#[derive(Debug, Clone)]
pub struct HvacController {
    temperature: PidController,
    co2: PidController,
    o2: PidController,
}

impl HvacController {
    /// Creates the three loops.
    ///
    /// # Arguments
    ///
    /// * `temperature` - Temperature loop (°C)
    /// * `co2` - CO2 loop (ppm)
    /// * `o2` - O2 loop (ppm)
    pub fn new(temperature: LoopSettings, co2: LoopSettings, o2: LoopSettings) -> Self {
        Self {
            temperature: PidController::with_gains(temperature.gains, temperature.setpoint),
            co2: PidController::with_gains(co2.gains, co2.setpoint),
            o2: PidController::with_gains(o2.gains, o2.setpoint),
        }
    }

    pub fn setpoints(&self) -> Setpoints {
        Setpoints {
            temperature: self.temperature.setpoint(),
            co2: self.co2.setpoint(),
            o2: self.o2.setpoint(),
        }
    }

    pub fn temperature(&self) -> &PidController {
        &self.temperature
    }

    pub fn co2(&self) -> &PidController {
        &self.co2
    }

    pub fn o2(&self) -> &PidController {
        &self.o2
    }
}

impl Controller for HvacController {
    fn control(&mut self, state: &EnvironmentState) -> Option<ControlOutput> {
        Some(ControlOutput {
            temperature_adjustment: self.temperature.update(state.temperature, CONTROL_DT),
            co2_adjustment: self.co2.update(state.co2, CONTROL_DT),
            o2_adjustment: self.o2.update(state.o2, CONTROL_DT),
        })
    }

    fn name(&self) -> &'static str {
        "pid"
    }
}
