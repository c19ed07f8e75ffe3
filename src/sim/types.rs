//! Core simulation types: room state, control corrections, and derived room parameters.

use std::fmt;

use chrono::NaiveDateTime;

/// Air density at room conditions (kg/m³).
pub const AIR_DENSITY_KG_M3: f64 = 1.225;
/// Specific heat capacity of air (J/kg°C).
pub const AIR_SPECIFIC_HEAT_J_KG_C: f64 = 1005.0;
/// Temperature at which respiration runs at its baseline rate (°C).
pub const REFERENCE_TEMPERATURE_C: f64 = 25.0;
/// Lowest temperature the model will report (°C).
pub const TEMPERATURE_FLOOR_C: f64 = -273.0;
/// Upper bound for any gas concentration (ppm).
pub const MAX_PPM: f64 = 1_000_000.0;
/// Minutes advanced by a single tick.
pub const TICK_MINUTES: i64 = 1;
/// Ticks per simulated hour.
pub const TICKS_PER_HOUR: usize = 60;

/// CO2 exhaled per person (L/min).
pub const CO2_GENERATION_L_PER_MIN: f64 = 0.005 * 60.0;
/// O2 consumed per person (L/min).
pub const O2_CONSUMPTION_L_PER_MIN: f64 = 6.0 * 0.05;

/// Snapshot of the room at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentState {
    /// Simulated wall-clock time.
    pub time: NaiveDateTime,
    /// Air temperature (°C).
    pub temperature: f64,
    /// CO2 concentration (ppm).
    pub co2: f64,
    /// O2 concentration (ppm).
    pub o2: f64,
    /// Heat released by process equipment during the last tick (J).
    pub thermal_output: f64,
}

impl fmt::Display for EnvironmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | temp={:>7.2} °C  co2={:>9.1} ppm  o2={:>9.1} ppm | thermal={:>9.0} J",
            self.time.format("%Y-%m-%d %H:%M"),
            self.temperature,
            self.co2,
            self.o2,
            self.thermal_output,
        )
    }
}

/// Corrections applied by the HVAC loops during one controlled tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlOutput {
    /// Added directly to the temperature change (°C).
    pub temperature_adjustment: f64,
    /// Added to CO2 after respiration (ppm).
    pub co2_adjustment: f64,
    /// Added to O2 after respiration (ppm).
    pub o2_adjustment: f64,
}

/// Room geometry and occupancy, with the per-tick rates derived from them.
///
/// Respiration rates are converted from L/min to ppm/min once here so the
/// step functions never repeat the conversion.
///
/// # Examples
///
/// ```
/// use airseal_sim::sim::types::RoomParams;
///
/// let room = RoomParams::new(50.0, 4);
/// assert!((room.air_mass_kg - 61.25).abs() < 1e-9);
/// assert!((room.co2_rate_ppm_per_min - 6.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomParams {
    /// Room volume (m³).
    pub volume_m3: f64,
    /// Number of people breathing in the room.
    pub occupants: u32,
    /// Mass of air in the room (kg).
    pub air_mass_kg: f64,
    /// Baseline CO2 generation per person (ppm/min).
    pub co2_rate_ppm_per_min: f64,
    /// Baseline O2 consumption per person (ppm/min).
    pub o2_rate_ppm_per_min: f64,
}

impl RoomParams {
    /// Derives room parameters from volume and occupancy.
    ///
    /// # Arguments
    ///
    /// * `volume_m3` - Room volume in cubic metres (expected > 0)
    /// * `occupants` - Number of occupants
    pub fn new(volume_m3: f64, occupants: u32) -> Self {
        Self {
            volume_m3,
            occupants,
            air_mass_kg: volume_m3 * AIR_DENSITY_KG_M3,
            co2_rate_ppm_per_min: litres_per_min_to_ppm(CO2_GENERATION_L_PER_MIN, volume_m3),
            o2_rate_ppm_per_min: litres_per_min_to_ppm(O2_CONSUMPTION_L_PER_MIN, volume_m3),
        }
    }

    /// Joules needed to raise the room air by one degree.
    pub fn heat_capacity_j_per_c(&self) -> f64 {
        self.air_mass_kg * AIR_SPECIFIC_HEAT_J_KG_C
    }
}

/// Centralized run configuration handed to the engine.
///
/// # Examples
///
/// ```
/// use airseal_sim::sim::types::{EnvironmentState, RoomParams, SimConfig};
///
/// let initial = EnvironmentState {
///     time: chrono::NaiveDateTime::default(),
///     temperature: 25.0,
///     co2: 400.0,
///     o2: 210_000.0,
///     thermal_output: 10_000.0,
/// };
/// let cfg = SimConfig::new(2, 42, initial, RoomParams::new(50.0, 4));
/// assert_eq!(cfg.total_ticks(), 120);
/// ```
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Simulated duration in hours.
    pub hours_run: u32,
    /// Master random seed.
    pub seed: u64,
    /// State the run starts from (not part of the trace).
    pub initial: EnvironmentState,
    /// Room geometry and occupancy.
    pub room: RoomParams,
}

impl SimConfig {
    pub fn new(hours_run: u32, seed: u64, initial: EnvironmentState, room: RoomParams) -> Self {
        Self {
            hours_run,
            seed,
            initial,
            room,
        }
    }

    /// Number of one-minute ticks in the run.
    pub fn total_ticks(&self) -> usize {
        self.hours_run as usize * TICKS_PER_HOUR
    }
}

fn litres_per_min_to_ppm(litres_per_min: f64, volume_m3: f64) -> f64 {
    (litres_per_min / 1000.0) / volume_m3 * 1e6
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn room_params_derive_mass_and_rates() {
        let room = RoomParams::new(100.0, 2);
        assert!((room.air_mass_kg - 122.5).abs() < 1e-9);
        assert!((room.heat_capacity_j_per_c() - 123_112.5).abs() < 1e-6);
        assert!((room.co2_rate_ppm_per_min - 3.0).abs() < 1e-9);
        assert!((room.o2_rate_ppm_per_min - 3.0).abs() < 1e-9);
        assert_eq!(room.occupants, 2);
    }

    #[test]
    fn smaller_rooms_concentrate_faster() {
        let small = RoomParams::new(10.0, 1);
        let large = RoomParams::new(1000.0, 1);
        assert!(small.co2_rate_ppm_per_min > large.co2_rate_ppm_per_min);
    }

    #[test]
    fn zero_hours_means_zero_ticks() {
        let initial = EnvironmentState {
            time: NaiveDateTime::default(),
            temperature: 25.0,
            co2: 400.0,
            o2: 210_000.0,
            thermal_output: 0.0,
        };
        let cfg = SimConfig::new(0, 1, initial, RoomParams::new(50.0, 1));
        assert_eq!(cfg.total_ticks(), 0);
    }

    #[test]
    fn state_display_does_not_panic() {
        let state = EnvironmentState {
            time: NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .unwrap_or_default(),
            temperature: 21.5,
            co2: 400.0,
            o2: 210_000.0,
            thermal_output: 10_000.0,
        };
        let s = format!("{state}");
        assert!(s.contains("2025-01-01 12:00"));
    }
}
