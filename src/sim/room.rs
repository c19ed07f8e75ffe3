//! Mass and energy balance model of an airtight room.

use chrono::Duration;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::trace;

use super::types::{
    ControlOutput, EnvironmentState, MAX_PPM, REFERENCE_TEMPERATURE_C, RoomParams,
    TEMPERATURE_FLOOR_C, TICK_MINUTES,
};

/// Probability that a tick carries a large equipment heat shock.
const SHOCK_PROBABILITY: f64 = 0.01;
/// Bound of the uniform heat shock (J).
const SHOCK_RANGE_J: i32 = 50_000;
/// Bound of the uniform per-tick equipment noise (J).
const NOISE_RANGE_J: i32 = 5_000;

/// Stochastic room model advancing an [`EnvironmentState`] one minute at a time.
///
/// Owns its random source so that a given seed reproduces a run exactly.
/// Apart from the RNG the model is stateless: every step is a function of
/// the state handed in.
///
/// # Examples
///
/// ```
/// use airseal_sim::sim::room::RoomModel;
/// use airseal_sim::sim::types::{EnvironmentState, RoomParams};
///
/// let mut model = RoomModel::new(RoomParams::new(50.0, 4), 42);
/// let start = EnvironmentState {
///     time: chrono::NaiveDateTime::default(),
///     temperature: 25.0,
///     co2: 400.0,
///     o2: 210_000.0,
///     thermal_output: 10_000.0,
/// };
/// let next = model.step_no_control(&start);
/// assert_eq!(next.time - start.time, chrono::Duration::minutes(1));
/// ```
#[derive(Debug, Clone)]
pub struct RoomModel {
    room: RoomParams,
    rng: StdRng,
}

impl RoomModel {
    /// Creates a model for the given room, seeding its RNG.
    pub fn new(room: RoomParams, seed: u64) -> Self {
        Self {
            room,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn room(&self) -> &RoomParams {
        &self.room
    }

    /// Perturbs the equipment heat output for one tick.
    ///
    /// With 1 % probability adds a shock drawn from `[-50000, 50000]`, then
    /// always adds noise drawn from `[-5000, 5000]`. Both are whole joules.
    pub fn simulate_process_equipment(&mut self, thermal: f64) -> f64 {
        let mut thermal = thermal;

        if self.rng.random::<f64>() < SHOCK_PROBABILITY {
            let shock = self.rng.random_range(-SHOCK_RANGE_J..=SHOCK_RANGE_J);
            trace!(shock, "equipment heat shock");
            thermal += f64::from(shock);
        }

        thermal += f64::from(self.rng.random_range(-NOISE_RANGE_J..=NOISE_RANGE_J));
        thermal
    }

    /// Applies one minute of occupant respiration to CO2 and O2.
    ///
    /// Each gas's per-person rate gets a jitter of up to ±10 % (in 1/1000
    /// ppm steps) and is then scaled by `|temperature / 25|`. Both results
    /// are clamped to `[0, 1_000_000]` ppm.
    ///
    /// # Returns
    ///
    /// `(co2, o2)` after respiration.
    pub fn simulate_breathing_changes(
        &mut self,
        co2: f64,
        o2: f64,
        temperature: f64,
    ) -> (f64, f64) {
        let occupants = f64::from(self.room.occupants);
        let temp_scale = (temperature / REFERENCE_TEMPERATURE_C).abs();

        let co2_rate = self.jittered_rate(self.room.co2_rate_ppm_per_min) * temp_scale;
        let o2_rate = self.jittered_rate(self.room.o2_rate_ppm_per_min) * temp_scale;

        let co2_raw = co2 + co2_rate * occupants;
        let o2_raw = o2 - o2_rate * occupants;

        (clamp_ppm(co2_raw, "co2"), clamp_ppm(o2_raw, "o2"))
    }

    /// Advances the room one tick with no HVAC input.
    pub fn step_no_control(&mut self, state: &EnvironmentState) -> EnvironmentState {
        self.advance(state, None)
    }

    /// Advances the room one tick with HVAC corrections applied.
    ///
    /// The temperature adjustment enters the energy balance before the
    /// -273 °C floor. The gas adjustments are added after respiration has
    /// been clamped and are not clamped again, so controlled CO2 and O2 may
    /// leave `[0, 1_000_000]`.
    pub fn step_with_control(
        &mut self,
        state: &EnvironmentState,
        control: &ControlOutput,
    ) -> EnvironmentState {
        self.advance(state, Some(control))
    }

    fn advance(
        &mut self,
        state: &EnvironmentState,
        control: Option<&ControlOutput>,
    ) -> EnvironmentState {
        let time = state.time + Duration::minutes(TICK_MINUTES);

        let thermal = self.simulate_process_equipment(state.thermal_output);
        let mut delta_t = thermal / self.room.heat_capacity_j_per_c();
        if let Some(c) = control {
            delta_t += c.temperature_adjustment;
        }

        let raw_temperature = state.temperature + delta_t;
        let temperature = raw_temperature.max(TEMPERATURE_FLOOR_C);
        if temperature != raw_temperature {
            trace!(raw_temperature, "temperature clamped to floor");
        }

        let (mut co2, mut o2) = self.simulate_breathing_changes(state.co2, state.o2, temperature);
        if let Some(c) = control {
            co2 += c.co2_adjustment;
            o2 += c.o2_adjustment;
        }

        EnvironmentState {
            time,
            temperature,
            co2,
            o2,
            thermal_output: thermal,
        }
    }

    fn jittered_rate(&mut self, rate: f64) -> f64 {
        // Truncation matches the integer jitter span.
        let diff = (rate * 100.0) as i64;
        if diff <= 0 {
            return rate;
        }
        let jitter = self.rng.random_range(-diff..diff);
        rate + jitter as f64 / 1000.0
    }
}

fn clamp_ppm(value: f64, gas: &'static str) -> f64 {
    let clamped = value.clamp(0.0, MAX_PPM);
    if clamped != value {
        trace!(gas, value, "concentration clamped");
    }
    clamped
}
