//! Simulation engine driving the room model under a controller.

use tracing::{debug, info};

use crate::error::{SimError, SimResult};
use crate::io::sink::ExportSink;

use super::clock::{Clock, RunPhase};
use super::controller::Controller;
use super::room::RoomModel;
use super::types::{EnvironmentState, SimConfig};

/// Simulation engine owning the room model, the controller and the run clock.
///
/// Generic over `C: Controller` for static dispatch. Each tick the
/// controller sees the previous state, then the room advances from that
/// same state. On the first tick the previous state is the configured
/// initial state, so the first control decision and the first step both
/// start from it.
///
/// An engine performs a single run; once complete, further calls to
/// [`run`](Self::run) return an empty trace.
pub struct Engine<C: Controller> {
    config: SimConfig,
    model: RoomModel,
    controller: C,
    clock: Clock,
}

impl<C: Controller> Engine<C> {
    /// Creates a new engine.
    ///
    /// # Arguments
    ///
    /// * `config` - Run length, seed, initial state and room
    /// * `controller` - HVAC controller, or `NoControl` for a free-running room
    pub fn new(config: SimConfig, controller: C) -> Self {
        let model = RoomModel::new(config.room, config.seed);
        let clock = Clock::new(config.total_ticks());
        Self {
            config,
            model,
            controller,
            clock,
        }
    }

    /// Advances one tick from `previous` and returns the new state.
    pub fn step(&mut self, previous: &EnvironmentState) -> EnvironmentState {
        match self.controller.control(previous) {
            Some(control) => self.model.step_with_control(previous, &control),
            None => self.model.step_no_control(previous),
        }
    }

    /// Runs every remaining tick and returns the trace.
    ///
    /// The initial state is not part of the trace; a zero-hour run returns
    /// an empty vector.
    pub fn run(&mut self) -> Vec<EnvironmentState> {
        self.log_start();
        let mut trace = Vec::new();
        let mut state = self.config.initial;
        while let Some(tick) = self.clock.tick() {
            state = self.step(&state);
            log_tick(tick, &state);
            trace.push(state);
        }
        self.log_finish(&trace);
        trace
    }

    /// Runs every remaining tick, emitting each state to `sink` as it is produced.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Export` carrying the failing tick (1-based) if the
    /// sink rejects a state. The run stops there.
    pub fn run_with_sink<S: ExportSink>(
        &mut self,
        sink: &mut S,
    ) -> SimResult<Vec<EnvironmentState>> {
        self.log_start();
        let mut trace = Vec::new();
        let mut state = self.config.initial;
        while let Some(tick) = self.clock.tick() {
            state = self.step(&state);
            log_tick(tick, &state);
            sink.emit(tick + 1, &state).map_err(|e| SimError::Export {
                tick: tick + 1,
                source: Box::new(e),
            })?;
            trace.push(state);
        }
        self.log_finish(&trace);
        Ok(trace)
    }

    pub fn phase(&self) -> RunPhase {
        self.clock.phase()
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn log_start(&self) {
        info!(
            controller = self.controller.name(),
            hours = self.config.hours_run,
            ticks = self.clock.total() - self.clock.elapsed(),
            seed = self.config.seed,
            "simulation started"
        );
    }

    fn log_finish(&self, trace: &[EnvironmentState]) {
        match trace.last() {
            Some(last) => info!(
                ticks = trace.len(),
                temperature = last.temperature,
                co2 = last.co2,
                o2 = last.o2,
                "simulation complete"
            ),
            None => info!("simulation complete with no ticks"),
        }
    }
}

fn log_tick(tick: usize, state: &EnvironmentState) {
    debug!(
        tick = tick + 1,
        temperature = state.temperature,
        co2 = state.co2,
        o2 = state.o2,
        thermal = state.thermal_output,
        "tick"
    );
}
