//! Airtight room climate simulator.
//!
//! Temperature, CO2 and O2 drift minute by minute under occupant
//! respiration and process-equipment heat, optionally held at setpoints by
//! three independent PID loops.

pub mod cli;
/// TOML scenarios, presets and validation.
pub mod config;
pub mod error;
/// Per-tick sinks and trace export.
pub mod io;
pub mod reporting;
pub mod runner;
/// Room model, controllers and the simulation engine.
pub mod sim;
pub mod telemetry;
