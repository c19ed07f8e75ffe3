//! Post-hoc statistics computed from a completed trace.

use std::fmt;

use super::controller::Setpoints;
use super::types::{EnvironmentState, MAX_PPM};

/// Min, mean, max and final value of one series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeriesStats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub last: f64,
}

impl SeriesStats {
    fn from_values(values: impl Iterator<Item = f64>) -> Self {
        let mut n = 0_usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut last = 0.0;
        for v in values {
            n += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
            last = v;
        }
        if n == 0 {
            return Self::default();
        }
        Self {
            min,
            mean: sum / n as f64,
            max,
            last,
        }
    }
}

/// Aggregate view of a run, derived from `&[EnvironmentState]`.
///
/// Deviations are mean absolute distances from the given setpoints, so the
/// same report compares controlled and uncontrolled runs.
#[derive(Debug, Clone)]
pub struct TraceSummary {
    /// Number of ticks in the trace.
    pub ticks: usize,
    pub temperature: SeriesStats,
    pub co2: SeriesStats,
    pub o2: SeriesStats,
    pub thermal: SeriesStats,
    /// Mean |temperature - setpoint| (°C).
    pub temperature_mae: f64,
    /// Mean |co2 - setpoint| (ppm).
    pub co2_mae: f64,
    /// Mean |o2 - setpoint| (ppm).
    pub o2_mae: f64,
    /// Ticks where CO2 or O2 left `[0, 1_000_000]` ppm.
    pub out_of_range_ticks: usize,
}

impl TraceSummary {
    /// Computes the summary of a trace against `setpoints`.
    pub fn from_trace(trace: &[EnvironmentState], setpoints: &Setpoints) -> Self {
        let in_range = |v: f64| (0.0..=MAX_PPM).contains(&v);

        Self {
            ticks: trace.len(),
            temperature: SeriesStats::from_values(trace.iter().map(|s| s.temperature)),
            co2: SeriesStats::from_values(trace.iter().map(|s| s.co2)),
            o2: SeriesStats::from_values(trace.iter().map(|s| s.o2)),
            thermal: SeriesStats::from_values(trace.iter().map(|s| s.thermal_output)),
            temperature_mae: mean_abs_deviation(trace, |s| s.temperature, setpoints.temperature),
            co2_mae: mean_abs_deviation(trace, |s| s.co2, setpoints.co2),
            o2_mae: mean_abs_deviation(trace, |s| s.o2, setpoints.o2),
            out_of_range_ticks: trace
                .iter()
                .filter(|s| !in_range(s.co2) || !in_range(s.o2))
                .count(),
        }
    }
}

impl fmt::Display for TraceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ({} ticks) ---", self.ticks)?;
        write_row(f, "Temperature", &self.temperature, "°C")?;
        write_row(f, "CO2", &self.co2, "ppm")?;
        write_row(f, "O2", &self.o2, "ppm")?;
        write_row(f, "Thermal", &self.thermal, "J")?;
        writeln!(f, "Temperature MAE:     {:.3} °C", self.temperature_mae)?;
        writeln!(f, "CO2 MAE:             {:.1} ppm", self.co2_mae)?;
        writeln!(f, "O2 MAE:              {:.1} ppm", self.o2_mae)?;
        write!(f, "Out-of-range ticks:  {}", self.out_of_range_ticks)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, label: &str, s: &SeriesStats, unit: &str) -> fmt::Result {
    writeln!(
        f,
        "{label:<13} min={:>11.2}  mean={:>11.2}  max={:>11.2}  final={:>11.2} {unit}",
        s.min, s.mean, s.max, s.last
    )
}

fn mean_abs_deviation(
    trace: &[EnvironmentState],
    value: impl Fn(&EnvironmentState) -> f64,
    target: f64,
) -> f64 {
    if trace.is_empty() {
        return 0.0;
    }
    trace.iter().map(|s| (value(s) - target).abs()).sum::<f64>() / trace.len() as f64
}
