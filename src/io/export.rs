//! CSV export for a completed simulation trace.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{SimError, SimResult};
use crate::sim::types::EnvironmentState;

/// Column header for CSV trace export.
const HEADER: &str = "tick,time,temperature_c,co2_ppm,o2_ppm,thermal_j";

/// Exports a trace to a CSV file at the given path.
///
/// Writes a header row followed by one row per tick, numbered from 1.
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns `SimError::Io` if the file cannot be created, or `SimError::Csv`
/// if writing fails.
pub fn export_csv(trace: &[EnvironmentState], path: &Path) -> SimResult<()> {
    let file = File::create(path).map_err(|e| SimError::io(path, e))?;
    let buf = io::BufWriter::new(file);
    write_csv(trace, buf)
}

/// Writes a trace as CSV to any writer.
///
/// # Errors
///
/// Returns `SimError::Csv` if writing fails.
pub fn write_csv(trace: &[EnvironmentState], writer: impl Write) -> SimResult<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for (i, s) in trace.iter().enumerate() {
        wtr.write_record(&[
            (i + 1).to_string(),
            s.time.format("%Y-%m-%dT%H:%M:%S").to_string(),
            format!("{:.4}", s.temperature),
            format!("{:.4}", s.co2),
            format!("{:.4}", s.o2),
            format!("{:.1}", s.thermal_output),
        ])?;
    }

    wtr.flush().map_err(|e| SimError::Csv(e.into()))?;
    Ok(())
}
