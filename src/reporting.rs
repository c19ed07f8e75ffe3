use std::io::{self, Write};

use crate::sim::summary::TraceSummary;
use crate::sim::types::EnvironmentState;

/// Writes one line per tick, numbered from 1.
pub fn write_trace<W: Write>(writer: &mut W, trace: &[EnvironmentState]) -> io::Result<()> {
    for (i, state) in trace.iter().enumerate() {
        writeln!(writer, "[{:>5}] {state}", i + 1)?;
    }
    Ok(())
}

pub fn print_trace(trace: &[EnvironmentState]) {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    // A closed stdout (e.g. piped into `head`) is not an error for the run.
    let _ = write_trace(&mut lock, trace);
}

pub fn print_summary(controller: &str, summary: &TraceSummary) {
    println!("\nController: {controller}");
    println!("{summary}");
}
