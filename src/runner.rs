//! Builds an engine from a scenario and drives one complete run.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{ControlMode, ScenarioConfig};
use crate::error::SimResult;
use crate::io::sink::{ExportSink, JsonDirSink, NullSink, clear_json_dir, verify_json_dir};
use crate::sim::controller::{Controller, NoControl};
use crate::sim::engine::Engine;
use crate::sim::summary::TraceSummary;
use crate::sim::types::{EnvironmentState, SimConfig};

/// Where per-tick records go during a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Directory for numbered JSON records; none means records are not written.
    pub json_dir: Option<PathBuf>,
    /// Leave the JSON records on disk after the run.
    pub keep_json: bool,
}

/// Everything a caller needs after a run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Controller name as reported by [`Controller::name`].
    pub controller: &'static str,
    pub trace: Vec<EnvironmentState>,
    pub summary: TraceSummary,
    /// Records read back from the JSON directory (one per tick), zero when
    /// none was used.
    pub json_records: usize,
}

/// Runs `cfg` to completion.
///
/// When a JSON directory is configured, records left there by an earlier
/// run are removed first. Every tick is then written as it is produced, the
/// records are read back to confirm exactly one per tick, and the directory
/// is cleared unless `keep_json` is set. Clearing also happens when the run
/// fails.
///
/// # Errors
///
/// Returns the first I/O or serialization failure from the JSON sink, or
/// `SimError::RecordCount` if the reloaded records do not match the trace.
pub fn run_scenario(cfg: &ScenarioConfig, opts: &RunOptions) -> SimResult<RunOutcome> {
    let (controller, trace, json_records) = match &opts.json_dir {
        Some(dir) => {
            let stale = clear_json_dir(dir)?;
            if stale > 0 {
                info!(dir = %dir.display(), stale, "removed stale tick records");
            }
            let result = run_recorded(cfg, dir);
            if !opts.keep_json {
                match clear_json_dir(dir) {
                    Ok(removed) => {
                        info!(dir = %dir.display(), removed, "tick records cleared");
                    }
                    Err(e) if result.is_err() => {
                        warn!(dir = %dir.display(), error = %e, "could not clear tick records");
                    }
                    Err(e) => return Err(e),
                }
            }
            result?
        }
        None => {
            let (controller, trace) = run_engine(cfg, &mut NullSink)?;
            (controller, trace, 0)
        }
    };

    let summary = TraceSummary::from_trace(&trace, &cfg.setpoints());
    Ok(RunOutcome {
        controller,
        trace,
        summary,
        json_records,
    })
}

fn run_recorded(
    cfg: &ScenarioConfig,
    dir: &Path,
) -> SimResult<(&'static str, Vec<EnvironmentState>, usize)> {
    let mut sink = JsonDirSink::new(dir)?;
    let (controller, trace) = run_engine(cfg, &mut sink)?;
    let records = verify_json_dir(dir, trace.len())?;
    info!(dir = %dir.display(), records = records.len(), "tick records written");
    Ok((controller, trace, records.len()))
}

fn run_engine<S: ExportSink>(
    cfg: &ScenarioConfig,
    sink: &mut S,
) -> SimResult<(&'static str, Vec<EnvironmentState>)> {
    match cfg.simulation.mode {
        ControlMode::Uncontrolled => drive(cfg.sim_config(), NoControl, sink),
        ControlMode::Controlled => drive(cfg.sim_config(), cfg.hvac_controller(), sink),
    }
}

fn drive<C: Controller, S: ExportSink>(
    config: SimConfig,
    controller: C,
    sink: &mut S,
) -> SimResult<(&'static str, Vec<EnvironmentState>)> {
    let name = controller.name();
    let trace = Engine::new(config, controller).run_with_sink(sink)?;
    Ok((name, trace))
}
