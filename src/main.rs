//! airseal-sim entry point: CLI wiring and config-driven runs.

use std::process;

use airseal_sim::cli::{parse_args, print_usage};
use airseal_sim::config::ScenarioConfig;
use airseal_sim::io::export::export_csv;
use airseal_sim::reporting::{print_summary, print_trace};
use airseal_sim::runner::{RunOptions, run_scenario};
use airseal_sim::telemetry::init_tracing;

fn main() {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            print_usage();
            process::exit(1);
        }
    };
    if cli.help {
        print_usage();
        return;
    }

    init_tracing(cli.quiet);

    // Load config: --scenario takes priority, then --preset, then baseline default
    let loaded = if let Some(ref path) = cli.scenario {
        ScenarioConfig::from_toml_file(path)
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)
    } else {
        Ok(ScenarioConfig::baseline())
    };
    let mut scenario = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = cli.seed {
        scenario.simulation.seed = seed;
    }
    if let Some(hours) = cli.hours {
        scenario.simulation.hours_run = hours;
    }
    if let Some(mode) = cli.mode {
        scenario.simulation.mode = mode;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let opts = RunOptions {
        json_dir: cli.json_dir,
        keep_json: cli.keep_json,
    };
    let outcome = run_scenario(&scenario, &opts).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    if !cli.quiet {
        print_trace(&outcome.trace);
    }
    print_summary(outcome.controller, &outcome.summary);

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&outcome.trace, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {}", path.display());
    }
}
