use std::env;
use std::path::PathBuf;

use crate::config::ControlMode;

/// Parsed command-line options.
#[derive(Debug, Default)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub hours: Option<u32>,
    pub mode: Option<ControlMode>,
    pub telemetry_out: Option<PathBuf>,
    pub json_dir: Option<PathBuf>,
    pub keep_json: bool,
    pub quiet: bool,
    pub help: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                if opts.scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(
                    i,
                    "missing value for --preset (expected a preset name)",
                )?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--hours" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --hours (expected a u32)")?;
                let hours = raw
                    .parse::<u32>()
                    .map_err(|_| format!("--hours value \"{raw}\" is not a valid u32"))?;
                opts.hours = Some(hours);
            }
            "--mode" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --mode (expected controlled or uncontrolled)",
                )?;
                let mode = ControlMode::from_name(raw).ok_or_else(|| {
                    format!("--mode value \"{raw}\" must be controlled or uncontrolled")
                })?;
                opts.mode = Some(mode);
            }
            "--telemetry-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --telemetry-out (expected a file path)",
                )?;
                if opts.telemetry_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--telemetry-out provided more than once".to_string());
                }
            }
            "--json-dir" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --json-dir (expected a directory)",
                )?;
                if opts.json_dir.replace(PathBuf::from(path)).is_some() {
                    return Err("--json-dir provided more than once".to_string());
                }
            }
            "--keep-json" => opts.keep_json = true,
            "--quiet" | "-q" => opts.quiet = true,
            "--help" | "-h" => {
                opts.help = true;
                return Ok(opts);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.scenario.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }
    if opts.keep_json && opts.json_dir.is_none() {
        return Err("--keep-json requires --json-dir".to_string());
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("airseal-sim: airtight room climate simulator");
    eprintln!();
    eprintln!("Usage: airseal-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, hvac, crowded)");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --hours <u32>            Override simulated hours");
    eprintln!("  --mode <mode>            controlled or uncontrolled");
    eprintln!("  --telemetry-out <path>   Export the trace to CSV");
    eprintln!("  --json-dir <dir>         Write one JSON record per tick into <dir>");
    eprintln!("  --keep-json              Keep the JSON records after the run");
    eprintln!("  -q, --quiet              Skip the per-tick table");
    eprintln!("  -h, --help               Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}
