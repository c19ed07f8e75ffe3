//! Per-tick export sinks and the numbered JSON record directory.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::sim::types::EnvironmentState;

/// Receives each state as soon as the engine computes it.
///
/// `index` is the 1-based tick number. An error aborts the run; states
/// already returned by earlier ticks are unaffected.
pub trait ExportSink {
    fn emit(&mut self, index: usize, state: &EnvironmentState) -> SimResult<()>;
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ExportSink for NullSink {
    fn emit(&mut self, _index: usize, _state: &EnvironmentState) -> SimResult<()> {
        Ok(())
    }
}

/// Collects emitted states in memory, mostly for tests and in-process consumers.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub records: Vec<(usize, EnvironmentState)>,
}

impl ExportSink for MemorySink {
    fn emit(&mut self, index: usize, state: &EnvironmentState) -> SimResult<()> {
        self.records.push((index, *state));
        Ok(())
    }
}

/// On-disk shape of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub co2: f64,
    pub o2: f64,
    pub thermal: f64,
}

impl From<&EnvironmentState> for TickRecord {
    fn from(s: &EnvironmentState) -> Self {
        Self {
            time: s.time,
            temperature: s.temperature,
            co2: s.co2,
            o2: s.o2,
            thermal: s.thermal_output,
        }
    }
}

impl From<TickRecord> for EnvironmentState {
    fn from(r: TickRecord) -> Self {
        Self {
            time: r.time,
            temperature: r.temperature,
            co2: r.co2,
            o2: r.o2,
            thermal_output: r.thermal,
        }
    }
}

/// A record read back from disk, tagged with the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub file: String,
    pub sequence: u64,
    pub record: TickRecord,
}

/// Writes one pretty-printed `<index>.json` file per tick into a directory.
#[derive(Debug, Clone)]
pub struct JsonDirSink {
    dir: PathBuf,
}

impl JsonDirSink {
    /// Creates the sink, creating `dir` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Io` if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> SimResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| SimError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for JsonDirSink {
    fn emit(&mut self, index: usize, state: &EnvironmentState) -> SimResult<()> {
        let path = self.dir.join(format!("{index}.json"));
        let file = File::create(&path).map_err(|e| SimError::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &TickRecord::from(state)).map_err(|e| {
            SimError::Json {
                path: path.clone(),
                source: e,
            }
        })?;
        writer.flush().map_err(|e| SimError::io(&path, e))
    }
}

/// Reads every tick record in `dir`, ordered by its tick number.
///
/// Only files named `<number>.json` are records; other files are left
/// alone. Ordering is numeric, so `10.json` follows `9.json`.
///
/// # Errors
///
/// Returns an error if the directory or a record cannot be read, or a
/// record file does not hold a valid record.
pub fn read_json_dir(dir: &Path) -> SimResult<Vec<StoredRecord>> {
    let mut records = Vec::new();
    for (sequence, path) in record_files(dir)? {
        let file = File::open(&path).map_err(|e| SimError::io(&path, e))?;
        let record: TickRecord =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| SimError::Json {
                path: path.clone(),
                source: e,
            })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        records.push(StoredRecord {
            file: name,
            sequence,
            record,
        });
    }
    records.sort_by_key(|r| r.sequence);
    debug!(dir = %dir.display(), count = records.len(), "loaded tick records");
    Ok(records)
}

/// Reloads the records in `dir` and checks they are exactly ticks `1..=expected`.
///
/// # Errors
///
/// Returns `SimError::RecordCount` if records are missing or extra, or any
/// error from [`read_json_dir`].
pub fn verify_json_dir(dir: &Path, expected: usize) -> SimResult<Vec<StoredRecord>> {
    let records = read_json_dir(dir)?;
    let contiguous = records
        .iter()
        .zip(1u64..)
        .all(|(r, tick)| r.sequence == tick);
    if records.len() != expected || !contiguous {
        return Err(SimError::RecordCount {
            dir: dir.to_path_buf(),
            expected,
            found: records.len(),
        });
    }
    Ok(records)
}

/// Deletes the tick records in `dir`, leaving anything else alone.
///
/// A missing directory counts as already clean.
///
/// # Returns
///
/// Number of files removed.
pub fn clear_json_dir(dir: &Path) -> SimResult<usize> {
    if !dir.exists() {
        return Ok(0);
    }
    let mut removed = 0;
    for (_, path) in record_files(dir)? {
        fs::remove_file(&path).map_err(|e| SimError::io(&path, e))?;
        removed += 1;
    }
    debug!(dir = %dir.display(), removed, "cleared tick records");
    Ok(removed)
}

fn record_files(dir: &Path) -> SimResult<Vec<(u64, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| SimError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SimError::io(dir, e))?.path();
        if !path.is_file() || !path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }
        if let Some(sequence) = sequence_number(&path) {
            files.push((sequence, path));
        }
    }
    Ok(files)
}

/// Tick number when the whole file stem is ASCII digits.
fn sequence_number(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}_{nanos}"))
    }

    fn state(minute: i64, temperature: f64) -> EnvironmentState {
        EnvironmentState {
            time: NaiveDateTime::default() + chrono::Duration::minutes(minute),
            temperature,
            co2: 400.0 + minute as f64,
            o2: 210_000.0 - minute as f64,
            thermal_output: 10_000.0,
        }
    }

    #[test]
    fn sequence_number_needs_a_numeric_stem() {
        assert_eq!(sequence_number(Path::new("12.json")), Some(12));
        assert_eq!(sequence_number(Path::new("tick_7.json")), None);
        assert_eq!(sequence_number(Path::new("backup2024.json")), None);
        assert_eq!(sequence_number(Path::new("notes.json")), None);
    }

    #[test]
    fn memory_sink_keeps_order() {
        let mut sink = MemorySink::default();
        sink.emit(1, &state(1, 20.0)).expect("emit should succeed");
        sink.emit(2, &state(2, 21.0)).expect("emit should succeed");
        let indices: Vec<usize> = sink.records.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn json_dir_reloads_in_numeric_order() {
        let dir = unique_temp_dir("airseal_sink_order");
        let mut sink = JsonDirSink::new(&dir).expect("sink dir should be created");
        for i in 1..=12 {
            sink.emit(i, &state(i as i64, 20.0 + i as f64))
                .expect("emit should succeed");
        }

        let records = read_json_dir(&dir).expect("records should load");
        let files: Vec<&str> = records.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(files[0], "1.json");
        assert_eq!(files[8], "9.json");
        assert_eq!(files[9], "10.json");
        assert_eq!(records.len(), 12);
        assert_eq!(records[11].record.temperature, 32.0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn record_files_use_flat_field_names() {
        let dir = unique_temp_dir("airseal_sink_fields");
        let mut sink = JsonDirSink::new(&dir).expect("sink dir should be created");
        sink.emit(1, &state(0, 25.0)).expect("emit should succeed");

        let raw = fs::read_to_string(dir.join("1.json")).expect("record should exist");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");
        for key in ["time", "temperature", "co2", "o2", "thermal"] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn clear_removes_only_numbered_records() {
        let dir = unique_temp_dir("airseal_sink_clear");
        let mut sink = JsonDirSink::new(&dir).expect("sink dir should be created");
        sink.emit(1, &state(1, 20.0)).expect("emit should succeed");
        sink.emit(2, &state(2, 20.0)).expect("emit should succeed");
        fs::write(dir.join("README.txt"), "keep me").expect("write should succeed");

        let removed = clear_json_dir(&dir).expect("clear should succeed");
        assert_eq!(removed, 2);
        assert!(dir.join("README.txt").exists());
        assert!(read_json_dir(&dir).expect("empty dir reads").is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn clear_missing_dir_is_noop() {
        let dir = unique_temp_dir("airseal_sink_missing");
        assert_eq!(clear_json_dir(&dir).ok(), Some(0));
    }

    #[test]
    fn other_json_files_are_ignored() {
        let dir = unique_temp_dir("airseal_sink_other");
        let mut sink = JsonDirSink::new(&dir).expect("sink dir should be created");
        sink.emit(1, &state(1, 20.0)).expect("emit should succeed");
        fs::write(dir.join("latest.json"), "{}").expect("write should succeed");
        fs::write(dir.join("backup2024.json"), "{}").expect("write should succeed");

        let records = read_json_dir(&dir).expect("records should load");
        assert_eq!(records.len(), 1);
        assert_eq!(clear_json_dir(&dir).expect("clear should succeed"), 1);
        assert!(dir.join("latest.json").exists());
        assert!(dir.join("backup2024.json").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn verify_rejects_stale_or_missing_records() {
        let dir = unique_temp_dir("airseal_sink_verify");
        let mut sink = JsonDirSink::new(&dir).expect("sink dir should be created");
        for i in 1..=3 {
            sink.emit(i, &state(i as i64, 20.0)).expect("emit should succeed");
        }

        assert_eq!(verify_json_dir(&dir, 3).map(|r| r.len()).ok(), Some(3));
        assert!(matches!(
            verify_json_dir(&dir, 2),
            Err(SimError::RecordCount {
                expected: 2,
                found: 3,
                ..
            })
        ));

        fs::remove_file(dir.join("2.json")).expect("remove should succeed");
        sink.emit(4, &state(4, 20.0)).expect("emit should succeed");
        assert!(verify_json_dir(&dir, 3).is_err());

        let _ = fs::remove_dir_all(&dir);
    }
}
