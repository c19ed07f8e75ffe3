//! Export collaborators: per-tick sinks and whole-trace writers.

/// CSV export of a completed trace.
pub mod export;
/// Per-tick sinks and the numbered JSON record directory.
pub mod sink;

pub use export::{export_csv, write_csv};
pub use sink::{ExportSink, JsonDirSink, MemorySink, NullSink};
