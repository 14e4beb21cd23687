//! Run Artifact Storage
//!
//! JSON tables (schema v1) under the statistics directory and the
//! plain-text execution log.

pub mod execution_log;
pub mod export;

pub use execution_log::ExecutionLog;
pub use export::{clear_dir, read_statistics, remove_stale, OutputLayout, SampleRow, SampleTable};
