//! Plain-text execution log
//!
//! One block per encounter with the raw, filtered and averaged sample
//! counts of each instrument. Rewritten in full on every run.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::{PipelineError, Result};
use crate::reduction::ReductionCounts;
use crate::types::Instrument;

const HEADER: &str = "Logging execution of calculation routine.";

#[derive(Debug, Clone)]
pub struct ExecutionLog {
    text: String,
}

impl ExecutionLog {
    pub fn new(started: DateTime<Utc>, bin_width: f64, window_secs: f64) -> Self {
        let mut text = String::new();
        let _ = writeln!(text, "{HEADER}");
        let _ = writeln!(text, "Run started: {}", started.to_rfc3339());
        let _ = writeln!(text, "Bin width: {bin_width} Rs");
        let _ = writeln!(text, "Averaging window: {window_secs} s");
        Self { text }
    }

    /// Append one encounter's per-instrument counts.
    pub fn record_encounter(&mut self, encounter: &str, counts: &[(Instrument, ReductionCounts)]) {
        let _ = writeln!(self.text);
        let _ = writeln!(self.text, "{encounter}");
        for (instrument, c) in counts {
            let _ = writeln!(
                self.text,
                "  {:<10} raw={:>8} filtered={:>8} averaged={:>8}",
                instrument.label(),
                c.raw,
                c.filtered,
                c.averaged
            );
        }
        let total: usize = counts.iter().map(|(_, c)| c.averaged).sum();
        let _ = writeln!(self.text, "  data points: {total}");
    }

    /// Closing summary line.
    pub fn finish(&mut self, bins: usize, samples: usize) {
        let _ = writeln!(self.text);
        let _ = writeln!(self.text, "Binned {samples} samples into {bins} bins");
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        std::fs::write(path, &self.text).map_err(|e| PipelineError::io(path, e))
    }
}
