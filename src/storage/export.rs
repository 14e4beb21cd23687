//! Result serialization (schema v1)
//!
//! Output layout under the statistics directory:
//!
//! ```text
//! STATISTICS/
//!   statistics.json
//!   BINNED_DATA/<prefix>_<lo>-<hi>.json
//!   SPLIT_DATA/<encounter>_<APPROACH|RECESSION>_<r0>-<r1>Rs.json
//! ```
//!
//! Both sample-table directories are emptied before each run so reruns
//! never mix old and new tables. Files are written to a temporary name and
//! renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::{StatisticsTable, SCHEMA_VERSION};
use crate::config::{defaults, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::physics_engine::{heliolatitude_deg, relative_time};
use crate::types::{Instrument, TaggedSample};

// ============================================================================
// Sample tables
// ============================================================================

/// One archived sample with provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub epoch: f64,
    pub r_km: f64,
    pub r_rs: f64,
    pub vr: f64,
    pub np: f64,
    #[serde(rename = "Temp")]
    pub temp: f64,
    pub inst: Instrument,
    /// Heliolatitude (degrees); absent for distance-only instruments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_deg: Option<f64>,
    /// Position in time within the orbit segment, 0 to 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_rel: Option<f64>,
}

impl From<&TaggedSample> for SampleRow {
    fn from(t: &TaggedSample) -> Self {
        Self {
            epoch: t.sample.epoch,
            r_km: t.sample.r_km,
            r_rs: t.sample.r_rs(),
            vr: t.sample.vr,
            np: t.sample.np,
            temp: t.sample.temp,
            inst: t.instrument,
            lat_deg: t.sample.theta.map(heliolatitude_deg),
            t_rel: None,
        }
    }
}

/// Full-fidelity samples of one bin or one orbit segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleTable {
    pub schema_version: u32,
    pub name: String,
    pub rows: Vec<SampleRow>,
}

impl SampleTable {
    pub fn new(name: impl Into<String>, samples: &[TaggedSample]) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            name: name.into(),
            rows: samples.iter().map(SampleRow::from).collect(),
        }
    }

    /// Orbit-segment table: rows also carry their relative time within
    /// the segment.
    pub fn segment(name: impl Into<String>, samples: &[TaggedSample]) -> Self {
        let mut table = Self::new(name, samples);
        let epochs: Vec<f64> = table.rows.iter().map(|r| r.epoch).collect();
        for (row, t) in table.rows.iter_mut().zip(relative_time(&epochs)) {
            row.t_rel = Some(t);
        }
        table
    }
}

// ============================================================================
// Output directory layout
// ============================================================================

/// Paths of every artifact a run writes.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub binned_dir: PathBuf,
    pub split_dir: PathBuf,
    pub statistics_file: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            binned_dir: root.join(defaults::BINNED_SUBDIR),
            split_dir: root.join(defaults::SPLIT_SUBDIR),
            statistics_file: root.join(defaults::STATISTICS_FILE),
            root,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.paths.statistics_dir)
    }

    /// Create the layout, emptying both sample-table directories and
    /// removing the previous statistics table.
    pub fn prepare(&self) -> Result<()> {
        for dir in [&self.binned_dir, &self.split_dir] {
            clear_dir(dir)?;
        }
        remove_stale(&self.statistics_file)
    }

    pub fn write_bin(&self, table: &SampleTable) -> Result<PathBuf> {
        let path = self.binned_dir.join(format!("{}.json", table.name));
        write_json(&path, table)?;
        Ok(path)
    }

    pub fn write_segment(&self, table: &SampleTable) -> Result<PathBuf> {
        let path = self.split_dir.join(format!("{}.json", table.name));
        write_json(&path, table)?;
        Ok(path)
    }

    pub fn write_statistics(&self, table: &StatisticsTable) -> Result<PathBuf> {
        write_json(&self.statistics_file, table)?;
        Ok(self.statistics_file.clone())
    }
}

/// Remove a directory's contents (or create it when absent).
pub fn clear_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
        debug!(dir = %dir.display(), "Cleared output directory");
    }
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))
}

/// Delete a previous run's file; absent is fine.
pub fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed previous output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PipelineError::io(path, e)),
    }
}

/// Write JSON atomically (write temp file, then rename).
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json).map_err(|e| PipelineError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| PipelineError::io(path, e))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(serde_json::from_slice(&data)?)
}

/// Load a statistics table written by a previous run.
pub fn read_statistics(path: &Path) -> Result<StatisticsTable> {
    read_json(path)
}
