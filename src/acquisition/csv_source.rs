//! CSV directory source
//!
//! Reads `<data_root>/<encounter>/<instrument_dir>/*.csv`, one file per
//! day. Columns are located by header name, so column order is free.
//!
//! Primary header: `epoch, flag, pos_x, pos_y, pos_z, vr, np, wp`
//!
//! Secondary header: `epoch, flag, sun_dist, vr, sc_vr, np, temp,
//! eflux_0 .. eflux_{k-1}`
//!
//! Empty cells and `nan` read as NaN and are rejected later by the
//! quality filter. `epoch` is either float seconds or an RFC 3339 /
//! ISO-8601 timestamp.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::raw::{PrimaryChannels, RawFile, RawSource, SecondaryChannels};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};

const EFLUX_PREFIX: &str = "eflux_";

/// Raw source backed by a directory tree of CSV files.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    root: PathBuf,
    primary_dir: String,
    secondary_dir: String,
}

impl CsvDirectorySource {
    pub fn new(
        root: impl Into<PathBuf>,
        primary_dir: impl Into<String>,
        secondary_dir: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            primary_dir: primary_dir.into(),
            secondary_dir: secondary_dir.into(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            &config.paths.data_root,
            &config.encounters.primary_dir,
            &config.encounters.secondary_dir,
        )
    }

    /// Sorted CSV files of one instrument folder, failing if the encounter
    /// or the instrument folder is missing.
    fn list_files(&self, encounter: &str, instrument_dir: &str) -> Result<Vec<PathBuf>> {
        let encounter_dir = self.root.join(encounter);
        if !encounter_dir.is_dir() {
            return Err(PipelineError::MissingDirectory(encounter_dir));
        }
        let dir = encounter_dir.join(instrument_dir);
        if !dir.is_dir() {
            return Err(PipelineError::MissingDirectory(dir));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| PipelineError::io(&dir, e))? {
            let path = entry.map_err(|e| PipelineError::io(&dir, e))?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("csv") {
                files.push(path);
            }
        }
        // File names are dates, so lexical order is chronological
        files.sort();
        Ok(files)
    }
}

impl RawSource for CsvDirectorySource {
    fn primary_files(&self, encounter: &str) -> Result<Vec<RawFile<PrimaryChannels>>> {
        self.list_files(encounter, &self.primary_dir)?
            .iter()
            .map(|path| read_primary(path))
            .collect()
    }

    fn secondary_files(&self, encounter: &str) -> Result<Vec<RawFile<SecondaryChannels>>> {
        self.list_files(encounter, &self.secondary_dir)?
            .iter()
            .map(|path| read_secondary(path))
            .collect()
    }

    fn source_name(&self) -> &str {
        "CSV"
    }
}

// ============================================================================
// Per-file readers
// ============================================================================

/// Read one primary-instrument CSV file.
pub fn read_primary(path: &Path) -> Result<RawFile<PrimaryChannels>> {
    let table = CsvTable::read(path)?;
    let col = |name| table.column(name);
    let (epoch, flag) = (col("epoch")?, col("flag")?);
    let (pos_x, pos_y, pos_z) = (col("pos_x")?, col("pos_y")?, col("pos_z")?);
    let (vr, np, wp) = (col("vr")?, col("np")?, col("wp")?);

    let mut channels = PrimaryChannels::default();
    for (line, record) in table.records() {
        let field = |idx: usize| record.get(idx).unwrap_or("");
        channels.epoch.push(table.epoch(field(epoch), line)?);
        channels.flag.push(table.flag(field(flag), line)?);
        channels.pos_x.push(table.value(field(pos_x), line)?);
        channels.pos_y.push(table.value(field(pos_y), line)?);
        channels.pos_z.push(table.value(field(pos_z), line)?);
        channels.vr.push(table.value(field(vr), line)?);
        channels.np.push(table.value(field(np), line)?);
        channels.wp.push(table.value(field(wp), line)?);
    }

    debug!(file = %table.name, rows = channels.epoch.len(), "Read primary file");
    Ok(RawFile {
        name: table.name,
        channels,
    })
}

/// Read one secondary-instrument CSV file.
pub fn read_secondary(path: &Path) -> Result<RawFile<SecondaryChannels>> {
    let table = CsvTable::read(path)?;
    let col = |name| table.column(name);
    let (epoch, flag, sun_dist) = (col("epoch")?, col("flag")?, col("sun_dist")?);
    let (vr, sc_vr, np, temp) = (col("vr")?, col("sc_vr")?, col("np")?, col("temp")?);
    let eflux_cols = table.eflux_columns();

    let mut channels = SecondaryChannels::default();
    for (line, record) in table.records() {
        let field = |idx: usize| record.get(idx).unwrap_or("");
        channels.epoch.push(table.epoch(field(epoch), line)?);
        channels.flag.push(table.flag(field(flag), line)?);
        channels.sun_dist.push(table.value(field(sun_dist), line)?);
        channels.vr.push(table.value(field(vr), line)?);
        channels.sc_vr.push(table.value(field(sc_vr), line)?);
        channels.np.push(table.value(field(np), line)?);
        channels.temp.push(table.value(field(temp), line)?);
        let row = eflux_cols
            .iter()
            .map(|&idx| table.value(field(idx), line))
            .collect::<Result<Vec<f64>>>()?;
        channels.eflux.push(row);
    }

    debug!(
        file = %table.name,
        rows = channels.epoch.len(),
        flux_bins = eflux_cols.len(),
        "Read secondary file"
    );
    Ok(RawFile {
        name: table.name,
        channels,
    })
}

/// A fully-read CSV file with a header-name index.
struct CsvTable {
    name: String,
    headers: HashMap<String, usize>,
    header_order: Vec<String>,
    rows: Vec<(usize, csv::StringRecord)>,
}

impl CsvTable {
    fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        let header_order: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();
        let headers = header_order
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            // Header is line 1
            let line = record
                .position()
                .map_or(i + 2, |p| usize::try_from(p.line()).unwrap_or(i + 2));
            rows.push((line, record));
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            name,
            headers,
            header_order,
            rows,
        })
    }

    fn records(&self) -> impl Iterator<Item = (usize, &csv::StringRecord)> {
        self.rows.iter().map(|(line, record)| (*line, record))
    }

    fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .get(name)
            .copied()
            .ok_or_else(|| PipelineError::MalformedRecord {
                file: self.name.clone(),
                line: 1,
                message: format!("missing column '{name}'"),
            })
    }

    /// `eflux_<n>` columns ordered by n
    fn eflux_columns(&self) -> Vec<usize> {
        let mut cols: Vec<(usize, usize)> = self
            .header_order
            .iter()
            .enumerate()
            .filter_map(|(idx, h)| {
                h.strip_prefix(EFLUX_PREFIX)
                    .and_then(|n| n.parse::<usize>().ok())
                    .map(|n| (n, idx))
            })
            .collect();
        cols.sort_unstable();
        cols.into_iter().map(|(_, idx)| idx).collect()
    }

    fn malformed(&self, line: usize, message: String) -> PipelineError {
        PipelineError::MalformedRecord {
            file: self.name.clone(),
            line,
            message,
        }
    }

    fn value(&self, s: &str, line: usize) -> Result<f64> {
        parse_value(s).ok_or_else(|| self.malformed(line, format!("'{s}' is not a number")))
    }

    fn flag(&self, s: &str, line: usize) -> Result<i64> {
        parse_flag(s).ok_or_else(|| self.malformed(line, format!("'{s}' is not an integer flag")))
    }

    fn epoch(&self, s: &str, line: usize) -> Result<f64> {
        parse_epoch(s).ok_or_else(|| self.malformed(line, format!("cannot parse timestamp '{s}'")))
    }
}

// ============================================================================
// Field parsing
// ============================================================================

/// Numeric cell; blank and `nan`-style cells become NaN.
fn parse_value(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") {
        return Some(f64::NAN);
    }
    s.parse::<f64>().ok()
}

/// Integer flag, accepting integral floats such as `4.0`.
fn parse_flag(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

/// Float seconds, or a calendar timestamp converted to Unix seconds.
fn parse_epoch(s: &str) -> Option<f64> {
    let s = s.trim().trim_matches('"');
    if let Ok(secs) = s.parse::<f64>() {
        return secs.is_finite().then_some(secs);
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(unix_seconds(dt.timestamp(), dt.timestamp_subsec_nanos()));
    }

    // Without timezone (assume UTC)
    for fmt in &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            let dt = dt.and_utc();
            return Some(unix_seconds(dt.timestamp(), dt.timestamp_subsec_nanos()));
        }
    }
    None
}

fn unix_seconds(secs: i64, nanos: u32) -> f64 {
    secs as f64 + f64::from(nanos) * 1e-9
}
