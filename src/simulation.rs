//! MHD Simulation Profile Adapter
//!
//! Reads a radial line cut exported from an MHD simulation mesh (comma
//! separated, one header row) and compares it against the observed
//! statistics table.
//!
//! Column layout of the export (zero-based):
//!
//! | col | content |
//! |-----|---------|
//! | 3 | log10 temperature (K) |
//! | 6 | log10 mass density (kg/m³) |
//! | 8 | heliocentric distance (m) |
//! | 9, 10 | θ, φ (radians) |
//! | 12..=14 | vx, vy, vz (m/s) |
//!
//! Leading rows with a NaN first column (cells outside the mesh) are
//! skipped, and any row with a NaN distance is dropped.
//!
//! # Usage
//!
//! ```ignore
//! let profile = SimulationProfile::from_csv("equatorial.csv")?;
//! let rows = compare(&stats, &profile, Quantity::RadialVelocity);
//! ```

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{StatisticsTable, SCHEMA_VERSION};
use crate::error::{PipelineError, Result};
use crate::physics_engine::constants::{SOLAR_RADIUS_KM, SOLAR_RADIUS_M};
use crate::physics_engine::{density_from_log_rho, mass_loss_rate, radial_projection, ram_pressure};
use crate::types::{Quantity, StatKind};

// ============================================================================
// Column Layout
// ============================================================================

const COL_FIRST: usize = 0;
const COL_LOG_T: usize = 3;
const COL_LOG_RHO: usize = 6;
const COL_DIST: usize = 8;
const COL_THETA: usize = 9;
const COL_PHI: usize = 10;
const COL_VX: usize = 12;
const COL_VY: usize = 13;
const COL_VZ: usize = 14;
const MIN_COLUMNS: usize = COL_VZ + 1;

// ============================================================================
// Profile
// ============================================================================

/// One mesh point in observation units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePoint {
    /// Heliocentric distance (solar radii)
    pub distance_rs: f64,
    /// Radial velocity (km/s)
    pub vr: f64,
    /// Proton density (cm⁻³)
    pub np: f64,
    /// Temperature (K)
    pub temp: f64,
}

impl ProfilePoint {
    pub fn value(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::RadialVelocity => self.vr,
            Quantity::Density => self.np,
            Quantity::Temperature => self.temp,
            Quantity::MassLoss => mass_loss_rate(self.distance_rs * SOLAR_RADIUS_KM, self.np, self.vr),
            Quantity::RamPressure => ram_pressure(self.np, self.vr),
        }
    }
}

/// Simulated radial profile, ascending in distance.
#[derive(Debug, Clone)]
pub struct SimulationProfile {
    pub name: String,
    points: Vec<ProfilePoint>,
}

impl SimulationProfile {
    /// Build from points in any order.
    pub fn new(name: impl Into<String>, mut points: Vec<ProfilePoint>) -> Self {
        points.retain(|p| p.distance_rs.is_finite());
        points.sort_by(|a, b| a.distance_rs.total_cmp(&b.distance_rs));
        Self {
            name: name.into(),
            points,
        }
    }

    /// Read a mesh line-cut export.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut points = Vec::new();
        let mut in_mesh = false;
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let line = i + 2;
            let cells = record
                .iter()
                .map(|s| parse_cell(s).ok_or_else(|| malformed(&name, line, format!("'{s}' is not a number"))))
                .collect::<Result<Vec<f64>>>()?;
            if cells.len() < MIN_COLUMNS {
                return Err(malformed(
                    &name,
                    line,
                    format!("expected at least {MIN_COLUMNS} columns, found {}", cells.len()),
                ));
            }

            if !in_mesh {
                if cells[COL_FIRST].is_nan() {
                    continue;
                }
                in_mesh = true;
            }
            if cells[COL_DIST].is_nan() {
                continue;
            }

            points.push(ProfilePoint {
                distance_rs: cells[COL_DIST] / SOLAR_RADIUS_M,
                vr: radial_projection(
                    cells[COL_VX],
                    cells[COL_VY],
                    cells[COL_VZ],
                    cells[COL_THETA],
                    cells[COL_PHI],
                ) * 1e-3,
                np: density_from_log_rho(cells[COL_LOG_RHO]),
                temp: 10f64.powf(cells[COL_LOG_T]),
            });
        }

        info!(profile = %name, points = points.len(), "Loaded simulation profile");
        Ok(Self::new(name, points))
    }

    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    pub fn min_distance(&self) -> Option<f64> {
        self.points.first().map(|p| p.distance_rs)
    }

    pub fn max_distance(&self) -> Option<f64> {
        self.points.last().map(|p| p.distance_rs)
    }

    /// Linear interpolation of `quantity` at `distance_rs`; `None` outside
    /// the profile's range.
    pub fn value_at(&self, quantity: Quantity, distance_rs: f64) -> Option<f64> {
        let (lo_d, hi_d) = (self.min_distance()?, self.max_distance()?);
        if !(distance_rs >= lo_d && distance_rs <= hi_d) {
            return None;
        }
        let upper = self
            .points
            .partition_point(|p| p.distance_rs < distance_rs)
            .min(self.points.len() - 1);
        let b = self.points[upper];
        if upper == 0 || b.distance_rs == distance_rs {
            return Some(b.value(quantity));
        }
        let a = self.points[upper - 1];
        let span = b.distance_rs - a.distance_rs;
        if span == 0.0 {
            return Some(b.value(quantity));
        }
        let t = (distance_rs - a.distance_rs) / span;
        let (va, vb) = (a.value(quantity), b.value(quantity));
        Some(va + (vb - va) * t)
    }
}

fn parse_cell(s: &str) -> Option<f64> {
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    s.parse().ok()
}

fn malformed(file: &str, line: usize, message: String) -> PipelineError {
    PipelineError::MalformedRecord {
        file: file.to_string(),
        line,
        message,
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// Observed statistics against the simulated value at one bin distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub distance: f64,
    pub observed_mean: f64,
    pub observed_std: f64,
    pub simulated: f64,
    /// observed_mean - simulated
    pub residual: f64,
}

/// Comparison of one quantity against one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub schema_version: u32,
    pub profile: String,
    pub quantity: Quantity,
    pub unit: String,
    pub rows: Vec<ComparisonRow>,
}

/// Pair every observed bin mean inside the profile's range with the
/// interpolated simulated value.
pub fn compare(stats: &StatisticsTable, profile: &SimulationProfile, quantity: Quantity) -> Comparison {
    let rows = stats
        .rows_of(StatKind::Mean)
        .zip(stats.rows_of(StatKind::Std))
        .filter_map(|(mean, std)| {
            let simulated = profile.value_at(quantity, mean.distance)?;
            let observed_mean = mean.value(quantity);
            Some(ComparisonRow {
                distance: mean.distance,
                observed_mean,
                observed_std: std.value(quantity),
                simulated,
                residual: observed_mean - simulated,
            })
        })
        .collect();

    Comparison {
        schema_version: SCHEMA_VERSION,
        profile: profile.name.clone(),
        quantity,
        unit: quantity.unit().to_string(),
        rows,
    }
}
