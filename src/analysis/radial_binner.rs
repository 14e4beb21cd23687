//! Radial Binner
//!
//! Partitions samples into half-open heliocentric-distance bins
//! `[lo, hi)` of a fixed width, indexed from the domain's lower bound.
//!
//! ## Ceiling handling
//!
//! - `Exclusive`: bins are emitted only while their left edge lies below the
//!   ceiling, and samples at or above the ceiling are dropped from the bin
//!   straddling it.
//! - `Inclusive`: bins are emitted while their left edge does not exceed the
//!   ceiling and keep all their samples, so up to one bin width of data
//!   beyond the ceiling is retained.
//!
//! A distance outside `[lower_bound, max_domain)` belongs to no bin and is
//! a fatal error.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{BinningConfig, CeilingBoundary, DistanceLabel};
use crate::error::{PipelineError, Result};
use crate::types::{Instrument, TaggedSample};

// ============================================================================
// Bins and groups
// ============================================================================

/// One distance interval in solar radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceBin {
    pub index: usize,
    pub lo: f64,
    pub hi: f64,
}

impl DistanceBin {
    /// Representative distance for the statistics table
    pub fn distance(&self, label: DistanceLabel) -> f64 {
        match label {
            DistanceLabel::LeftEdge => self.lo,
            DistanceLabel::Centre => 0.5 * (self.lo + self.hi),
        }
    }

    pub fn contains(&self, distance_rs: f64) -> bool {
        distance_rs >= self.lo && distance_rs < self.hi
    }
}

/// Per-instrument sample counts; an absent instrument counts zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InstrumentCounts {
    pub primary: usize,
    pub secondary: usize,
}

impl InstrumentCounts {
    pub fn of(samples: &[TaggedSample]) -> Self {
        samples.iter().fold(Self::default(), |mut counts, s| {
            match s.instrument {
                Instrument::Primary => counts.primary += 1,
                Instrument::Secondary => counts.secondary += 1,
            }
            counts
        })
    }

    pub const fn get(&self, instrument: Instrument) -> usize {
        match instrument {
            Instrument::Primary => self.primary,
            Instrument::Secondary => self.secondary,
        }
    }

    pub const fn total(&self) -> usize {
        self.primary + self.secondary
    }
}

/// Samples of one non-empty bin, in input order.
#[derive(Debug, Clone)]
pub struct BinGroup {
    pub bin: DistanceBin,
    pub samples: Vec<TaggedSample>,
    pub counts: InstrumentCounts,
}

// ============================================================================
// Binner
// ============================================================================

#[derive(Debug, Clone)]
pub struct RadialBinner {
    lower: f64,
    width: f64,
    max_domain: f64,
    ceiling: f64,
    boundary: CeilingBoundary,
    bin_count: usize,
}

impl RadialBinner {
    /// Build from a validated binning configuration.
    pub fn from_config(config: &BinningConfig) -> Self {
        Self {
            lower: config.lower_bound,
            width: config.bin_width,
            max_domain: config.max_domain,
            ceiling: config.ceiling,
            boundary: config.ceiling_boundary,
            bin_count: config.bin_count(),
        }
    }

    pub const fn width(&self) -> f64 {
        self.width
    }

    fn left_edge(&self, index: usize) -> f64 {
        self.lower + index as f64 * self.width
    }

    /// Bin by index; the last bin's upper edge is the domain maximum.
    ///
    /// Each upper edge is the next bin's left edge, so bins tile the
    /// domain without gaps.
    pub fn bin(&self, index: usize) -> DistanceBin {
        let hi = if index + 1 >= self.bin_count {
            self.max_domain
        } else {
            self.left_edge(index + 1)
        };
        DistanceBin {
            index,
            lo: self.left_edge(index),
            hi,
        }
    }

    /// Index of the bin whose `[lo, hi)` holds `d`, or an error outside
    /// the domain.
    pub fn bin_index(&self, distance_rs: f64) -> Result<usize> {
        if !(distance_rs >= self.lower && distance_rs < self.max_domain) {
            return Err(PipelineError::UnassignableDistance {
                distance_rs,
                lower: self.lower,
                upper: self.max_domain,
            });
        }
        let last = self.bin_count.saturating_sub(1);
        let mut idx = (((distance_rs - self.lower) / self.width).floor() as usize).min(last);
        // The quotient can land one off at an edge; settle against the edges
        while idx > 0 && distance_rs < self.left_edge(idx) {
            idx -= 1;
        }
        while idx < last && distance_rs >= self.left_edge(idx + 1) {
            idx += 1;
        }
        Ok(idx)
    }

    fn emits(&self, bin: &DistanceBin) -> bool {
        match self.boundary {
            CeilingBoundary::Exclusive => bin.lo < self.ceiling,
            CeilingBoundary::Inclusive => bin.lo <= self.ceiling,
        }
    }

    fn keeps(&self, distance_rs: f64) -> bool {
        match self.boundary {
            CeilingBoundary::Exclusive => distance_rs < self.ceiling,
            CeilingBoundary::Inclusive => true,
        }
    }

    /// Group samples into ascending non-empty bins up to the ceiling.
    ///
    /// Every sample is assigned first, so any out-of-domain distance fails
    /// the whole call before anything is emitted.
    pub fn group(&self, samples: &[TaggedSample]) -> Result<Vec<BinGroup>> {
        let mut by_index: BTreeMap<usize, Vec<TaggedSample>> = BTreeMap::new();
        for s in samples {
            let idx = self.bin_index(s.sample.r_rs())?;
            by_index.entry(idx).or_default().push(*s);
        }

        let mut groups = Vec::new();
        for (idx, members) in by_index {
            let bin = self.bin(idx);
            if !self.emits(&bin) {
                break;
            }
            let members: Vec<TaggedSample> = members
                .into_iter()
                .filter(|s| self.keeps(s.sample.r_rs()))
                .collect();
            if members.is_empty() {
                continue;
            }
            groups.push(BinGroup {
                bin,
                counts: InstrumentCounts::of(&members),
                samples: members,
            });
        }
        Ok(groups)
    }
}

// ============================================================================
// Naming
// ============================================================================

/// Number of decimal digits in the shortest representation of `width`.
pub fn decimal_length(width: f64) -> usize {
    let text = width.to_string();
    text.split_once('.').map_or(0, |(_, frac)| frac.len())
}

/// `{prefix}_{lo:.N}-{hi:.N}` with N from [`decimal_length`] of the width.
pub fn bin_file_name(prefix: &str, bin: &DistanceBin, width: f64) -> String {
    let n = decimal_length(width);
    format!("{prefix}_{:.n$}-{:.n$}", bin.lo, bin.hi)
}
